//! Abstract interfaces for the directory and storage collaborators.

use crate::types::{DriveFile, FileMetadata, FileQuery, Member, MemberQuery, Page};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Failures reported by a collaborator.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Auth error: {0}")]
    Auth(String),

    #[error("Pagination error: {0}")]
    Pagination(String),
}

/// Consolidation errors, scoped by the smallest unit that cannot proceed.
#[derive(Error, Debug)]
pub enum ConsolidationError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unable to retrieve users: {0}")]
    DirectoryFetch(#[source] ServiceError),

    #[error("Unable to impersonate user {identity}: {source}")]
    ClientConstruction {
        identity: String,
        #[source]
        source: ServiceError,
    },

    #[error("Error listing shared files: {0}")]
    FileListing(#[source] ServiceError),

    #[error("Error getting or creating folder: {0}")]
    FolderResolution(#[source] ServiceError),

    #[error("Error writing {}: {source}", .path.display())]
    OutputIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unable to copy file {file_id}: {source}")]
    Copy {
        file_id: String,
        #[source]
        source: ServiceError,
    },

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Cancelled")]
    Cancelled,
}

impl ConsolidationError {
    /// Errors that abort the whole run rather than a single identity.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(self, Self::Config(_) | Self::DirectoryFetch(_))
    }
}

/// Organization directory listing.
#[async_trait]
pub trait DirectoryService: Send + Sync {
    /// Fetch one page of members.
    async fn list_members(
        &self,
        query: &MemberQuery,
        page_token: Option<&str>,
    ) -> Result<Page<Member>, ServiceError>;
}

/// File storage bound to one impersonated identity.
#[async_trait]
pub trait DriveService: Send + Sync {
    /// Fetch one page of entries matching `query`.
    async fn list_files(
        &self,
        query: &FileQuery,
        page_token: Option<&str>,
    ) -> Result<Page<DriveFile>, ServiceError>;

    /// Create an entry from `metadata`.
    async fn create_file(&self, metadata: &FileMetadata) -> Result<DriveFile, ServiceError>;

    /// Copy `file_id`, applying `metadata` to the new entry.
    async fn copy_file(
        &self,
        file_id: &str,
        metadata: &FileMetadata,
    ) -> Result<DriveFile, ServiceError>;
}

/// Mints a storage client impersonating a given identity.
#[async_trait]
pub trait DriveClientFactory: Send + Sync {
    async fn drive_for(&self, identity: &str) -> Result<Arc<dyn DriveService>, ServiceError>;
}
