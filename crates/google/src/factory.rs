//! Impersonated client construction.

use crate::credentials::ServiceAccountKey;
use crate::directory::GoogleDirectory;
use crate::drive::GoogleDrive;
use crate::http::build_http_client;
use crate::token::{ImpersonatedTokenSource, TokenSource};
use async_trait::async_trait;
use reqwest::Client;
use sharesweep_core::{DriveClientFactory, DriveService, ServiceError};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

pub const DIRECTORY_BASE_URL: &str = "https://admin.googleapis.com/admin/directory/v1";
pub const DRIVE_BASE_URL: &str = "https://www.googleapis.com/drive/v3";

/// REST base URLs, overridable for tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoogleEndpoints {
    pub directory: String,
    pub drive: String,
}

impl Default for GoogleEndpoints {
    fn default() -> Self {
        Self {
            directory: DIRECTORY_BASE_URL.to_string(),
            drive: DRIVE_BASE_URL.to_string(),
        }
    }
}

/// Builds clients that act as any user of the domain through the service
/// account's domain-wide delegation.
pub struct GoogleClientFactory {
    http: Client,
    key: Arc<ServiceAccountKey>,
    admin: String,
    endpoints: GoogleEndpoints,
}

impl GoogleClientFactory {
    pub fn new(
        key: ServiceAccountKey,
        admin: impl Into<String>,
        request_timeout: Duration,
    ) -> Result<Self, ServiceError> {
        Ok(Self {
            http: build_http_client(request_timeout)?,
            key: Arc::new(key),
            admin: admin.into(),
            endpoints: GoogleEndpoints::default(),
        })
    }

    pub fn with_endpoints(mut self, endpoints: GoogleEndpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// A fresh token source for `subject`.
    pub fn token_source(&self, subject: &str) -> Arc<ImpersonatedTokenSource> {
        Arc::new(ImpersonatedTokenSource::new(
            self.http.clone(),
            self.key.clone(),
            subject,
        ))
    }

    /// Directory client acting as the administrator.
    pub fn directory(&self) -> GoogleDirectory {
        GoogleDirectory::new(
            self.http.clone(),
            &self.endpoints.directory,
            self.token_source(&self.admin),
        )
    }
}

#[async_trait]
impl DriveClientFactory for GoogleClientFactory {
    /// Mints the identity's first token up front so a delegation failure is
    /// reported before any storage call.
    async fn drive_for(&self, identity: &str) -> Result<Arc<dyn DriveService>, ServiceError> {
        let tokens = self.token_source(identity);
        tokens.access_token().await?;
        debug!(identity, "Impersonated drive client ready");

        Ok(Arc::new(GoogleDrive::new(
            self.http.clone(),
            &self.endpoints.drive,
            tokens,
        )))
    }
}
