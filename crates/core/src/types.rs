//! Data model shared by the consolidation pipeline and its collaborators.

use serde::{Deserialize, Serialize};

/// Fixed name of the per-identity consolidation folder.
pub const DESTINATION_FOLDER_NAME: &str = "my_copied_shared_files";

/// Mime type the storage backend uses for folders.
pub const FOLDER_MIME_TYPE: &str = "application/vnd.google-apps.folder";

/// Alias the storage backend resolves to the acting identity's root folder.
pub const ROOT_PARENT: &str = "root";

/// Owner line used in the consolidation record when a file has no owners.
pub const UNKNOWN_OWNER: &str = "Unknown Owner";

/// One account returned by the directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub primary_email: String,
}

/// Owner of a stored file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Owner {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email_address: String,
}

impl Owner {
    pub fn new(display_name: impl Into<String>, email_address: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            email_address: email_address.into(),
        }
    }
}

/// A storage entry as returned by listing, create and copy calls.
///
/// Listings only populate the fields they were asked for, so everything
/// except `id` defaults to empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveFile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub owners: Vec<Owner>,
}

impl DriveFile {
    pub fn new(id: impl Into<String>, name: impl Into<String>, owners: Vec<Owner>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mime_type: None,
            owners,
        }
    }

    /// `"{displayName} ({emailAddress})"` of the first owner, or
    /// [`UNKNOWN_OWNER`] when the owner list is empty.
    pub fn owner_info(&self) -> String {
        match self.owners.first() {
            Some(owner) => format!("{} ({})", owner.display_name, owner.email_address),
            None => UNKNOWN_OWNER.to_string(),
        }
    }

    /// Line appended to the consolidation record for this file.
    pub fn record_line(&self) -> String {
        format!(
            "File ID: {}, Name: {}, Owner: {}\n",
            self.id,
            self.name,
            self.owner_info()
        )
    }
}

/// Metadata sent with create and copy requests.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
}

impl FileMetadata {
    /// Metadata for the consolidation folder under the identity's root.
    pub fn destination_folder() -> Self {
        Self {
            name: Some(DESTINATION_FOLDER_NAME.to_string()),
            mime_type: Some(FOLDER_MIME_TYPE.to_string()),
            parents: vec![ROOT_PARENT.to_string()],
        }
    }

    /// Metadata that places a copy inside `folder_id`.
    pub fn copy_into(folder_id: &str) -> Self {
        Self {
            parents: vec![folder_id.to_string()],
            ..Self::default()
        }
    }
}

/// A storage listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileQuery {
    pub q: String,
    pub fields: String,
    pub page_size: Option<u32>,
}

impl FileQuery {
    /// Every file shared with the acting identity, with owner details.
    pub fn shared_with_me(page_size: u32) -> Self {
        Self {
            q: "sharedWithMe = true".to_string(),
            fields: "nextPageToken, files(id, name, owners(displayName, emailAddress))"
                .to_string(),
            page_size: Some(page_size),
        }
    }

    /// Folders named [`DESTINATION_FOLDER_NAME`] directly under root.
    pub fn destination_folder() -> Self {
        Self {
            q: format!(
                "name = '{}' and mimeType = '{}' and '{}' in parents",
                DESTINATION_FOLDER_NAME, FOLDER_MIME_TYPE, ROOT_PARENT
            ),
            fields: "files(id)".to_string(),
            page_size: None,
        }
    }
}

/// A directory listing request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberQuery {
    pub customer: String,
    pub page_size: u32,
    pub order_by: String,
    /// Directory search expression, e.g. `isSuspended=false`.
    pub filter: Option<String>,
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    pub fn last(items: Vec<T>) -> Self {
        Self {
            items,
            next_page_token: None,
        }
    }

    pub fn with_next(items: Vec<T>, token: impl Into<String>) -> Self {
        Self {
            items,
            next_page_token: Some(token.into()),
        }
    }
}
