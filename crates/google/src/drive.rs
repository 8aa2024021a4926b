//! Drive v3 client bound to one impersonated identity.

use crate::http::{read_json, transport_error};
use crate::token::TokenSource;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use sharesweep_core::{DriveFile, DriveService, FileMetadata, FileQuery, Page, ServiceError};
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
    #[serde(default)]
    next_page_token: Option<String>,
}

pub struct GoogleDrive {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl GoogleDrive {
    pub fn new(http: Client, base_url: &str, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }
}

#[async_trait]
impl DriveService for GoogleDrive {
    async fn list_files(
        &self,
        query: &FileQuery,
        page_token: Option<&str>,
    ) -> Result<Page<DriveFile>, ServiceError> {
        let token = self.tokens.access_token().await?;

        let mut params = vec![("q", query.q.clone()), ("fields", query.fields.clone())];
        if let Some(page_size) = query.page_size {
            params.push(("pageSize", page_size.to_string()));
        }
        if let Some(page_token) = page_token {
            params.push(("pageToken", page_token.to_string()));
        }

        debug!(q = %query.q, page_token, "Listing files");
        let response = self
            .http
            .get(format!("{}/files", self.base_url))
            .bearer_auth(token)
            .query(&params)
            .send()
            .await
            .map_err(transport_error)?;

        let list: FileList = read_json(response).await?;
        Ok(Page {
            items: list.files,
            next_page_token: list.next_page_token,
        })
    }

    async fn create_file(&self, metadata: &FileMetadata) -> Result<DriveFile, ServiceError> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .post(format!("{}/files", self.base_url))
            .bearer_auth(token)
            .json(metadata)
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }

    async fn copy_file(
        &self,
        file_id: &str,
        metadata: &FileMetadata,
    ) -> Result<DriveFile, ServiceError> {
        let token = self.tokens.access_token().await?;
        let response = self
            .http
            .post(format!("{}/files/{}/copy", self.base_url, file_id))
            .bearer_auth(token)
            .json(metadata)
            .send()
            .await
            .map_err(transport_error)?;
        read_json(response).await
    }
}
