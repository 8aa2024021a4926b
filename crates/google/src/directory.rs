//! Admin Directory v1 user listing.

use crate::http::{read_json, transport_error};
use crate::token::TokenSource;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use sharesweep_core::{DirectoryService, Member, MemberQuery, Page, ServiceError};
use std::sync::Arc;
use tracing::debug;

const USER_FIELDS: &str = "nextPageToken,users(primaryEmail)";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsersPage {
    #[serde(default)]
    users: Vec<Member>,
    #[serde(default)]
    next_page_token: Option<String>,
}

/// Directory client acting as the delegated administrator.
pub struct GoogleDirectory {
    http: Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl GoogleDirectory {
    pub fn new(http: Client, base_url: &str, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            tokens,
        }
    }
}

#[async_trait]
impl DirectoryService for GoogleDirectory {
    async fn list_members(
        &self,
        query: &MemberQuery,
        page_token: Option<&str>,
    ) -> Result<Page<Member>, ServiceError> {
        let token = self.tokens.access_token().await?;

        let mut params = vec![
            ("customer", query.customer.clone()),
            ("maxResults", query.page_size.to_string()),
            ("orderBy", query.order_by.clone()),
            ("fields", USER_FIELDS.to_string()),
        ];
        if let Some(filter) = &query.filter {
            params.push(("query", filter.clone()));
        }
        if let Some(page_token) = page_token {
            params.push(("pageToken", page_token.to_string()));
        }

        debug!(customer = %query.customer, page_token, "Fetching users page");
        let response = self
            .http
            .get(format!("{}/users", self.base_url))
            .bearer_auth(token)
            .query(&params)
            .send()
            .await
            .map_err(transport_error)?;

        let page: UsersPage = read_json(response).await?;
        Ok(Page {
            items: page.users,
            next_page_token: page.next_page_token,
        })
    }
}
