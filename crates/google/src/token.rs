//! Access-token sources for authenticated requests.

use crate::credentials::ServiceAccountKey;
use crate::oauth::{mint_token, AccessToken};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use sharesweep_core::ServiceError;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Supplies bearer tokens for one acting identity.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String, ServiceError>;
}

/// Tokens minted for one impersonated subject, cached until near expiry.
///
/// Each subject gets its own source; a cache is never shared between
/// identities.
pub struct ImpersonatedTokenSource {
    http: Client,
    key: Arc<ServiceAccountKey>,
    subject: String,
    cached: Mutex<Option<AccessToken>>,
}

impl ImpersonatedTokenSource {
    pub fn new(http: Client, key: Arc<ServiceAccountKey>, subject: impl Into<String>) -> Self {
        Self {
            http,
            key,
            subject: subject.into(),
            cached: Mutex::new(None),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[async_trait]
impl TokenSource for ImpersonatedTokenSource {
    async fn access_token(&self) -> Result<String, ServiceError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.is_fresh(Utc::now()) {
                return Ok(token.token.clone());
            }
        }

        debug!(subject = %self.subject, "Minting access token");
        let token = mint_token(&self.http, &self.key, &self.subject).await?;
        let value = token.token.clone();
        *cached = Some(token);
        Ok(value)
    }
}

/// A fixed token. Test helper for clients pointed at mock servers; it is
/// never used to talk to Google.
#[doc(hidden)]
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String, ServiceError> {
        Ok(self.0.clone())
    }
}
