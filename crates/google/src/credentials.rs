//! Service-account key loading.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const SERVICE_ACCOUNT_TYPE: &str = "service_account";

#[derive(Error, Debug)]
pub enum CredentialsError {
    #[error("Error reading credentials file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid credentials JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid service account key: {0}")]
    Invalid(String),
}

/// Key file downloaded for a service account with domain-wide delegation.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(rename = "type")]
    pub key_type: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self, CredentialsError> {
        let key: Self = serde_json::from_str(json)?;
        key.validate()?;
        Ok(key)
    }

    pub async fn load(path: &Path) -> Result<Self, CredentialsError> {
        let json = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| CredentialsError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&json)
    }

    fn validate(&self) -> Result<(), CredentialsError> {
        if self.key_type != SERVICE_ACCOUNT_TYPE {
            return Err(CredentialsError::Invalid(format!(
                "expected type {}, found {}",
                SERVICE_ACCOUNT_TYPE, self.key_type
            )));
        }
        if self.client_email.trim().is_empty() {
            return Err(CredentialsError::Invalid("client_email is empty".to_string()));
        }
        if !self.private_key.contains("PRIVATE KEY") {
            return Err(CredentialsError::Invalid(
                "private_key is not a PEM private key".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key_id", &self.private_key_id)
            .field("token_uri", &self.token_uri)
            .field("private_key", &"<redacted>")
            .finish()
    }
}
