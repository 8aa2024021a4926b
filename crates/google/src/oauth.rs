//! JWT-bearer token exchange with subject substitution.

use crate::credentials::ServiceAccountKey;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use sharesweep_core::ServiceError;
use tracing::debug;

pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";
pub const DIRECTORY_USER_READONLY_SCOPE: &str =
    "https://www.googleapis.com/auth/admin.directory.user.readonly";

/// Scopes requested for every impersonated token.
pub const SCOPES: &[&str] = &[DRIVE_SCOPE, DIRECTORY_USER_READONLY_SCOPE];

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens this close to expiry are minted again.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Assertion claims. `sub` is the impersonated address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(key: &ServiceAccountKey, subject: &str, now: DateTime<Utc>) -> Self {
        let iat = now.timestamp();
        Self {
            iss: key.client_email.clone(),
            sub: subject.to_string(),
            scope: SCOPES.join(" "),
            aud: key.token_uri.clone(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// Sign `claims` with the service account's RSA key.
pub fn sign_assertion(key: &ServiceAccountKey, claims: &Claims) -> Result<String, ServiceError> {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();

    let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
        .map_err(|e| ServiceError::Auth(format!("Invalid private key: {}", e)))?;

    encode(&header, claims, &encoding_key)
        .map_err(|e| ServiceError::Auth(format!("Failed to sign assertion: {}", e)))
}

/// Mint an access token acting as `subject`.
pub async fn mint_token(
    http: &Client,
    key: &ServiceAccountKey,
    subject: &str,
) -> Result<AccessToken, ServiceError> {
    let now = Utc::now();
    let assertion = sign_assertion(key, &Claims::new(key, subject, now))?;

    debug!(subject, token_uri = %key.token_uri, "Exchanging assertion");
    let response = http
        .post(&key.token_uri)
        .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
        .send()
        .await
        .map_err(|e| ServiceError::Http(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ServiceError::Auth(format!(
            "token exchange for {} failed ({}): {}",
            subject,
            status.as_u16(),
            body.trim()
        )));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| ServiceError::Parse(e.to_string()))?;

    Ok(AccessToken {
        token: token.access_token,
        expires_at: now + Duration::seconds(token.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS)),
    })
}
