//! Shared HTTP plumbing for the Google REST clients.

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use sharesweep_core::ServiceError;
use std::time::Duration;

#[derive(Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// One client for every request of a run; `timeout` bounds each call.
pub fn build_http_client(timeout: Duration) -> Result<Client, ServiceError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ServiceError::Http(e.to_string()))
}

pub(crate) fn transport_error(err: reqwest::Error) -> ServiceError {
    ServiceError::Http(err.to_string())
}

/// Decode a successful response, or turn an error status into
/// [`ServiceError::Api`] carrying the API's own message when present.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ServiceError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ServiceError::Api {
            status: status.as_u16(),
            message: api_message(&body),
        });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ServiceError::Parse(e.to_string()))
}

fn api_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}
