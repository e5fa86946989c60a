mod cookie_jar;

pub use cookie_jar::HostOnlyJar;

use crate::error::OdFetchError;
use reqwest::header::HeaderValue;
use reqwest::{Client, Response, StatusCode};
use std::sync::Arc;
use std::time::Duration;

/// Builds the single client shared by manifest resolution and part downloads of one run.
pub fn build_client(request_timeout: Duration) -> Result<Client, OdFetchError> {
    Client::builder()
        .cookie_provider(Arc::new(HostOnlyJar::new()))
        .timeout(request_timeout)
        .build()
        .map_err(Into::into)
}

/// Fails with [`OdFetchError::HttpStatus`] (including the body) unless the response is a 200.
pub(crate) async fn require_ok(response: Response) -> Result<Response, OdFetchError> {
    if response.status() == StatusCode::OK {
        return Ok(response);
    }

    let url = response.url().to_string();
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(OdFetchError::HttpStatus { url, status, body })
}

pub(crate) fn header_value(name: &str, value: &[u8]) -> Result<HeaderValue, OdFetchError> {
    HeaderValue::from_bytes(value)
        .map_err(|e| OdFetchError::format(format!("{name} cannot be sent as a header: {e}")))
}
