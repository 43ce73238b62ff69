//! HTTP client for the Jikan API with error classification.
//!
//! The client itself performs no pacing or retries; both are the request
//! scheduler's job. It classifies failures into the shared taxonomy so the
//! scheduler can tell a rate-limit signal from a permanent error.

use reqwest::StatusCode;
use shared::error::ApiError;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("anime-universe/", env!("CARGO_PKG_VERSION"));

/// Jikan API v4 client
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    /// Create a new client with the given base URL and request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    /// Issue a single GET request and return the raw JSON payload.
    ///
    /// 429 maps to `RateLimited`, other non-success statuses to `Upstream`,
    /// transport failures to `Network`, unparseable bodies to `Validation`.
    pub async fn get_json(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "GET");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ApiError::RateLimited);
        }

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(ApiError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| ApiError::Validation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = CatalogClient::new("https://api.jikan.moe/v4", Duration::from_secs(30));
        assert!(client.is_ok());
    }
}
