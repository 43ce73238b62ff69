//! Shared error types for the catalog and streaming clients.

use thiserror::Error;

/// Failure modes of an upstream API call.
///
/// `RateLimited` is only surfaced once the scheduler has exhausted its
/// retry budget; a single 429 response is handled internally.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Upstream pacing exhausted all retries
    #[error("rate limited by upstream after exhausting retries")]
    RateLimited,

    /// Non-429 HTTP failure
    #[error("upstream error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Transport-level failure (DNS, connect, timeout)
    #[error("network error: {0}")]
    Network(String),

    /// Upstream payload did not match the expected schema
    #[error("invalid upstream payload: {0}")]
    Validation(String),
}

impl ApiError {
    /// Whether the scheduler should retry this failure in place
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, ApiError::RateLimited)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_status() {
        let err = ApiError::Upstream {
            status: 404,
            message: "Not Found".to_string(),
        };
        assert!(err.to_string().contains("404"));
        assert!(err.to_string().contains("Not Found"));
    }

    #[test]
    fn test_rate_limit_classification() {
        assert!(ApiError::RateLimited.is_rate_limit());
        assert!(!ApiError::Network("timeout".to_string()).is_rate_limit());
    }
}
