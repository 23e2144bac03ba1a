//! Error types for the Garland Tools client
//!
//! Fetch failures are shared between every caller waiting on the same
//! in-flight request, so the underlying cause is reference counted.

use std::sync::Arc;

use reqwest::StatusCode;
use thiserror::Error;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, GarlandError>;

/// Errors returned by the cache and the client accessors
#[derive(Debug, Clone, Error)]
pub enum GarlandError {
    /// The remote service could not produce a usable payload for `key`
    #[error("failed to fetch {key}: {source}")]
    Fetch {
        key: String,
        #[source]
        source: Arc<FetchFailure>,
    },

    /// A configuration value was rejected before any state changed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The cached payload for `key` is not of the kind the accessor expects
    #[error("unexpected payload for {key}: expected {expected}")]
    UnexpectedPayload { key: String, expected: &'static str },
}

impl GarlandError {
    /// Builds a fetch error for `key`
    pub fn fetch(key: impl Into<String>, source: Arc<FetchFailure>) -> Self {
        GarlandError::Fetch {
            key: key.into(),
            source,
        }
    }

    /// Returns true if this error came from the network or the remote payload
    pub fn is_fetch(&self) -> bool {
        matches!(self, GarlandError::Fetch { .. })
    }
}

/// Underlying cause of a failed fetch
#[derive(Debug, Error)]
pub enum FetchFailure {
    /// Transport-level HTTP failure
    #[error("HTTP request failed: {0}")]
    Http(#[source] reqwest::Error),

    /// The request exceeded the client timeout
    #[error("request timed out")]
    Timeout,

    /// The service answered with something other than 200 OK
    #[error("unexpected HTTP status: {status}")]
    Status { status: StatusCode },

    /// The response body was not valid JSON
    #[error("failed to parse JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    /// A required field was missing from the response
    #[error("missing expected field in response: {0}")]
    MissingField(String),

    /// The fetch task panicked or was cancelled by runtime shutdown
    #[error("fetch task did not complete: {0}")]
    Interrupted(String),
}

impl From<reqwest::Error> for FetchFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchFailure::Timeout
        } else {
            FetchFailure::Http(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display_includes_key_and_cause() {
        let err = GarlandError::fetch(
            "https://example.test/db/doc/item/en/3/1.json",
            Arc::new(FetchFailure::Status {
                status: StatusCode::NOT_FOUND,
            }),
        );

        let message = err.to_string();
        assert!(message.contains("/db/doc/item/en/3/1.json"));
        assert!(message.contains("404"));
        assert!(err.is_fetch());
    }

    #[test]
    fn test_fetch_error_exposes_source() {
        use std::error::Error as _;

        let err = GarlandError::fetch("k", Arc::new(FetchFailure::MissingField("browse".into())));
        let source = err.source().expect("fetch errors carry a source");
        assert_eq!(
            source.to_string(),
            "missing expected field in response: browse"
        );
    }

    #[test]
    fn test_invalid_config_is_not_fetch() {
        let err = GarlandError::InvalidConfig("cache time must be positive".into());
        assert!(!err.is_fetch());
        assert_eq!(
            err.to_string(),
            "invalid configuration: cache time must be positive"
        );
    }
}
