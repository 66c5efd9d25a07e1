//! HTTP client error types.

use thiserror::Error;

/// Errors from outbound HTTP requests.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request could not be sent.
    #[error("Request failed: {0}")]
    Request(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The response body could not be parsed.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(String),

    /// Outbound HTTP is not available on this target.
    #[error("Outbound HTTP is only available inside the Spin runtime")]
    Unsupported,
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Json(e.to_string())
    }
}
