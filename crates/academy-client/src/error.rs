//! API error types.
//!
//! These represent failures when talking to the server record store or the
//! certificate issuance endpoint. The engine classifies them to decide
//! whether an operation may be retried on the next natural trigger, without
//! string matching.

use thiserror::Error;

/// Errors that can occur when calling the academy server.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server rejected the session token (HTTP 401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The server returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    Http { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// The response body did not match the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl ApiError {
    /// Returns `true` if the operation may succeed when retried on the
    /// next natural trigger (next action or next reconciliation run).
    pub fn is_transient(&self) -> bool {
        !matches!(self, ApiError::Unauthorized(_))
    }
}
