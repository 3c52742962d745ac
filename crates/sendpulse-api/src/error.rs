//! Error types for the API client

use thiserror::Error;

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur while talking to the SendPulse API
#[derive(Debug, Error)]
pub enum ApiError {
    /// Credentials missing at construction
    #[error("Empty ID or SECRET")]
    EmptyCredentials,

    /// No token could be read from storage or obtained from the server
    #[error("Could not connect to the API, check your ID and SECRET")]
    TokenUnavailable,

    /// HTTP transport failure
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Token store failure
    #[error("Token storage error: {0}")]
    StorageError(String),

    /// Failed to parse a response the call depends on
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Failed to serialize an outbound payload
    #[error("Failed to serialize request: {0}")]
    SerializeError(#[from] serde_json::Error),
}
