//! Error types for the backend adapter

use thiserror::Error;

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Errors that can occur while handing messages to the provider
#[derive(Debug, Error)]
pub enum BackendError {
    /// The underlying REST client failed (construction or transport)
    #[error("SendPulse API error: {0}")]
    Api(#[from] sendpulse_api::ApiError),
}
