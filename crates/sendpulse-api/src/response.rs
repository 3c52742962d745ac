//! Response handling and normalization
//!
//! The low-level request path yields a [`RawReply`]: either a status with a
//! parsed JSON body, or just the bare status when the body was not JSON.
//! [`ApiResponse`] is the caller-facing shape the raw reply normalizes
//! into. Provider-side failures are wrapped once in a `data` field; that
//! wrapping is the provider's established contract and is kept as-is.

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

/// Fixed message for 404 replies
pub const NOT_FOUND_MESSAGE: &str = "Sorry, the page you are looking for could not be found.";

/// Fixed message for 500 replies
pub const SERVER_ERROR_MESSAGE: &str =
    "Whoops, looks like something went wrong on the server. Please contact support at tech@sendpulse.com.";

/// What came back over the wire, after the status policy ran but before
/// normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawReply {
    /// Status plus the parsed response body
    Json { status: u16, body: Value },
    /// The body was not valid JSON; only the status code survives
    Bare { status: u16 },
}

/// Normalized error record: `{is_error, http_code?, message?}` merged with
/// whatever structured body the server sent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorReply {
    pub is_error: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl ErrorReply {
    fn http(code: u16) -> Self {
        Self {
            is_error: true,
            http_code: Some(code),
            message: None,
            details: Map::new(),
        }
    }

    fn with_message(code: u16, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::http(code)
        }
    }

    /// An error produced before any network call was made
    pub(crate) fn rejected(message: impl Into<String>) -> Self {
        Self {
            is_error: true,
            http_code: None,
            message: Some(message.into()),
            details: Map::new(),
        }
    }
}

/// Caller-facing result of an API operation. Never an `Err`: provider
/// failures come back as structured payloads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ApiResponse {
    /// Parsed body of a 200 reply, returned as-is
    Success(Value),
    /// Provider-side failure, wrapped in `data` per the provider contract
    Failure { data: ErrorReply },
    /// The request was rejected by local validation and never sent
    Rejected(ErrorReply),
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, ApiResponse::Success(_))
    }

    pub fn is_error(&self) -> bool {
        !self.is_success()
    }
}

impl From<RawReply> for ApiResponse {
    fn from(reply: RawReply) -> Self {
        let error = match reply {
            RawReply::Json { status: 200, body } => {
                debug!("Handled result: {}", body);
                return ApiResponse::Success(body);
            }
            RawReply::Json { status: 404, .. } => ErrorReply::with_message(404, NOT_FOUND_MESSAGE),
            RawReply::Json { status: 500, .. } => {
                ErrorReply::with_message(500, SERVER_ERROR_MESSAGE)
            }
            RawReply::Json { status, body } => {
                let mut error = ErrorReply::http(status);
                if let Value::Object(map) = body {
                    error.details = map;
                }
                error
            }
            RawReply::Bare { status } => ErrorReply::http(status),
        };
        debug!("Handled result: {:?}", error);
        ApiResponse::Failure { data: error }
    }
}
