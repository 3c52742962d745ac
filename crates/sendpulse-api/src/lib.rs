//! REST client for the SendPulse transactional email API
//!
//! Owns the credentials, a cached bearer token and the HTTP calls to the
//! provider. The token is persisted in a pluggable store (flat file or
//! Redis) so it survives process restarts, and is re-acquired at most
//! once per request when the server reports it invalid.

pub mod client;
pub mod error;
pub mod response;
pub mod storage;
pub mod types;

pub use client::{ClientConfig, Payload, SendPulseClient, API_BASE_URL};
pub use error::{ApiError, ApiResult};
pub use response::{ApiResponse, ErrorReply, RawReply};
pub use storage::{
    token_hash_name, FileTokenStore, RedisTokenStore, StorageKind, TokenStore, TOKEN_TTL_SECS,
};
pub use types::{Email, EmailTemplate, Mailbox};

/// Re-exported so callers of [`SendPulseClient::send_request`] do not need
/// a direct reqwest dependency
pub use reqwest::Method;
