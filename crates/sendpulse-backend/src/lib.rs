//! Mail backend adapter for SendPulse
//!
//! Sits between a host application's mail layer and the SendPulse REST
//! API: takes batches of rendered messages, serializes the batches within
//! the process, and delivers each message through
//! [`sendpulse_api::SendPulseClient`], one provider call per recipient.

mod backend;
mod error;
mod message;

pub use backend::{BackendConfig, SendPulseBackend};
pub use error::{BackendError, BackendResult};
pub use message::OutgoingMessage;

/// Re-exports for building configurations and messages without a direct
/// dependency on the API crate
pub use sendpulse_api::{ClientConfig, Mailbox, StorageKind};
