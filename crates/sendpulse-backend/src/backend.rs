//! Batch send entry point
//!
//! Implements the "send these messages" contract of a host application's
//! mail layer: messages are sent one by one, a message without recipients
//! is skipped, and the provider is called once per recipient so each
//! recipient receives an individually addressed copy.

use sendpulse_api::{ClientConfig, Email, Mailbox, SendPulseClient};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::BackendResult;
use crate::message::OutgoingMessage;

/// Backend configuration
#[derive(Debug, Clone)]
pub struct BackendConfig {
    /// REST client configuration (credentials, token storage, endpoint)
    pub client: ClientConfig,
    /// Sender used for messages that do not carry their own
    pub sender: Mailbox,
}

impl BackendConfig {
    pub fn new(client: ClientConfig, sender: Mailbox) -> Self {
        Self { client, sender }
    }
}

/// Mail backend that delivers messages through the SendPulse REST API
pub struct SendPulseBackend {
    client: SendPulseClient,
    sender: Mailbox,
    // Serializes whole batches; exclusion is process-local only
    batch_lock: Mutex<()>,
}

impl SendPulseBackend {
    /// Build the backend. Fails when the inner client cannot obtain a
    /// token (bad credentials, unreachable provider or store).
    pub async fn new(config: BackendConfig) -> BackendResult<Self> {
        let client = SendPulseClient::new(config.client).await?;
        Ok(Self {
            client,
            sender: config.sender,
            batch_lock: Mutex::new(()),
        })
    }

    /// Send every message in the batch and return how many were handed to
    /// the provider. Messages without recipients are skipped and do not
    /// count. Concurrent batches within this process run one at a time.
    ///
    /// Provider-side rejections are logged but do not fail the batch;
    /// only transport-level failures abort it.
    pub async fn send_messages(&self, messages: &[OutgoingMessage]) -> BackendResult<usize> {
        if messages.is_empty() {
            return Ok(0);
        }
        let _guard = self.batch_lock.lock().await;
        let mut sent = 0;
        for message in messages {
            if self.send(message).await? {
                sent += 1;
            }
        }
        info!("Batch done, {} of {} messages sent", sent, messages.len());
        Ok(sent)
    }

    /// Send one message, fanned out as one provider call per recipient.
    /// Returns whether the message counts as sent.
    async fn send(&self, message: &OutgoingMessage) -> BackendResult<bool> {
        if message.to.is_empty() {
            debug!("Skipping message '{}': no recipients", message.subject);
            return Ok(false);
        }
        let from = message.from.clone().unwrap_or_else(|| self.sender.clone());
        for recipient in &message.to {
            let mut email = Email::new(&message.subject, from.clone()).to(recipient.clone());
            if let Some(html) = &message.html_body {
                email = email.html(html.clone());
            }
            if let Some(text) = &message.text_body {
                email = email.text(text.clone());
            }

            let response = self.client.smtp_send_mail(&email).await?;
            if response.is_error() {
                warn!(
                    "Provider did not accept message '{}' for {}: {:?}",
                    message.subject, recipient.email, response
                );
            }
        }
        Ok(true)
    }
}
