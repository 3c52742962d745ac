//! Messages accepted by the backend

use sendpulse_api::Mailbox;

/// One message handed to the backend by the host application.
///
/// Carries the rendered body parts directly; the backend reads them
/// as-is instead of re-extracting them from a serialized message.
#[derive(Debug, Clone)]
pub struct OutgoingMessage {
    /// Subject line
    pub subject: String,
    /// Plain text body
    pub text_body: Option<String>,
    /// HTML body
    pub html_body: Option<String>,
    /// Sender, falling back to the backend's configured sender when unset
    pub from: Option<Mailbox>,
    /// Recipients
    pub to: Vec<Mailbox>,
}

impl OutgoingMessage {
    /// Create a message with no body parts and no recipients yet
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            text_body: None,
            html_body: None,
            from: None,
            to: Vec::new(),
        }
    }

    /// Set the sender
    pub fn sender(mut self, mailbox: Mailbox) -> Self {
        self.from = Some(mailbox);
        self
    }

    /// Add a recipient
    pub fn to(mut self, mailbox: Mailbox) -> Self {
        self.to.push(mailbox);
        self
    }

    /// Set the plain text body
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text_body = Some(body.into());
        self
    }

    /// Set the HTML body
    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.html_body = Some(body.into());
        self
    }

    /// Recipients of this message
    pub fn recipients(&self) -> &[Mailbox] {
        &self.to
    }
}
