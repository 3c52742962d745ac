//! Outbound email records for the transactional send endpoint

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::response::ErrorReply;

/// A named email address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mailbox {
    pub name: String,
    pub email: String,
}

impl Mailbox {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

/// A server-side template reference used instead of an inline body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailTemplate {
    /// Template identifier as registered with the provider
    pub id: String,
    /// Substitution variables, omitted from the payload when empty
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub variables: serde_json::Map<String, serde_json::Value>,
}

impl EmailTemplate {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            variables: serde_json::Map::new(),
        }
    }

    /// Add a substitution variable
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }
}

/// One transactional email, as accepted by `POST smtp/emails`.
///
/// The wire format follows the provider: `html` is always present and is
/// `null` when the message has no HTML part, while `text` and `template`
/// are omitted entirely when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Email {
    pub subject: String,
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<EmailTemplate>,
    pub from: Mailbox,
    pub to: Vec<Mailbox>,
}

impl Email {
    /// Create an email with no body parts and no recipients yet
    pub fn new(subject: impl Into<String>, from: Mailbox) -> Self {
        Self {
            subject: subject.into(),
            html: None,
            text: None,
            template: None,
            from,
            to: Vec::new(),
        }
    }

    /// Set the HTML body
    pub fn html(mut self, body: impl Into<String>) -> Self {
        self.html = Some(body.into());
        self
    }

    /// Set the plain text body
    pub fn text(mut self, body: impl Into<String>) -> Self {
        self.text = Some(body.into());
        self
    }

    /// Use a server-side template instead of an inline body
    pub fn template(mut self, template: EmailTemplate) -> Self {
        self.template = Some(template);
        self
    }

    /// Add a recipient
    pub fn to(mut self, recipient: Mailbox) -> Self {
        self.to.push(recipient);
        self
    }

    /// Check the record before any network call. Returns the first failing
    /// check: body, then subject, then sender/recipients.
    pub(crate) fn validate(&self) -> Option<ErrorReply> {
        if (is_blank(&self.html) || is_blank(&self.text)) && self.template.is_none() {
            return Some(ErrorReply::rejected("Seems we have empty body"));
        }
        if self.subject.trim().is_empty() {
            return Some(ErrorReply::rejected("Seems we have empty subject"));
        }
        let from_empty = self.from.email.trim().is_empty();
        let to_empty = self.to.iter().all(|m| m.email.trim().is_empty());
        if from_empty || to_empty {
            let recipients: Vec<&str> = self.to.iter().map(|m| m.email.as_str()).collect();
            return Some(ErrorReply::rejected(format!(
                "Seems we have empty some credentials 'from': '{}' or 'to': '{}' fields",
                self.from.email,
                recipients.join(", ")
            )));
        }
        None
    }

    /// Produce the outbound copy of the record: the HTML part is sent
    /// base64-encoded, a missing HTML part stays `null`, the text part is
    /// sent verbatim.
    pub(crate) fn encoded(&self) -> Email {
        let engine = base64::engine::general_purpose::STANDARD;
        let mut outbound = self.clone();
        outbound.html = self
            .html
            .as_deref()
            .filter(|h| !h.trim().is_empty())
            .map(|h| engine.encode(h.as_bytes()));
        outbound
    }
}

fn is_blank(part: &Option<String>) -> bool {
    part.as_deref().map_or(true, |s| s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn well_formed() -> Email {
        Email::new("Password reset", Mailbox::new("App", "noreply@example.com"))
            .html("<p>x</p>")
            .text("x")
            .to(Mailbox::new("Jane Roe", "jane@example.com"))
    }

    #[test]
    fn valid_email_passes_validation() {
        assert!(well_formed().validate().is_none());
    }

    #[test]
    fn missing_body_wins_over_every_other_check() {
        // Everything is missing, but the body check fires first
        let email = Email::new("", Mailbox::new("", ""));
        let reply = email.validate().unwrap();
        assert_eq!(reply.message.as_deref(), Some("Seems we have empty body"));
        assert_eq!(reply.http_code, None);
    }

    #[test]
    fn html_without_text_is_an_empty_body() {
        let mut email = well_formed();
        email.text = None;
        let reply = email.validate().unwrap();
        assert_eq!(reply.message.as_deref(), Some("Seems we have empty body"));
    }

    #[test]
    fn template_stands_in_for_both_body_parts() {
        let email = Email::new("Password reset", Mailbox::new("App", "noreply@example.com"))
            .template(EmailTemplate::new("12345").variable("user", "jane"))
            .to(Mailbox::new("Jane Roe", "jane@example.com"));
        assert!(email.validate().is_none());
    }

    #[test]
    fn missing_subject_is_reported_after_body() {
        let mut email = well_formed();
        email.subject = "  ".to_string();
        let reply = email.validate().unwrap();
        assert_eq!(reply.message.as_deref(), Some("Seems we have empty subject"));
    }

    #[test]
    fn missing_sender_or_recipients_is_reported_last() {
        let mut email = well_formed();
        email.to.clear();
        let reply = email.validate().unwrap();
        let message = reply.message.unwrap();
        assert!(message.contains("'from': 'noreply@example.com'"));
        assert!(message.contains("'to': ''"));

        let mut email = well_formed();
        email.from.email.clear();
        let message = email.validate().unwrap().message.unwrap();
        assert!(message.contains("'from': ''"));
        assert!(message.contains("jane@example.com"));
    }

    #[test]
    fn html_is_base64_encoded_on_the_way_out() {
        let outbound = well_formed().encoded();
        assert_eq!(outbound.html.as_deref(), Some("PHA+eDwvcD4="));
        assert_eq!(outbound.text.as_deref(), Some("x"));
    }

    #[test]
    fn absent_html_serializes_as_null() {
        let email = Email::new("S", Mailbox::new("App", "noreply@example.com"))
            .template(EmailTemplate::new("12345"))
            .to(Mailbox::new("Jane Roe", "jane@example.com"));
        let value = serde_json::to_value(email.encoded()).unwrap();
        assert!(value["html"].is_null());
        // Absent text is omitted entirely
        assert!(value.get("text").is_none());
    }
}
