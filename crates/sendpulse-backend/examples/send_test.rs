//! Send a single test email through the real API
//!
//! Run with: SENDPULSE_USER_ID=... SENDPULSE_SECRET=... \
//!   cargo run -p sendpulse-backend --example send_test

use sendpulse_backend::{
    BackendConfig, ClientConfig, Mailbox, OutgoingMessage, SendPulseBackend, StorageKind,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let user_id = std::env::var("SENDPULSE_USER_ID")?;
    let secret = std::env::var("SENDPULSE_SECRET")?;
    let sender = std::env::var("SENDPULSE_SENDER").unwrap_or_else(|_| "sender@example.com".into());
    let recipient =
        std::env::var("SENDPULSE_RECIPIENT").unwrap_or_else(|_| "receiver@example.com".into());

    let client = ClientConfig::new(user_id, secret).storage(StorageKind::File);
    let config = BackendConfig::new(client, Mailbox::new("John Doe", sender));
    let backend = SendPulseBackend::new(config).await?;

    let message = OutgoingMessage::new("This is the test task from REST API")
        .html("<p>This is a test task from the SendPulse REST API!</p>")
        .text("This is a test task from the SendPulse REST API!")
        .to(Mailbox::new("Jane Roe", recipient));

    let sent = backend.send_messages(&[message]).await?;
    println!("Sent {} message(s)", sent);

    Ok(())
}
