//! Batch behavior of the backend against a mock provider

use sendpulse_backend::{
    BackendConfig, ClientConfig, Mailbox, OutgoingMessage, SendPulseBackend,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_ID: &str = "u";
const SECRET: &str = "s";

async fn backend(server: &MockServer, dir: &TempDir) -> SendPulseBackend {
    let key = sendpulse_api::token_hash_name(USER_ID, SECRET);
    std::fs::write(dir.path().join(key), "tok1").unwrap();

    let client = ClientConfig::new(USER_ID, SECRET)
        .base_url(server.uri())
        .token_dir(dir.path());
    let config = BackendConfig::new(client, Mailbox::new("App", "noreply@example.com"));
    SendPulseBackend::new(config).await.unwrap()
}

fn message(recipients: &[&str]) -> OutgoingMessage {
    let mut message = OutgoingMessage::new("Password reset")
        .html("<p>reset link</p>")
        .text("reset link");
    for recipient in recipients {
        message = message.to(Mailbox::new("Jane Roe", *recipient));
    }
    message
}

#[tokio::test]
async fn batch_count_excludes_messages_without_recipients() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    // Two recipients + none + one: three provider calls, two messages sent
    Mock::given(method("POST"))
        .and(path("/smtp/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": true})))
        .expect(3)
        .mount(&server)
        .await;

    let backend = backend(&server, &dir).await;
    let batch = vec![
        message(&["a@example.com", "b@example.com"]),
        message(&[]),
        message(&["c@example.com"]),
    ];
    assert_eq!(backend.send_messages(&batch).await.unwrap(), 2);
}

#[tokio::test]
async fn empty_batch_sends_nothing() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/smtp/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": true})))
        .expect(0)
        .mount(&server)
        .await;

    let backend = backend(&server, &dir).await;
    assert_eq!(backend.send_messages(&[]).await.unwrap(), 0);
}

#[tokio::test]
async fn provider_rejections_do_not_fail_the_batch() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/smtp/emails"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"error_code": 8, "message": "bad"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let backend = backend(&server, &dir).await;
    let batch = vec![message(&["a@example.com"])];
    // The message was handed to the provider, so it still counts
    assert_eq!(backend.send_messages(&batch).await.unwrap(), 1);
}

#[tokio::test]
async fn each_recipient_gets_an_individually_addressed_copy() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    Mock::given(method("POST"))
        .and(path("/smtp/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": true})))
        .expect(2)
        .mount(&server)
        .await;

    let backend = backend(&server, &dir).await;
    let batch = vec![message(&["a@example.com", "b@example.com"])];
    backend.send_messages(&batch).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    for (request, expected) in requests.iter().zip(["a%40example.com", "b%40example.com"]) {
        let body = String::from_utf8(request.body.clone()).unwrap();
        assert!(body.contains(expected), "body does not address {}: {}", expected, body);
    }
}
