use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Bytes};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use linkscrape::error::MailerError;
use linkscrape::mailer::{
    BulkMailer, FileAttachment, MailAttachment, MailTransport, ManualClock, OutgoingMail,
    ThrottlePolicy,
};
use linkscrape::server::{health_check, send_email, AppState};

#[derive(Default)]
struct CountingTransport {
    recipients: Mutex<Vec<String>>,
}

#[async_trait]
impl MailTransport for CountingTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailerError> {
        self.recipients.lock().unwrap().push(mail.to.clone());
        if mail.to.starts_with("bounce") {
            return Err(MailerError::Transport("550 no such user".to_string()));
        }
        Ok(())
    }
}

fn state(transport: Arc<CountingTransport>) -> AppState {
    let attachment = Arc::new(MailAttachment {
        filename: "resume.pdf".to_string(),
        content: b"%PDF-1.4".to_vec(),
        content_type: "application/pdf".to_string(),
    });
    AppState::new(
        BulkMailer::new(transport, attachment, "me@gmail.com")
            .with_throttle(ThrottlePolicy::default(), Arc::new(ManualClock::new())),
    )
}

async fn json_body(response: Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read response body");
    serde_json::from_slice(&bytes).expect("Response is not JSON")
}

#[tokio::test]
async fn test_send_email_returns_batch() {
    let transport = Arc::new(CountingTransport::default());
    let body = Bytes::from(
        r#"{"posts":[
            {"id":"1","authorName":"Jane Doe","email":"jane@acme.com","capturedAt":1700000000000},
            {"id":"2","authorName":"Jane Doe","email":"jane@acme.com"},
            {"id":"3","authorName":"Bad Address","email":"bounce@acme.com"},
            {"id":"4","authorName":"No Email"}
        ]}"#,
    );

    let response = send_email(State(state(transport.clone())), body).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["totalSent"], 1);
    assert_eq!(json["totalFailed"], 1);
    assert_eq!(json["results"][0]["email"], "jane@acme.com");
    assert_eq!(json["results"][0]["status"], "success");
    assert_eq!(json["results"][1]["status"], "failed");
    assert!(json["results"][1]["error"]
        .as_str()
        .is_some_and(|e| e.contains("550")));

    assert_eq!(
        *transport.recipients.lock().unwrap(),
        vec!["jane@acme.com".to_string(), "bounce@acme.com".to_string()]
    );
}

#[tokio::test]
async fn test_malformed_body_is_a_server_error() {
    let transport = Arc::new(CountingTransport::default());

    let response = send_email(State(state(transport.clone())), Bytes::from("{not json")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = json_body(response).await;
    assert_eq!(json["success"], false);
    assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));
    assert!(transport.recipients.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_attachment_is_a_server_error() {
    let transport = Arc::new(CountingTransport::default());
    let mailer = BulkMailer::new(
        transport.clone(),
        Arc::new(FileAttachment::new("data_test/missing-resume.pdf")),
        "me@gmail.com",
    );

    let body = Bytes::from(r#"{"posts":[{"id":"1","email":"jane@acme.com"}]}"#);
    let response = send_email(State(AppState::new(mailer)), body).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = json_body(response).await;
    assert_eq!(json["success"], false);
    assert!(json["error"]
        .as_str()
        .is_some_and(|e| e.contains("missing-resume.pdf")));
    assert!(transport.recipients.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_health_check() {
    let response = health_check().await.into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
}
