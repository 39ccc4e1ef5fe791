use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use linkscrape::error::MailerError;
use linkscrape::mailer::{
    BulkMailer, DispatchStatus, FileAttachment, MailAttachment, MailTransport, ManualClock,
    OutgoingMail, OutreachTemplate, ThrottlePolicy,
};
use linkscrape::store::ContactRecord;

/// Records every message and fails the ones addressed to `fail_for`
#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<OutgoingMail>>,
    fail_for: Option<String>,
}

impl RecordingTransport {
    fn failing_for(email: &str) -> Self {
        RecordingTransport {
            sent: Mutex::new(Vec::new()),
            fail_for: Some(email.to_string()),
        }
    }

    fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for RecordingTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailerError> {
        self.sent.lock().unwrap().push(mail.clone());
        if self.fail_for.as_deref() == Some(mail.to.as_str()) {
            return Err(MailerError::Transport("550 mailbox unavailable".to_string()));
        }
        Ok(())
    }
}

fn contact(name: &str, email: Option<&str>) -> ContactRecord {
    serde_json::from_value(serde_json::json!({
        "id": format!("id-{}", name),
        "authorName": name,
        "email": email,
        "source": format!("Post by: {}", name),
    }))
    .expect("Failed to build contact")
}

fn resume() -> Arc<MailAttachment> {
    Arc::new(MailAttachment {
        filename: "resume.pdf".to_string(),
        content: b"%PDF-1.4 test".to_vec(),
        content_type: "application/pdf".to_string(),
    })
}

fn mailer(transport: Arc<RecordingTransport>, clock: Arc<ManualClock>) -> BulkMailer {
    BulkMailer::new(transport, resume(), "me@gmail.com")
        .with_throttle(ThrottlePolicy::default(), clock)
}

#[tokio::test]
async fn test_failure_does_not_stop_the_batch() {
    let transport = Arc::new(RecordingTransport::failing_for("bob@buildco.net"));
    let clock = Arc::new(ManualClock::new());
    let mailer = mailer(transport.clone(), clock.clone());

    let contacts = vec![
        contact("Jane Doe", Some("jane@acme.com")),
        contact("Bob Builder", Some("bob@buildco.net")),
        contact("Carol Hiring", Some("carol@startup.org")),
    ];

    let batch = mailer.send_bulk(&contacts).await.expect("Batch should run");
    assert!(batch.success);
    assert_eq!(batch.total_sent, 2);
    assert_eq!(batch.total_failed, 1);
    assert_eq!(batch.results[1].status, DispatchStatus::Failed);
    assert!(batch.results[1]
        .error
        .as_deref()
        .is_some_and(|e| e.contains("550")));
    assert_eq!(batch.results[2].email, "carol@startup.org");
    assert_eq!(batch.results[2].status, DispatchStatus::Success);

    assert_eq!(transport.sent().len(), 3, "Third contact must still be attempted");
    println!("📊 {} sent, {} failed", batch.total_sent, batch.total_failed);
}

#[tokio::test]
async fn test_duplicate_emails_are_sent_once() {
    let transport = Arc::new(RecordingTransport::default());
    let clock = Arc::new(ManualClock::new());
    let mailer = mailer(transport.clone(), clock);

    let contacts = vec![
        contact("Jane Doe", Some("jane@acme.com")),
        contact("No Email", None),
        contact("Jane Again", Some("jane@acme.com")),
    ];

    let batch = mailer.send_bulk(&contacts).await.expect("Batch should run");
    assert_eq!(batch.total_sent, 1);
    assert_eq!(batch.results.len(), 1);

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "jane@acme.com");
    assert_eq!(sent[0].from, "me@gmail.com");
    assert_eq!(sent[0].subject, "Introduction | REF Jane Doe");
    assert!(sent[0].html.contains("Hi Jane,"));
    assert_eq!(sent[0].attachments.len(), 1);
    assert_eq!(sent[0].attachments[0].filename, "resume.pdf");
}

#[tokio::test]
async fn test_sends_are_spaced_by_the_throttle() {
    let transport = Arc::new(RecordingTransport::default());
    let clock = Arc::new(ManualClock::new());
    let mailer = mailer(transport.clone(), clock.clone());

    let contacts = vec![
        contact("A One", Some("a1@one.com")),
        contact("B Two", Some("b2@two.com")),
        contact("C Three", Some("c3@three.com")),
    ];

    mailer.send_bulk(&contacts).await.expect("Batch should run");
    assert_eq!(
        clock.sleeps(),
        vec![Duration::from_secs(1), Duration::from_secs(1)]
    );
}

#[tokio::test]
async fn test_missing_attachment_aborts_before_sending() {
    let transport = Arc::new(RecordingTransport::default());
    let mailer = BulkMailer::new(
        transport.clone(),
        Arc::new(FileAttachment::new("data_test/does-not-exist.pdf")),
        "me@gmail.com",
    );

    let result = mailer
        .send_bulk(&[contact("Jane Doe", Some("jane@acme.com"))])
        .await;
    assert!(matches!(result, Err(MailerError::Attachment { .. })));
    assert!(transport.sent().is_empty());
}

#[tokio::test]
async fn test_custom_template_without_names() {
    let transport = Arc::new(RecordingTransport::default());
    let clock = Arc::new(ManualClock::new());
    let mailer = mailer(transport.clone(), clock)
        .with_template(OutreachTemplate::new("Hello {first_name}", "<p>Dear {first_name}</p>"));

    let batch = mailer
        .send_bulk(&[contact("", Some("hr@company.com"))])
        .await
        .expect("Batch should run");
    assert_eq!(batch.total_sent, 1);

    let sent = transport.sent();
    assert_eq!(sent[0].subject, "Hello there");
    assert_eq!(sent[0].html, "<p>Dear there</p>");
}

#[tokio::test]
async fn test_empty_batch() {
    let transport = Arc::new(RecordingTransport::default());
    let clock = Arc::new(ManualClock::new());
    let mailer = mailer(transport.clone(), clock.clone());

    let batch = mailer.send_bulk(&[]).await.expect("Batch should run");
    assert!(batch.success);
    assert_eq!((batch.total_sent, batch.total_failed), (0, 0));
    assert!(clock.sleeps().is_empty());
}
