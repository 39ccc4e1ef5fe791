//! Bulk outreach: one templated message per unique contact, sent strictly in
//! sequence through a `MailTransport`, spaced by a `Throttle`.

pub mod attachment;
pub mod template;
pub mod throttle;
pub mod transport;

use std::collections::HashSet;
use std::sync::Arc;

use log::{error, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::MailerError;
use crate::store::ContactRecord;

pub use attachment::{AttachmentSource, FileAttachment, MailAttachment};
pub use template::OutreachTemplate;
pub use throttle::{Clock, ManualClock, Throttle, ThrottlePolicy, TokioClock};
pub use transport::{MailTransport, OutgoingMail, SmtpMailTransport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailDispatchResult {
    pub email: String,
    pub status: DispatchStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResult {
    pub success: bool,
    pub results: Vec<MailDispatchResult>,
    pub total_sent: usize,
    pub total_failed: usize,
}

impl BatchResult {
    pub fn from_results(results: Vec<MailDispatchResult>) -> Self {
        let total_sent = results
            .iter()
            .filter(|r| r.status == DispatchStatus::Success)
            .count();
        let total_failed = results
            .iter()
            .filter(|r| r.status == DispatchStatus::Failed)
            .count();

        BatchResult {
            success: true,
            results,
            total_sent,
            total_failed,
        }
    }
}

/// Keep the first record for each distinct email; records without one are dropped
pub fn unique_contacts(contacts: &[ContactRecord]) -> Vec<&ContactRecord> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for contact in contacts {
        if let Some(email) = contact.email.as_deref() {
            if seen.insert(email) {
                unique.push(contact);
            }
        }
    }
    unique
}

pub struct BulkMailer {
    transport: Arc<dyn MailTransport>,
    attachment: Arc<dyn AttachmentSource>,
    template: OutreachTemplate,
    sender: String,
    policy: ThrottlePolicy,
    clock: Arc<dyn Clock>,
}

impl BulkMailer {
    pub fn new(
        transport: Arc<dyn MailTransport>,
        attachment: Arc<dyn AttachmentSource>,
        sender: impl Into<String>,
    ) -> Self {
        BulkMailer {
            transport,
            attachment,
            template: OutreachTemplate::default(),
            sender: sender.into(),
            policy: ThrottlePolicy::default(),
            clock: Arc::new(TokioClock),
        }
    }

    pub fn with_template(mut self, template: OutreachTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn with_throttle(mut self, policy: ThrottlePolicy, clock: Arc<dyn Clock>) -> Self {
        self.policy = policy;
        self.clock = clock;
        self
    }

    /// Send one message per unique email. Individual failures are recorded and
    /// the batch moves on; only a setup failure (the attachment) is an `Err`.
    pub async fn send_bulk(&self, contacts: &[ContactRecord]) -> Result<BatchResult, MailerError> {
        let attachment = self.attachment.load()?;
        let recipients = unique_contacts(contacts);

        info!(
            "📧 Sending batch: {} unique recipient(s) out of {} contact(s)",
            recipients.len(),
            contacts.len()
        );

        let mut throttle = Throttle::new(self.policy, self.clock.clone());
        let mut results = Vec::with_capacity(recipients.len());

        for (index, contact) in recipients.iter().enumerate() {
            let Some(email) = contact.email.clone() else {
                continue;
            };

            throttle.acquire().await;

            let (subject, html) = self.template.render(contact);
            let mail = OutgoingMail {
                from: self.sender.clone(),
                to: email.clone(),
                subject,
                html,
                attachments: vec![attachment.clone()],
            };

            match self.transport.send(&mail).await {
                Ok(()) => {
                    info!("✅ Email {}/{} sent to {}", index + 1, recipients.len(), email);
                    results.push(MailDispatchResult {
                        email,
                        status: DispatchStatus::Success,
                        error: None,
                    });
                }
                Err(e) => {
                    error!("❌ Failed to send email to {}: {}", email, e);
                    results.push(MailDispatchResult {
                        email,
                        status: DispatchStatus::Failed,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let batch = BatchResult::from_results(results);
        if batch.total_failed > 0 {
            warn!(
                "Batch finished with failures: {} sent, {} failed",
                batch.total_sent, batch.total_failed
            );
        } else {
            info!("Batch finished: {} sent", batch.total_sent);
        }

        Ok(batch)
    }
}
