use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use log::{debug, info};

use super::attachment::MailAttachment;
use crate::config::MailConfig;
use crate::error::MailerError;

/// One message as handed to the transport
#[derive(Debug, Clone)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
    pub attachments: Vec<MailAttachment>,
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailerError>;
}

/// SMTP relay with STARTTLS and account credentials
pub struct SmtpMailTransport {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailTransport {
    pub fn new(config: &MailConfig) -> Result<Self, MailerError> {
        info!(
            "Configuring SMTP relay {}:{} for {}",
            config.smtp_host, config.smtp_port, config.user
        );

        let credentials = Credentials::new(config.user.clone(), config.app_password.clone());
        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| MailerError::Transport(e.to_string()))?
            .port(config.smtp_port)
            .credentials(credentials)
            .build();

        Ok(SmtpMailTransport { transport })
    }

    /// multipart/mixed: the HTML body followed by each attachment
    pub fn build_message(mail: &OutgoingMail) -> Result<Message, MailerError> {
        let from: Mailbox = mail
            .from
            .parse()
            .map_err(|_| MailerError::InvalidAddress(mail.from.clone()))?;
        let to: Mailbox = mail
            .to
            .parse()
            .map_err(|_| MailerError::InvalidAddress(mail.to.clone()))?;

        let mut body = MultiPart::mixed().singlepart(SinglePart::html(mail.html.clone()));
        for attachment in &mail.attachments {
            let content_type = ContentType::parse(&attachment.content_type)
                .map_err(|e| MailerError::Build(e.to_string()))?;
            body = body.singlepart(
                Attachment::new(attachment.filename.clone())
                    .body(attachment.content.clone(), content_type),
            );
        }

        Message::builder()
            .from(from)
            .to(to)
            .subject(mail.subject.clone())
            .multipart(body)
            .map_err(|e| MailerError::Build(e.to_string()))
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, mail: &OutgoingMail) -> Result<(), MailerError> {
        let message = Self::build_message(mail)?;
        let response = self
            .transport
            .send(message)
            .await
            .map_err(|e| MailerError::Transport(e.to_string()))?;
        debug!("SMTP accepted message to {}: {:?}", mail.to, response.code());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mail_parser::{MessageParser, MimeHeaders};

    fn mail() -> OutgoingMail {
        OutgoingMail {
            from: "me@example.com".to_string(),
            to: "jane@example.org".to_string(),
            subject: "Introduction | REF Jane".to_string(),
            html: "<p>Hi Jane,</p>".to_string(),
            attachments: vec![MailAttachment {
                filename: "resume.pdf".to_string(),
                content: b"%PDF-1.4 test".to_vec(),
                content_type: "application/pdf".to_string(),
            }],
        }
    }

    #[test]
    fn test_build_message_layout() {
        let raw = SmtpMailTransport::build_message(&mail()).unwrap().formatted();
        let parsed = MessageParser::default().parse(&raw).unwrap();

        assert_eq!(parsed.subject(), Some("Introduction | REF Jane"));
        assert!(parsed.body_html(0).unwrap().contains("Hi Jane"));
        assert_eq!(parsed.attachment_count(), 1);

        let attachment = parsed.attachment(0).unwrap();
        assert_eq!(attachment.attachment_name(), Some("resume.pdf"));
        assert_eq!(attachment.contents(), b"%PDF-1.4 test");
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let mut bad = mail();
        bad.to = "not-an-address".to_string();
        assert!(matches!(
            SmtpMailTransport::build_message(&bad),
            Err(MailerError::InvalidAddress(_))
        ));
    }
}
