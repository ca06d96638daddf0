//! Email notification service.
//!
//! Services build an [`EmailTemplate`] and hand it to [`EmailService`];
//! delivery goes through an [`EmailTransport`] so the SMTP relay can be
//! swapped for a logging or in-memory transport.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use eventz_common::{AppError, AppResult, config::EmailConfig};
use lettre::{
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
    message::{Attachment, Mailbox, MultiPart, SinglePart, header::ContentType},
    transport::smtp::authentication::Credentials,
};
use tracing::{debug, info};

use super::templates::EmailTemplate;

/// File attached to an outgoing email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl EmailAttachment {
    /// A PDF attachment.
    #[must_use]
    pub fn pdf(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            content_type: "application/pdf".to_string(),
            data,
        }
    }
}

/// Email message to send.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: Option<String>,
    pub reply_to: Option<String>,
    pub attachments: Vec<EmailAttachment>,
}

/// Something that can put an email on the wire.
#[async_trait]
pub trait EmailTransport: Send + Sync {
    /// Deliver a single message.
    async fn deliver(&self, message: &EmailMessage) -> AppResult<()>;
}

/// SMTP relay transport.
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl SmtpTransport {
    /// Build a transport from SMTP settings.
    pub fn from_config(config: &EmailConfig) -> AppResult<Self> {
        let mut builder = if config.starttls {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
                .map_err(|e| AppError::Config(format!("Invalid SMTP relay: {e}")))?
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
        };
        builder = builder.port(config.smtp_port);

        if let (Some(username), Some(password)) = (&config.smtp_username, &config.smtp_password) {
            builder = builder.credentials(Credentials::new(username.clone(), password.clone()));
        }

        let address = config
            .from_address
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid sender address: {e}")))?;

        Ok(Self {
            mailer: builder.build(),
            from: Mailbox::new(Some(config.from_name.clone()), address),
        })
    }

    fn build_message(&self, message: &EmailMessage) -> AppResult<Message> {
        let to: Mailbox = message
            .to
            .parse()
            .map_err(|e| AppError::BadRequest(format!("Invalid recipient address: {e}")))?;

        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(&message.subject);

        if let Some(reply_to) = &message.reply_to {
            let reply_to: Mailbox = reply_to
                .parse()
                .map_err(|e| AppError::BadRequest(format!("Invalid reply-to address: {e}")))?;
            builder = builder.reply_to(reply_to);
        }

        let body = match &message.html_body {
            Some(html) => MultiPart::alternative_plain_html(message.text_body.clone(), html.clone()),
            None => MultiPart::alternative().singlepart(SinglePart::plain(message.text_body.clone())),
        };

        let built = if message.attachments.is_empty() {
            builder.multipart(body)
        } else {
            let mut mixed = MultiPart::mixed().multipart(body);
            for attachment in &message.attachments {
                let content_type = ContentType::parse(&attachment.content_type)
                    .map_err(|e| AppError::Internal(format!("Invalid content type: {e}")))?;
                mixed = mixed.singlepart(
                    Attachment::new(attachment.filename.clone())
                        .body(attachment.data.clone(), content_type),
                );
            }
            builder.multipart(mixed)
        };

        built.map_err(|e| AppError::Internal(format!("Failed to build email: {e}")))
    }
}

#[async_trait]
impl EmailTransport for SmtpTransport {
    async fn deliver(&self, message: &EmailMessage) -> AppResult<()> {
        let email = self.build_message(message)?;
        self.mailer
            .send(email)
            .await
            .map_err(|e| AppError::ExternalService(format!("SMTP delivery failed: {e}")))?;
        Ok(())
    }
}

/// Transport that only logs, used when SMTP is not configured.
#[derive(Debug, Clone, Default)]
pub struct LogTransport;

#[async_trait]
impl EmailTransport for LogTransport {
    async fn deliver(&self, message: &EmailMessage) -> AppResult<()> {
        info!(
            to = %message.to,
            subject = %message.subject,
            attachments = message.attachments.len(),
            "SMTP not configured, email not sent"
        );
        Ok(())
    }
}

/// Transport that keeps messages in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    sent: Arc<Mutex<Vec<EmailMessage>>>,
}

impl MemoryTransport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages delivered so far.
    #[must_use]
    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl EmailTransport for MemoryTransport {
    async fn deliver(&self, message: &EmailMessage) -> AppResult<()> {
        self.sent
            .lock()
            .map_err(|_| AppError::Internal("Mail outbox poisoned".to_string()))?
            .push(message.clone());
        Ok(())
    }
}

/// Email service.
#[derive(Clone)]
pub struct EmailService {
    transport: Arc<dyn EmailTransport>,
}

impl EmailService {
    /// Create a new email service.
    #[must_use]
    pub fn new(transport: Arc<dyn EmailTransport>) -> Self {
        Self { transport }
    }

    /// Pick the SMTP transport when configured, otherwise log only.
    pub fn from_config(config: Option<&EmailConfig>) -> AppResult<Self> {
        let transport: Arc<dyn EmailTransport> = match config {
            Some(config) => Arc::new(SmtpTransport::from_config(config)?),
            None => Arc::new(LogTransport),
        };
        Ok(Self::new(transport))
    }

    /// Send a message.
    pub async fn send(&self, message: EmailMessage) -> AppResult<()> {
        debug!(to = %message.to, subject = %message.subject, "Sending email");
        self.transport.deliver(&message).await
    }

    /// Render a template and send it to `to`.
    pub async fn send_template(
        &self,
        to: &str,
        template: &EmailTemplate<'_>,
        attachments: Vec<EmailAttachment>,
    ) -> AppResult<()> {
        let rendered = template.render();
        self.send(EmailMessage {
            to: to.to_string(),
            subject: rendered.subject,
            text_body: rendered.text,
            html_body: Some(rendered.html),
            reply_to: rendered.reply_to,
            attachments,
        })
        .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_template_uses_transport() {
        let outbox = MemoryTransport::new();
        let service = EmailService::new(Arc::new(outbox.clone()));

        service
            .send_template(
                "ravi@example.com",
                &EmailTemplate::OtpResent {
                    user_name: "Ravi",
                    otp: "123456",
                    valid_minutes: 5,
                },
                vec![EmailAttachment::pdf("ticket.pdf", vec![1, 2, 3])],
            )
            .await
            .unwrap();

        let sent = outbox.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ravi@example.com");
        assert_eq!(sent[0].subject, "OTP Resent");
        assert_eq!(sent[0].attachments[0].content_type, "application/pdf");
    }

    #[test]
    fn test_smtp_message_with_attachment() {
        let config = EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            smtp_username: None,
            smtp_password: None,
            starttls: false,
            from_address: "no-reply@eventz.test".to_string(),
            from_name: "Eventz".to_string(),
        };
        let transport = SmtpTransport::from_config(&config).unwrap();

        let message = EmailMessage {
            to: "ravi@example.com".to_string(),
            subject: "Hello".to_string(),
            text_body: "Hi".to_string(),
            html_body: Some("<p>Hi</p>".to_string()),
            reply_to: Some("meera@example.com".to_string()),
            attachments: vec![EmailAttachment::pdf("ticket.pdf", b"%PDF".to_vec())],
        };

        let built = String::from_utf8(transport.build_message(&message).unwrap().formatted()).unwrap();
        assert!(built.contains("Subject: Hello"));
        assert!(built.contains("Reply-To: meera@example.com"));
        assert!(built.contains("ticket.pdf"));
    }

    #[test]
    fn test_invalid_recipient_is_rejected() {
        let config = EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            smtp_username: None,
            smtp_password: None,
            starttls: false,
            from_address: "no-reply@eventz.test".to_string(),
            from_name: "Eventz".to_string(),
        };
        let transport = SmtpTransport::from_config(&config).unwrap();
        let message = EmailMessage {
            to: "not-an-address".to_string(),
            subject: "Hello".to_string(),
            text_body: "Hi".to_string(),
            html_body: None,
            reply_to: None,
            attachments: Vec::new(),
        };

        assert!(matches!(
            transport.build_message(&message),
            Err(AppError::BadRequest(_))
        ));
    }
}
