//! Public contact form.

use chrono::Utc;
use eventz_common::{AppResult, IdGenerator};
use eventz_db::{entities::contact_message, repositories::ContactMessageRepository};
use sea_orm::Set;
use serde::Deserialize;
use tracing::{info, warn};
use validator::Validate;

use super::{EmailService, templates::EmailTemplate};

/// Confirmation shown after a successful submission.
pub const CONTACT_SUCCESS_MESSAGE: &str = "Message sent successfully. We will get back to you soon!";

/// Input for the contact form.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactInput {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1, max = 200))]
    pub subject: String,

    #[validate(length(min = 1, max = 5000))]
    pub message: String,
}

/// Contact service for business logic.
#[derive(Clone)]
pub struct ContactService {
    contact_repo: ContactMessageRepository,
    email: EmailService,
    receiver_email: String,
    id_gen: IdGenerator,
}

impl ContactService {
    /// Create a new contact service.
    #[must_use]
    pub fn new(contact_repo: ContactMessageRepository, email: EmailService, receiver_email: &str) -> Self {
        Self {
            contact_repo,
            email,
            receiver_email: receiver_email.to_string(),
            id_gen: IdGenerator::new(),
        }
    }

    /// Store the message, then notify the inbox and acknowledge the sender.
    ///
    /// Mail failures are logged only; the message is already stored.
    pub async fn submit(&self, input: ContactInput) -> AppResult<contact_message::Model> {
        input.validate()?;

        let model = contact_message::ActiveModel {
            id: Set(self.id_gen.generate()),
            name: Set(input.name.trim().to_string()),
            email: Set(input.email.trim().to_lowercase()),
            subject: Set(input.subject.trim().to_string()),
            message: Set(input.message.trim().to_string()),
            created_at: Set(Utc::now().into()),
        };
        let message = self.contact_repo.create(model).await?;
        info!(message_id = %message.id, "Contact message received");

        let admin_mail = EmailTemplate::ContactAdmin {
            name: &message.name,
            email: &message.email,
            subject: &message.subject,
            message: &message.message,
            received_at: message.created_at.into(),
        };
        let ack_mail = EmailTemplate::ContactAcknowledgement {
            name: &message.name,
            subject: &message.subject,
            message: &message.message,
        };
        let admin = self
            .email
            .send_template(&self.receiver_email, &admin_mail, Vec::new());
        let acknowledgement = self.email.send_template(&message.email, &ack_mail, Vec::new());

        let (admin, acknowledgement) = tokio::join!(admin, acknowledgement);
        if let Err(e) = admin {
            warn!(error = %e, "Failed to notify contact inbox");
        }
        if let Err(e) = acknowledgement {
            warn!(error = %e, "Failed to acknowledge contact message");
        }

        Ok(message)
    }

    /// All messages, newest first.
    pub async fn list(&self) -> AppResult<Vec<contact_message::Model>> {
        self.contact_repo.list().await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_fixtures;
    use eventz_common::AppError;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn input() -> ContactInput {
        ContactInput {
            name: "Meera".to_string(),
            email: "meera@example.com".to_string(),
            subject: "Group booking".to_string(),
            message: "Can we book 20 seats?".to_string(),
        }
    }

    fn stored() -> contact_message::Model {
        contact_message::Model {
            id: "msg1".to_string(),
            name: "Meera".to_string(),
            email: "meera@example.com".to_string(),
            subject: "Group booking".to_string(),
            message: "Can we book 20 seats?".to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_submit_sends_both_mails() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[stored()]]);
        let (email, outbox) = test_fixtures::mailer();
        let service = ContactService::new(
            ContactMessageRepository::new(Arc::new(db.into_connection())),
            email,
            "admin@eventz.test",
        );

        let message = service.submit(input()).await.unwrap();
        assert_eq!(message.id, "msg1");

        let mut recipients: Vec<String> = outbox.sent().into_iter().map(|m| m.to).collect();
        recipients.sort();
        assert_eq!(recipients, vec!["admin@eventz.test", "meera@example.com"]);
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_email() {
        let (email, outbox) = test_fixtures::mailer();
        let service = ContactService::new(
            ContactMessageRepository::new(Arc::new(
                MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
            )),
            email,
            "admin@eventz.test",
        );

        let mut bad = input();
        bad.email = "nope".to_string();
        assert!(matches!(service.submit(bad).await, Err(AppError::Validation(_))));
        assert!(outbox.sent().is_empty());
    }
}
