//! Ticket issuance and gate verification.

use chrono::Utc;
use eventz_common::{AppError, AppResult};
use eventz_db::{
    entities::{
        event,
        registration::{self, RegistrationStatus},
    },
    repositories::{EventRepository, RegistrationRepository},
};
use tracing::{debug, info, warn};

use super::{
    EmailAttachment, EmailService,
    pdf::{self, TicketDocument},
    qr::{QrMatrix, TicketQrPayload},
    templates::EmailTemplate,
};

/// A rendered ticket PDF.
#[derive(Debug, Clone)]
pub struct TicketPdf {
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Result of scanning a ticket at the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QrVerification {
    Invalid(&'static str),
    Valid {
        user_name: String,
        event_title: String,
        ticket_type: String,
        quantity: i32,
        registration_number: String,
    },
}

/// Ticket service for business logic.
#[derive(Clone)]
pub struct TicketService {
    registration_repo: RegistrationRepository,
    event_repo: EventRepository,
    email: EmailService,
}

fn event_date(event: &event::Model) -> String {
    if event.start_date == event.end_date {
        event.start_date.format("%a, %d %b %Y").to_string()
    } else {
        format!(
            "{} - {}",
            event.start_date.format("%d %b %Y"),
            event.end_date.format("%d %b %Y")
        )
    }
}

fn venue(event: &event::Model) -> String {
    format!("{}, {}", event.location, event.city)
}

fn registration_number(registration: &registration::Model) -> AppResult<&str> {
    registration.registration_number.as_deref().ok_or_else(|| {
        AppError::Internal(format!(
            "Completed registration {} has no registration number",
            registration.id
        ))
    })
}

impl TicketService {
    /// Create a new ticket service.
    #[must_use]
    pub const fn new(
        registration_repo: RegistrationRepository,
        event_repo: EventRepository,
        email: EmailService,
    ) -> Self {
        Self {
            registration_repo,
            event_repo,
            email,
        }
    }

    fn document(registration: &registration::Model, event: &event::Model) -> AppResult<TicketDocument> {
        Ok(TicketDocument {
            user_name: registration.user_name.clone(),
            event_title: event.title.clone(),
            ticket_type: registration.ticket_type.as_str().to_string(),
            quantity: registration.quantity,
            event_date: event_date(event),
            venue: venue(event),
            registration_number: registration_number(registration)?.to_string(),
            amount_paid: (registration.ticket_price > 0).then(|| registration.total_amount()),
        })
    }

    fn qr_for(registration: &registration::Model) -> AppResult<QrMatrix> {
        let payload = TicketQrPayload::new(
            &registration.id,
            registration_number(registration)?,
            &registration.event_id,
        );
        QrMatrix::encode(&payload.to_json()?)
    }

    /// Render the ticket, email it and mark it sent.
    ///
    /// Returns the registration untouched when the ticket was already sent.
    /// The `ticket_sent` flag is claimed before mailing, so concurrent
    /// callers send one ticket between them. A failed send releases the
    /// claim for a later retry.
    pub async fn generate_and_send(
        &self,
        registration: &registration::Model,
    ) -> AppResult<registration::Model> {
        if registration.ticket_sent {
            return Ok(registration.clone());
        }
        if registration.status != RegistrationStatus::Completed {
            return Err(AppError::Unprocessable(
                "Ticket can only be issued for a completed registration".to_string(),
            ));
        }

        let event = self.event_repo.get_by_id(&registration.event_id).await?;
        let qr = Self::qr_for(registration)?;
        let qr_data_url = qr.to_data_url()?;
        let document = Self::document(registration, &event)?;
        let pdf = pdf::render_ticket(&document, &qr)?;

        let now = Utc::now();
        if !self
            .registration_repo
            .claim_ticket(&registration.id, &qr_data_url, now)
            .await?
        {
            debug!(registration_id = %registration.id, "Ticket already claimed");
            return self.registration_repo.get_by_id(&registration.id).await;
        }

        let sent = self
            .email
            .send_template(
                &registration.user_email,
                &EmailTemplate::TicketConfirmation {
                    user_name: &registration.user_name,
                    event_title: &event.title,
                    event_date: &document.event_date,
                    venue: &document.venue,
                    ticket_type: &document.ticket_type,
                    quantity: registration.quantity,
                    registration_number: &document.registration_number,
                },
                vec![EmailAttachment::pdf("ticket.pdf", pdf)],
            )
            .await;

        if let Err(e) = sent {
            if let Err(release) = self.registration_repo.release_ticket(&registration.id).await {
                warn!(
                    error = %release,
                    registration_id = %registration.id,
                    "Failed to release ticket claim"
                );
            }
            return Err(e);
        }

        info!(
            registration_id = %registration.id,
            registration_number = %document.registration_number,
            "Ticket sent"
        );
        Ok(registration::Model {
            qr_code: Some(qr_data_url),
            ticket_sent: true,
            updated_at: Some(now.into()),
            ..registration.clone()
        })
    }

    /// Registration and event behind a ticket.
    pub async fn get(
        &self,
        registration_id: &str,
    ) -> AppResult<(registration::Model, event::Model)> {
        let registration = self.registration_repo.get_by_id(registration_id).await?;
        let event = self.event_repo.get_by_id(&registration.event_id).await?;
        Ok((registration, event))
    }

    /// Re-render the PDF of a confirmed ticket.
    pub async fn download(&self, registration_id: &str) -> AppResult<TicketPdf> {
        let (registration, event) = self.get(registration_id).await?;
        if registration.status != RegistrationStatus::Completed {
            return Err(AppError::Unprocessable("Ticket is not confirmed".to_string()));
        }

        let qr = Self::qr_for(&registration)?;
        let document = Self::document(&registration, &event)?;
        let bytes = pdf::render_ticket(&document, &qr)?;

        Ok(TicketPdf {
            filename: format!("{}.pdf", document.registration_number),
            bytes,
        })
    }

    /// Check a scanned QR payload. Bad input yields `Invalid`, never an error.
    pub async fn verify_qr(&self, qr_data: &str) -> AppResult<QrVerification> {
        let Some(payload) = TicketQrPayload::parse(qr_data) else {
            return Ok(QrVerification::Invalid("Invalid QR format"));
        };

        let Some(registration) = self
            .registration_repo
            .find_by_id(&payload.registration_id)
            .await?
        else {
            return Ok(QrVerification::Invalid("Invalid ticket"));
        };

        if registration.status != RegistrationStatus::Completed {
            return Ok(QrVerification::Invalid("Ticket is not confirmed"));
        }

        let event_title = match self.event_repo.find_by_id(&registration.event_id).await? {
            Some(event) => event.title,
            None => {
                warn!(registration_id = %registration.id, "Ticket refers to a deleted event");
                return Ok(QrVerification::Invalid("Invalid ticket"));
            }
        };

        Ok(QrVerification::Valid {
            user_name: registration.user_name,
            event_title,
            ticket_type: registration.ticket_type.as_str().to_string(),
            quantity: registration.quantity,
            registration_number: registration.registration_number.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_fixtures;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn service(db: MockDatabase) -> (TicketService, crate::services::MemoryTransport) {
        let db = Arc::new(db.into_connection());
        let (email, outbox) = test_fixtures::mailer();
        (
            TicketService::new(
                RegistrationRepository::new(db.clone()),
                EventRepository::new(db),
                email,
            ),
            outbox,
        )
    }

    #[tokio::test]
    async fn test_already_sent_is_noop() {
        let registration = registration::Model {
            ticket_sent: true,
            ..test_fixtures::completed("reg1", "ev1")
        };
        let (service, outbox) = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service.generate_and_send(&registration).await.unwrap();
        assert!(result.ticket_sent);
        assert!(outbox.sent().is_empty());
    }

    #[tokio::test]
    async fn test_requires_completed() {
        let registration =
            test_fixtures::registration("reg1", "ev1", RegistrationStatus::PendingPayment);
        let (service, _) = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = service.generate_and_send(&registration).await;
        assert!(matches!(result, Err(AppError::Unprocessable(_))));
    }

    #[tokio::test]
    async fn test_generate_and_send_attaches_pdf() {
        let registration = test_fixtures::completed("reg1", "ev1");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_fixtures::event("ev1", "org1")]])
            .append_exec_results([test_fixtures::exec(1)]);
        let (service, outbox) = service(db);

        let result = service.generate_and_send(&registration).await.unwrap();
        assert!(result.ticket_sent);
        assert!(result.qr_code.unwrap().starts_with("data:image/png;base64,"));

        let mail = outbox.sent();
        assert_eq!(mail.len(), 1);
        assert_eq!(mail[0].subject, "Your Ticket for Rust Meetup");
        assert_eq!(mail[0].attachments[0].filename, "ticket.pdf");
        assert!(mail[0].attachments[0].data.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_lost_claim_sends_nothing() {
        let registration = test_fixtures::completed("reg1", "ev1");
        let winner = registration::Model {
            ticket_sent: true,
            ..registration.clone()
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_fixtures::event("ev1", "org1")]])
            .append_exec_results([test_fixtures::exec(0)])
            .append_query_results([[winner]]);
        let (service, outbox) = service(db);

        let result = service.generate_and_send(&registration).await.unwrap();
        assert!(result.ticket_sent);
        assert!(outbox.sent().is_empty());
    }

    struct RefusingTransport;

    #[async_trait::async_trait]
    impl crate::services::EmailTransport for RefusingTransport {
        async fn deliver(&self, _message: &crate::services::EmailMessage) -> AppResult<()> {
            Err(AppError::Internal("SMTP unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_failed_send_releases_claim() {
        let registration = test_fixtures::completed("reg1", "ev1");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_fixtures::event("ev1", "org1")]])
                .append_exec_results([test_fixtures::exec(1), test_fixtures::exec(1)])
                .into_connection(),
        );
        let service = TicketService::new(
            RegistrationRepository::new(db.clone()),
            EventRepository::new(db.clone()),
            EmailService::new(Arc::new(RefusingTransport)),
        );

        assert!(service.generate_and_send(&registration).await.is_err());

        drop(service);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        // event lookup, claim, release
        assert_eq!(log.len(), 3);
    }

    #[tokio::test]
    async fn test_verify_invalid_json() {
        let (service, _) = service(MockDatabase::new(DatabaseBackend::Postgres));
        let result = service.verify_qr("garbage").await.unwrap();
        assert_eq!(result, QrVerification::Invalid("Invalid QR format"));
    }

    #[tokio::test]
    async fn test_verify_unknown_registration() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<registration::Model>::new()]);
        let (service, _) = service(db);

        let result = service.verify_qr(r#"{"rId":"missing","v":1}"#).await.unwrap();
        assert_eq!(result, QrVerification::Invalid("Invalid ticket"));
    }

    #[tokio::test]
    async fn test_verify_unconfirmed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
            test_fixtures::registration("reg1", "ev1", RegistrationStatus::PendingPayment),
        ]]);
        let (service, _) = service(db);

        let result = service.verify_qr(r#"{"registrationId":"reg1"}"#).await.unwrap();
        assert_eq!(result, QrVerification::Invalid("Ticket is not confirmed"));
    }

    #[tokio::test]
    async fn test_verify_valid() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_fixtures::completed("reg1", "ev1")]])
            .append_query_results([[test_fixtures::event("ev1", "org1")]]);
        let (service, _) = service(db);

        let result = service
            .verify_qr(r#"{"rId":"reg1","rNo":"REG-1700000000000","eId":"ev1","v":1}"#)
            .await
            .unwrap();
        assert_eq!(
            result,
            QrVerification::Valid {
                user_name: "Ravi".to_string(),
                event_title: "Rust Meetup".to_string(),
                ticket_type: "REGULAR".to_string(),
                quantity: 2,
                registration_number: "REG-1700000000000".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_download_renders_pdf() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_fixtures::completed("reg1", "ev1")]])
            .append_query_results([[test_fixtures::event("ev1", "org1")]]);
        let (service, _) = service(db);

        let ticket = service.download("reg1").await.unwrap();
        assert_eq!(ticket.filename, "REG-1700000000000.pdf");
        assert!(ticket.bytes.starts_with(b"%PDF"));
    }
}
