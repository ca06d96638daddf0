//! Invoices for paid registrations.

use chrono::{DateTime, Datelike, Utc};
use eventz_common::{AppResult, IdGenerator};
use eventz_db::{
    entities::{invoice, registration},
    repositories::InvoiceRepository,
};
use sea_orm::Set;
use tracing::info;

use super::{
    EmailAttachment, EmailService,
    pdf::{self, InvoiceDocument},
    templates::EmailTemplate,
};

/// `INV-<year>-<seq>`, with the sequence zero-padded to four digits.
#[must_use]
pub fn format_invoice_number(year: i32, seq: i32) -> String {
    format!("INV-{year}-{seq:04}")
}

/// Invoice service for business logic.
#[derive(Clone)]
pub struct InvoiceService {
    invoice_repo: InvoiceRepository,
    email: EmailService,
    id_gen: IdGenerator,
}

impl InvoiceService {
    /// Create a new invoice service.
    #[must_use]
    pub fn new(invoice_repo: InvoiceRepository, email: EmailService) -> Self {
        Self {
            invoice_repo,
            email,
            id_gen: IdGenerator::new(),
        }
    }

    fn document(invoice: &invoice::Model) -> InvoiceDocument {
        let issued: DateTime<Utc> = invoice.created_at.into();
        InvoiceDocument {
            invoice_number: invoice.invoice_number.clone(),
            issued_on: issued.format("%d %b %Y").to_string(),
            user_name: invoice.user_name.clone(),
            user_email: invoice.user_email.clone(),
            event_title: invoice.event_title.clone(),
            quantity: invoice.quantity,
            unit_price: invoice.unit_price,
            total_amount: invoice.total_amount,
        }
    }

    /// Issue the invoice for a registration, or return the one already issued.
    pub async fn create_invoice(
        &self,
        registration: &registration::Model,
        event_title: &str,
    ) -> AppResult<invoice::Model> {
        if let Some(existing) = self
            .invoice_repo
            .find_by_registration(&registration.id)
            .await?
        {
            return Ok(existing);
        }

        let now = Utc::now();
        let seq = self.invoice_repo.next_sequence(now.year()).await?;
        let invoice_number = format_invoice_number(now.year(), seq);

        let model = invoice::ActiveModel {
            id: Set(self.id_gen.generate()),
            invoice_number: Set(invoice_number),
            registration_id: Set(registration.id.clone()),
            user_name: Set(registration.user_name.clone()),
            user_email: Set(registration.user_email.clone()),
            event_title: Set(event_title.to_string()),
            quantity: Set(registration.quantity),
            unit_price: Set(registration.ticket_price),
            total_amount: Set(registration.total_amount()),
            created_at: Set(now.into()),
        };

        let invoice = self.invoice_repo.create(model).await?;
        info!(
            invoice_number = %invoice.invoice_number,
            registration_id = %registration.id,
            "Invoice issued"
        );
        Ok(invoice)
    }

    /// Render the invoice PDF.
    pub fn render_pdf(&self, invoice: &invoice::Model) -> AppResult<Vec<u8>> {
        pdf::render_invoice(&Self::document(invoice))
    }

    /// Issue the invoice and email it with the PDF attached.
    pub async fn send_invoice(
        &self,
        registration: &registration::Model,
        event_title: &str,
    ) -> AppResult<invoice::Model> {
        let invoice = self.create_invoice(registration, event_title).await?;
        let pdf = self.render_pdf(&invoice)?;

        self.email
            .send_template(
                &invoice.user_email,
                &EmailTemplate::Invoice {
                    user_name: &invoice.user_name,
                    event_title: &invoice.event_title,
                    invoice_number: &invoice.invoice_number,
                    quantity: invoice.quantity,
                    unit_price: invoice.unit_price,
                    total_amount: invoice.total_amount,
                },
                vec![EmailAttachment::pdf("invoice.pdf", pdf)],
            )
            .await?;

        Ok(invoice)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_fixtures;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::sync::Arc;

    fn invoice_for(registration: &registration::Model, number: &str) -> invoice::Model {
        invoice::Model {
            id: "inv1".to_string(),
            invoice_number: number.to_string(),
            registration_id: registration.id.clone(),
            user_name: registration.user_name.clone(),
            user_email: registration.user_email.clone(),
            event_title: "Rust Meetup".to_string(),
            quantity: registration.quantity,
            unit_price: registration.ticket_price,
            total_amount: registration.total_amount(),
            created_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_format_invoice_number() {
        assert_eq!(format_invoice_number(2026, 7), "INV-2026-0007");
        assert_eq!(format_invoice_number(2026, 12345), "INV-2026-12345");
    }

    #[tokio::test]
    async fn test_send_invoice_allocates_number_and_emails_pdf() {
        let registration = test_fixtures::completed("reg1", "ev1");
        let year = Utc::now().year();
        let number = format_invoice_number(year, 3);
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<invoice::Model>::new()])
            .append_query_results([[maplit::btreemap! {
                "seq" => Value::Int(Some(3)),
            }]])
            .append_query_results([[invoice_for(&registration, &number)]]);
        let (email, outbox) = test_fixtures::mailer();
        let service = InvoiceService::new(InvoiceRepository::new(Arc::new(db.into_connection())), email);

        let invoice = service.send_invoice(&registration, "Rust Meetup").await.unwrap();
        assert_eq!(invoice.invoice_number, number);
        assert_eq!(invoice.total_amount, 1_000);

        let sent = outbox.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, format!("Invoice {number} for Rust Meetup"));
        assert_eq!(sent[0].attachments[0].filename, "invoice.pdf");
    }

    #[tokio::test]
    async fn test_create_invoice_reuses_existing() {
        let registration = test_fixtures::completed("reg1", "ev1");
        let existing = invoice_for(&registration, "INV-2026-0001");
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[existing.clone()]]);
        let (email, _) = test_fixtures::mailer();
        let service = InvoiceService::new(InvoiceRepository::new(Arc::new(db.into_connection())), email);

        let invoice = service.create_invoice(&registration, "Rust Meetup").await.unwrap();
        assert_eq!(invoice, existing);
    }
}
