//! Invoice repository.

use std::sync::Arc;

use crate::entities::{Invoice, invoice};
use eventz_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseConnection,
    EntityTrait, QueryFilter, Statement,
};

/// Invoice repository for database operations.
#[derive(Clone)]
pub struct InvoiceRepository {
    db: Arc<DatabaseConnection>,
}

impl InvoiceRepository {
    /// Create a new invoice repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Take the next invoice sequence number for `year`.
    ///
    /// The upsert is a single statement, so concurrent callers never see
    /// the same number.
    pub async fn next_sequence(&self, year: i32) -> AppResult<i32> {
        let row = self
            .db
            .query_one(Statement::from_sql_and_values(
                DatabaseBackend::Postgres,
                r"
                INSERT INTO invoice_counter (year, seq) VALUES ($1, 1)
                ON CONFLICT (year) DO UPDATE SET seq = invoice_counter.seq + 1
                RETURNING seq
                ",
                [year.into()],
            ))
            .await
            .map_err(|e| AppError::Database(e.to_string()))?
            .ok_or_else(|| AppError::Database("invoice counter returned no row".to_string()))?;

        row.try_get::<i32>("", "seq")
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the invoice issued for a registration.
    pub async fn find_by_registration(
        &self,
        registration_id: &str,
    ) -> AppResult<Option<invoice::Model>> {
        Invoice::find()
            .filter(invoice::Column::RegistrationId.eq(registration_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new invoice.
    pub async fn create(&self, model: invoice::ActiveModel) -> AppResult<invoice::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::MockDatabase;

    #[tokio::test]
    async fn test_next_sequence() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "seq" => sea_orm::Value::Int(Some(42)),
                }]])
                .into_connection(),
        );

        let repo = InvoiceRepository::new(db);
        assert_eq!(repo.next_sequence(2026).await.unwrap(), 42);
    }
}
