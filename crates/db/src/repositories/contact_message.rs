//! Contact message repository.

use std::sync::Arc;

use crate::entities::{ContactMessage, contact_message};
use eventz_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder};

/// Contact message repository for database operations.
#[derive(Clone)]
pub struct ContactMessageRepository {
    db: Arc<DatabaseConnection>,
}

impl ContactMessageRepository {
    /// Create a new contact message repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Store a submitted message.
    pub async fn create(
        &self,
        model: contact_message::ActiveModel,
    ) -> AppResult<contact_message::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All messages, newest first.
    pub async fn list(&self) -> AppResult<Vec<contact_message::Model>> {
        ContactMessage::find()
            .order_by_desc(contact_message::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
