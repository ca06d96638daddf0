//! Organizer repository.

use std::sync::Arc;

use crate::entities::{Organizer, organizer};
use eventz_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};

/// Organizer repository for database operations.
#[derive(Clone)]
pub struct OrganizerRepository {
    db: Arc<DatabaseConnection>,
}

impl OrganizerRepository {
    /// Create a new organizer repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an organizer by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<organizer::Model>> {
        Organizer::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an organizer by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<organizer::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Organizer not found".to_string()))
    }

    /// Find an organizer by login email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<organizer::Model>> {
        Organizer::find()
            .filter(organizer::Column::Email.eq(email.to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an organizer by password reset token.
    pub async fn find_by_reset_token(&self, token: &str) -> AppResult<Option<organizer::Model>> {
        Organizer::find()
            .filter(organizer::Column::PasswordResetToken.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Whether `email` belongs to an organizer other than `id`.
    pub async fn email_taken_by_other(&self, email: &str, id: &str) -> AppResult<bool> {
        let count = Organizer::find()
            .filter(organizer::Column::Email.eq(email.to_lowercase()))
            .filter(organizer::Column::Id.ne(id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Create a new organizer.
    pub async fn create(&self, model: organizer::ActiveModel) -> AppResult<organizer::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an organizer.
    pub async fn update(&self, model: organizer::ActiveModel) -> AppResult<organizer::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an organizer. Their events go with them.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Organizer::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_organizer(id: &str, email: &str) -> organizer::Model {
        organizer::Model {
            id: id.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            name: "Asha".to_string(),
            role: organizer::ROLE_ORGANIZER.to_string(),
            photo_url: None,
            password_reset_token: None,
            password_reset_expires: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_find_by_email() {
        let organizer = create_test_organizer("org1", "asha@example.com");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[organizer.clone()]])
                .into_connection(),
        );

        let repo = OrganizerRepository::new(db);
        let result = repo.find_by_email("Asha@Example.com").await.unwrap();
        assert_eq!(result.unwrap().id, "org1");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<organizer::Model>::new()])
                .into_connection(),
        );

        let repo = OrganizerRepository::new(db);
        let result = repo.get_by_id("missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_email_taken_by_other() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(1)),
                }]])
                .into_connection(),
        );

        let repo = OrganizerRepository::new(db);
        assert!(repo.email_taken_by_other("taken@example.com", "org1").await.unwrap());
    }
}
