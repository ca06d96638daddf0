//! Event repository.

use std::sync::Arc;

use crate::entities::{Event, TicketTier, event, event::EventStatus, ticket_tier};
use chrono::Utc;
use eventz_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};

/// Filters for the public event listing.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Defaults to published events when `None`.
    pub status: Option<EventStatus>,
    pub category: Option<String>,
    pub city: Option<String>,
}

/// Event repository for database operations.
#[derive(Clone)]
pub struct EventRepository {
    db: Arc<DatabaseConnection>,
}

impl EventRepository {
    /// Create a new event repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an event by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<event::Model>> {
        Event::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get an event by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<event::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Event not found".to_string()))
    }

    /// List events matching `filter`, soonest first.
    pub async fn list(&self, filter: &EventFilter) -> AppResult<Vec<event::Model>> {
        let mut query = Event::find()
            .filter(event::Column::Status.eq(filter.status.unwrap_or(EventStatus::Published)));

        if let Some(category) = &filter.category {
            query = query.filter(event::Column::Category.eq(category.as_str()));
        }
        if let Some(city) = &filter.city {
            query = query.filter(event::Column::City.eq(city.as_str()));
        }

        query
            .order_by_asc(event::Column::StartDate)
            .order_by_desc(event::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All events of an organizer, newest first.
    pub async fn find_by_organizer(&self, organizer_id: &str) -> AppResult<Vec<event::Model>> {
        Event::find()
            .filter(event::Column::OrganizerId.eq(organizer_id))
            .order_by_desc(event::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert an event together with its tiers.
    pub async fn create_with_tiers(
        &self,
        model: event::ActiveModel,
        tiers: Vec<ticket_tier::ActiveModel>,
    ) -> AppResult<event::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let created = model
            .insert(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if !tiers.is_empty() {
            TicketTier::insert_many(tiers)
                .exec_without_returning(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(created)
    }

    /// Update an event, replacing its tiers when `tiers` is given.
    pub async fn update_with_tiers(
        &self,
        model: event::ActiveModel,
        tiers: Option<Vec<ticket_tier::ActiveModel>>,
    ) -> AppResult<event::Model> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let updated = model
            .update(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if let Some(tiers) = tiers {
            TicketTier::delete_many()
                .filter(ticket_tier::Column::EventId.eq(updated.id.as_str()))
                .exec(&txn)
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;

            if !tiers.is_empty() {
                TicketTier::insert_many(tiers)
                    .exec_without_returning(&txn)
                    .await
                    .map_err(|e| AppError::Database(e.to_string()))?;
            }
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(updated)
    }

    /// Set the publication status of an event.
    pub async fn set_status(&self, id: &str, status: EventStatus) -> AppResult<event::Model> {
        let event = self.get_by_id(id).await?;
        let mut active: event::ActiveModel = event.into();
        active.status = Set(status);
        active.updated_at = Set(Some(Utc::now().into()));

        active
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an event. Tiers and registrations cascade.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Event::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use serde_json::json;

    pub fn create_test_event(id: &str, organizer_id: &str) -> event::Model {
        event::Model {
            id: id.to_string(),
            organizer_id: organizer_id.to_string(),
            title: "Rust Meetup".to_string(),
            description: "Talks and pizza".to_string(),
            start_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
            start_time: "18:00".to_string(),
            end_time: "21:00".to_string(),
            location: "Hall 2".to_string(),
            city: "Pune".to_string(),
            category: "tech".to_string(),
            media_urls: json!([]),
            capacity: 100,
            status: EventStatus::Published,
            total_registrations: 0,
            total_revenue: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_list_defaults_to_published() {
        let events = vec![create_test_event("ev1", "org1"), create_test_event("ev2", "org1")];
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([events])
                .into_connection(),
        );

        let repo = EventRepository::new(db.clone());
        let result = repo.list(&EventFilter::default()).await.unwrap();
        assert_eq!(result.len(), 2);

        drop(repo);
        let log = Arc::try_unwrap(db).unwrap().into_transaction_log();
        let sql = format!("{log:?}");
        assert!(sql.contains("PUBLISHED"));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<event::Model>::new()])
                .into_connection(),
        );

        let repo = EventRepository::new(db);
        let err = repo.get_by_id("missing").await.unwrap_err();
        assert_eq!(err.public_message(), "Event not found");
    }

    #[tokio::test]
    async fn test_create_with_tiers() {
        let event = create_test_event("ev1", "org1");
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[event.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = EventRepository::new(db);
        let tier = ticket_tier::ActiveModel {
            id: Set("tier1".to_string()),
            event_id: Set("ev1".to_string()),
            tier_type: Set(ticket_tier::TicketType::Regular),
            name: Set("Regular".to_string()),
            price: Set(500),
            quantity: Set(100),
            available: Set(100),
            description: Set(None),
            position: Set(0),
        };
        let active: event::ActiveModel = event.into();
        let created = repo.create_with_tiers(active, vec![tier]).await.unwrap();
        assert_eq!(created.id, "ev1");
    }
}
