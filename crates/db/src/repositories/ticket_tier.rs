//! Ticket tier repository.

use std::sync::Arc;

use crate::entities::{TicketTier, ticket_tier, ticket_tier::TicketType};
use eventz_common::{AppError, AppResult};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};

/// Ticket tier repository for database operations.
#[derive(Clone)]
pub struct TicketTierRepository {
    db: Arc<DatabaseConnection>,
}

impl TicketTierRepository {
    /// Create a new ticket tier repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Tiers of one event in display order.
    pub async fn find_by_event(&self, event_id: &str) -> AppResult<Vec<ticket_tier::Model>> {
        TicketTier::find()
            .filter(ticket_tier::Column::EventId.eq(event_id))
            .order_by_asc(ticket_tier::Column::Position)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Tiers of several events, for list views.
    pub async fn find_by_events(&self, event_ids: &[String]) -> AppResult<Vec<ticket_tier::Model>> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }

        TicketTier::find()
            .filter(ticket_tier::Column::EventId.is_in(event_ids.iter().map(String::as_str)))
            .order_by_asc(ticket_tier::Column::EventId)
            .order_by_asc(ticket_tier::Column::Position)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// The tier of `tier_type` for an event.
    pub async fn find_tier(
        &self,
        event_id: &str,
        tier_type: TicketType,
    ) -> AppResult<Option<ticket_tier::Model>> {
        TicketTier::find()
            .filter(ticket_tier::Column::EventId.eq(event_id))
            .filter(ticket_tier::Column::TierType.eq(tier_type))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    pub fn create_test_tier(event_id: &str, tier_type: TicketType, price: i64) -> ticket_tier::Model {
        ticket_tier::Model {
            id: format!("{event_id}-{}", tier_type.as_str().to_lowercase()),
            event_id: event_id.to_string(),
            tier_type,
            name: tier_type.as_str().to_string(),
            price,
            quantity: 50,
            available: 50,
            description: None,
            position: 0,
        }
    }

    #[tokio::test]
    async fn test_find_tier() {
        let tier = create_test_tier("ev1", TicketType::Vip, 2_000);
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[tier.clone()]])
                .into_connection(),
        );

        let repo = TicketTierRepository::new(db);
        let result = repo.find_tier("ev1", TicketType::Vip).await.unwrap().unwrap();
        assert_eq!(result.price, 2_000);
        assert_eq!(result.tier_type, TicketType::Vip);
    }

    #[tokio::test]
    async fn test_find_by_events_empty_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = TicketTierRepository::new(db);
        assert!(repo.find_by_events(&[]).await.unwrap().is_empty());
    }
}
