//! Aggregate queries for organizer dashboards.
//!
//! Every query only counts `COMPLETED` registrations of the given events.
//! Revenue only counts `PAID` ones.

use std::sync::Arc;

use crate::entities::{Registration, registration, registration::RegistrationStatus};
use chrono::{DateTime, Utc};
use eventz_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, QueryFilter, QueryOrder,
    QuerySelect, Select, sea_query::Expr,
};
use serde::Serialize;

const COUNT_SQL: &str = "COUNT(*)";
const TICKETS_SQL: &str = "COALESCE(SUM(quantity), 0)::bigint";
const REVENUE_SQL: &str = "COALESCE(SUM(CASE WHEN payment_status = 'PAID' \
                           THEN ticket_price * quantity ELSE 0 END), 0)::bigint";
const DAY_SQL: &str = "TO_CHAR(created_at AT TIME ZONE 'UTC', 'YYYY-MM-DD')";

/// Registration/ticket/revenue totals.
#[derive(Debug, Clone, Default, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct RegistrationTotals {
    pub registrations: i64,
    pub tickets: i64,
    pub revenue: i64,
}

/// Totals for one ticket type.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct TicketTypeStat {
    pub ticket_type: String,
    pub count: i64,
    pub tickets: i64,
    pub revenue: i64,
}

/// Totals for one event.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct EventStat {
    pub event_id: String,
    pub count: i64,
    pub revenue: i64,
}

/// Totals for one UTC day (`YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct DailyStat {
    pub date: String,
    pub count: i64,
    pub revenue: i64,
}

/// Count for one payment status.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult, Serialize)]
pub struct PaymentStatusStat {
    pub payment_status: String,
    pub count: i64,
}

/// Read-only aggregate queries over registrations.
#[derive(Clone)]
pub struct AnalyticsRepository {
    db: Arc<DatabaseConnection>,
}

fn completed_in(event_ids: &[String]) -> Select<Registration> {
    Registration::find()
        .filter(registration::Column::EventId.is_in(event_ids.iter().map(String::as_str)))
        .filter(registration::Column::Status.eq(RegistrationStatus::Completed))
}

impl AnalyticsRepository {
    /// Create a new analytics repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Totals across `event_ids`, optionally only since `since`.
    pub async fn totals(
        &self,
        event_ids: &[String],
        since: Option<DateTime<Utc>>,
    ) -> AppResult<RegistrationTotals> {
        if event_ids.is_empty() {
            return Ok(RegistrationTotals::default());
        }

        let mut query = completed_in(event_ids);
        if let Some(since) = since {
            query = query.filter(registration::Column::CreatedAt.gte(since));
        }

        let totals = query
            .select_only()
            .column_as(Expr::cust(COUNT_SQL), "registrations")
            .column_as(Expr::cust(TICKETS_SQL), "tickets")
            .column_as(Expr::cust(REVENUE_SQL), "revenue")
            .into_model::<RegistrationTotals>()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(totals.unwrap_or_default())
    }

    /// Totals grouped by ticket type.
    pub async fn by_ticket_type(&self, event_ids: &[String]) -> AppResult<Vec<TicketTypeStat>> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }

        completed_in(event_ids)
            .select_only()
            .column(registration::Column::TicketType)
            .column_as(Expr::cust(COUNT_SQL), "count")
            .column_as(Expr::cust(TICKETS_SQL), "tickets")
            .column_as(Expr::cust(REVENUE_SQL), "revenue")
            .group_by(registration::Column::TicketType)
            .order_by_asc(registration::Column::TicketType)
            .into_model::<TicketTypeStat>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Events with the most registrations.
    pub async fn top_events(&self, event_ids: &[String], limit: u64) -> AppResult<Vec<EventStat>> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }

        completed_in(event_ids)
            .select_only()
            .column(registration::Column::EventId)
            .column_as(Expr::cust(COUNT_SQL), "count")
            .column_as(Expr::cust(REVENUE_SQL), "revenue")
            .group_by(registration::Column::EventId)
            .order_by_desc(Expr::cust(COUNT_SQL))
            .limit(limit)
            .into_model::<EventStat>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Per-day totals since `since`, oldest day first.
    pub async fn daily_trend(
        &self,
        event_ids: &[String],
        since: DateTime<Utc>,
    ) -> AppResult<Vec<DailyStat>> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }

        completed_in(event_ids)
            .filter(registration::Column::CreatedAt.gte(since))
            .select_only()
            .column_as(Expr::cust(DAY_SQL), "date")
            .column_as(Expr::cust(COUNT_SQL), "count")
            .column_as(Expr::cust(REVENUE_SQL), "revenue")
            .group_by(Expr::cust(DAY_SQL))
            .order_by_asc(Expr::cust(DAY_SQL))
            .into_model::<DailyStat>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Counts grouped by payment status.
    pub async fn by_payment_status(
        &self,
        event_ids: &[String],
    ) -> AppResult<Vec<PaymentStatusStat>> {
        if event_ids.is_empty() {
            return Ok(Vec::new());
        }

        completed_in(event_ids)
            .select_only()
            .column(registration::Column::PaymentStatus)
            .column_as(Expr::cust(COUNT_SQL), "count")
            .group_by(registration::Column::PaymentStatus)
            .order_by_asc(registration::Column::PaymentStatus)
            .into_model::<PaymentStatusStat>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    #[tokio::test]
    async fn test_totals() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "registrations" => Value::BigInt(Some(4)),
                    "tickets" => Value::BigInt(Some(7)),
                    "revenue" => Value::BigInt(Some(3_500)),
                }]])
                .into_connection(),
        );

        let repo = AnalyticsRepository::new(db);
        let totals = repo.totals(&["ev1".to_string()], None).await.unwrap();
        assert_eq!(
            totals,
            RegistrationTotals {
                registrations: 4,
                tickets: 7,
                revenue: 3_500,
            }
        );
    }

    #[tokio::test]
    async fn test_totals_without_events() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = AnalyticsRepository::new(db);
        let totals = repo.totals(&[], None).await.unwrap();
        assert_eq!(totals, RegistrationTotals::default());
    }

    #[tokio::test]
    async fn test_by_ticket_type() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    maplit::btreemap! {
                        "ticket_type" => Value::from("REGULAR"),
                        "count" => Value::BigInt(Some(3)),
                        "tickets" => Value::BigInt(Some(3)),
                        "revenue" => Value::BigInt(Some(1_500)),
                    },
                    maplit::btreemap! {
                        "ticket_type" => Value::from("VIP"),
                        "count" => Value::BigInt(Some(1)),
                        "tickets" => Value::BigInt(Some(2)),
                        "revenue" => Value::BigInt(Some(4_000)),
                    },
                ]])
                .into_connection(),
        );

        let repo = AnalyticsRepository::new(db);
        let stats = repo.by_ticket_type(&["ev1".to_string()]).await.unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[1].ticket_type, "VIP");
        assert_eq!(stats[1].revenue, 4_000);
    }
}
