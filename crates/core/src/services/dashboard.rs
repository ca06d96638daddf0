//! Organizer dashboards.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use eventz_common::{AppError, AppResult};
use eventz_db::{
    entities::{
        event::{self, EventStatus},
        registration::{self, PaymentStatus},
        ticket_tier::TicketType,
    },
    repositories::{
        AnalyticsRepository, AttendeeFilter, DailyStat, EventRepository, PaymentStatusStat,
        RegistrationRepository, TicketTierRepository, TicketTypeStat,
    },
};
use serde::Serialize;

const TOP_EVENTS: u64 = 5;
const TREND_DAYS: i64 = 30;
const RECENT_DAYS: i64 = 7;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_events: usize,
    pub published_events: usize,
    pub draft_events: usize,
    pub completed_events: usize,
    pub total_registrations: i64,
    pub total_revenue: i64,
    pub recent_registrations: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketTypeBreakdown {
    pub ticket_type: String,
    pub count: i64,
    pub tickets: i64,
    pub revenue: i64,
}

impl From<TicketTypeStat> for TicketTypeBreakdown {
    fn from(s: TicketTypeStat) -> Self {
        Self {
            ticket_type: s.ticket_type,
            count: s.count,
            tickets: s.tickets,
            revenue: s.revenue,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopEvent {
    pub event_id: String,
    pub event_title: String,
    pub registrations: i64,
    pub revenue: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: String,
    pub count: i64,
    pub revenue: i64,
}

impl From<DailyStat> for TrendPoint {
    fn from(s: DailyStat) -> Self {
        Self {
            date: s.date,
            count: s.count,
            revenue: s.revenue,
        }
    }
}

/// Analytics across all events of an organizer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerAnalytics {
    pub summary: DashboardSummary,
    pub ticket_type_stats: Vec<TicketTypeBreakdown>,
    pub top_events: Vec<TopEvent>,
    pub registrations_trend: Vec<TrendPoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    pub id: String,
    pub title: String,
    pub status: EventStatus,
    pub capacity: i32,
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventStats {
    /// Tickets sold.
    pub total_registrations: i64,
    pub total_revenue: i64,
    pub available_tickets: i64,
    pub capacity_filled: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusBreakdown {
    pub payment_status: String,
    pub count: i64,
}

impl From<PaymentStatusStat> for PaymentStatusBreakdown {
    fn from(s: PaymentStatusStat) -> Self {
        Self {
            payment_status: s.payment_status,
            count: s.count,
        }
    }
}

/// Analytics for a single event.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventAnalytics {
    pub event: EventSummary,
    pub stats: EventStats,
    pub ticket_type_stats: Vec<TicketTypeBreakdown>,
    pub payment_status_stats: Vec<PaymentStatusBreakdown>,
}

/// A confirmed attendee as shown to the organizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
    pub registration_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub ticket_type: TicketType,
    pub quantity: i32,
    pub total_amount: i64,
    pub payment_status: PaymentStatus,
    pub registration_number: Option<String>,
    pub registered_at: DateTime<Utc>,
}

impl From<registration::Model> for Attendee {
    fn from(r: registration::Model) -> Self {
        let total_amount = r.total_amount();
        Self {
            registration_id: r.id,
            user_name: r.user_name,
            user_email: r.user_email,
            user_phone: r.user_phone,
            ticket_type: r.ticket_type,
            quantity: r.quantity,
            total_amount,
            payment_status: r.payment_status,
            registration_number: r.registration_number,
            registered_at: r.created_at.into(),
        }
    }
}

/// `sold / capacity` as a percentage with two decimals.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn capacity_filled(sold: i64, capacity: i32) -> String {
    if capacity <= 0 {
        return "0.00%".to_string();
    }
    format!("{:.2}%", sold as f64 * 100.0 / f64::from(capacity))
}

/// Dashboard service for business logic.
#[derive(Clone)]
pub struct DashboardService {
    event_repo: EventRepository,
    tier_repo: TicketTierRepository,
    registration_repo: RegistrationRepository,
    analytics: AnalyticsRepository,
}

impl DashboardService {
    /// Create a new dashboard service.
    #[must_use]
    pub const fn new(
        event_repo: EventRepository,
        tier_repo: TicketTierRepository,
        registration_repo: RegistrationRepository,
        analytics: AnalyticsRepository,
    ) -> Self {
        Self {
            event_repo,
            tier_repo,
            registration_repo,
            analytics,
        }
    }

    async fn owned_event(&self, organizer_id: &str, event_id: &str) -> AppResult<event::Model> {
        let event = self.event_repo.get_by_id(event_id).await?;
        if event.organizer_id != organizer_id {
            return Err(AppError::Forbidden("Access denied".to_string()));
        }
        Ok(event)
    }

    /// Totals, breakdowns and trend for every event of an organizer.
    pub async fn organizer_analytics(&self, organizer_id: &str) -> AppResult<OrganizerAnalytics> {
        let events = self.event_repo.find_by_organizer(organizer_id).await?;
        let ids: Vec<String> = events.iter().map(|e| e.id.clone()).collect();
        let now = Utc::now();

        let totals = self.analytics.totals(&ids, None).await?;
        let recent = self
            .analytics
            .totals(&ids, Some(now - Duration::days(RECENT_DAYS)))
            .await?;

        let count = |status: EventStatus| events.iter().filter(|e| e.status == status).count();
        let summary = DashboardSummary {
            total_events: events.len(),
            published_events: count(EventStatus::Published),
            draft_events: count(EventStatus::Draft),
            completed_events: count(EventStatus::Completed),
            total_registrations: totals.registrations,
            total_revenue: totals.revenue,
            recent_registrations: recent.registrations,
        };

        let ticket_type_stats = self
            .analytics
            .by_ticket_type(&ids)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        let titles: HashMap<&str, &str> = events
            .iter()
            .map(|e| (e.id.as_str(), e.title.as_str()))
            .collect();
        let top_events = self
            .analytics
            .top_events(&ids, TOP_EVENTS)
            .await?
            .into_iter()
            .map(|s| TopEvent {
                event_title: titles.get(s.event_id.as_str()).copied().unwrap_or_default().to_string(),
                event_id: s.event_id,
                registrations: s.count,
                revenue: s.revenue,
            })
            .collect();

        let registrations_trend = self
            .analytics
            .daily_trend(&ids, now - Duration::days(TREND_DAYS))
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(OrganizerAnalytics {
            summary,
            ticket_type_stats,
            top_events,
            registrations_trend,
        })
    }

    /// Sales figures for one event. Owner only.
    pub async fn event_analytics(
        &self,
        organizer_id: &str,
        event_id: &str,
    ) -> AppResult<EventAnalytics> {
        let event = self.owned_event(organizer_id, event_id).await?;
        let ids = [event.id.clone()];

        let tiers = self.tier_repo.find_by_event(&event.id).await?;
        let available_tickets = tiers.iter().map(|t| i64::from(t.available)).sum();

        let totals = self.analytics.totals(&ids, None).await?;
        let ticket_type_stats = self
            .analytics
            .by_ticket_type(&ids)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();
        let payment_status_stats = self
            .analytics
            .by_payment_status(&ids)
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        Ok(EventAnalytics {
            stats: EventStats {
                total_registrations: totals.tickets,
                total_revenue: totals.revenue,
                available_tickets,
                capacity_filled: capacity_filled(totals.tickets, event.capacity),
            },
            event: EventSummary {
                id: event.id,
                title: event.title,
                status: event.status,
                capacity: event.capacity,
                start_date: event.start_date.to_string(),
                end_date: event.end_date.to_string(),
            },
            ticket_type_stats,
            payment_status_stats,
        })
    }

    /// Confirmed attendees of an event, newest first. Owner only.
    pub async fn event_users(
        &self,
        organizer_id: &str,
        event_id: &str,
        filter: &AttendeeFilter,
    ) -> AppResult<Vec<Attendee>> {
        let event = self.owned_event(organizer_id, event_id).await?;
        let registrations = self
            .registration_repo
            .find_completed_by_event(&event.id, filter)
            .await?;
        Ok(registrations.into_iter().map(Attendee::from).collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_fixtures;
    use sea_orm::{DatabaseBackend, MockDatabase, Value};
    use std::sync::Arc;

    fn service(db: MockDatabase) -> DashboardService {
        let db = Arc::new(db.into_connection());
        DashboardService::new(
            EventRepository::new(db.clone()),
            TicketTierRepository::new(db.clone()),
            RegistrationRepository::new(db.clone()),
            AnalyticsRepository::new(db),
        )
    }

    fn totals(registrations: i64, tickets: i64, revenue: i64) -> std::collections::BTreeMap<&'static str, Value> {
        maplit::btreemap! {
            "registrations" => Value::BigInt(Some(registrations)),
            "tickets" => Value::BigInt(Some(tickets)),
            "revenue" => Value::BigInt(Some(revenue)),
        }
    }

    #[test]
    fn test_capacity_filled() {
        assert_eq!(capacity_filled(25, 100), "25.00%");
        assert_eq!(capacity_filled(1, 3), "33.33%");
        assert_eq!(capacity_filled(0, 0), "0.00%");
    }

    #[tokio::test]
    async fn test_organizer_analytics_without_events() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<event::Model>::new()]);
        let analytics = service(db).organizer_analytics("org1").await.unwrap();

        assert_eq!(analytics.summary, DashboardSummary::default());
        assert!(analytics.top_events.is_empty());
        assert!(analytics.registrations_trend.is_empty());
    }

    #[tokio::test]
    async fn test_organizer_analytics() {
        let draft = event::Model {
            id: "ev2".to_string(),
            title: "Draft Night".to_string(),
            status: EventStatus::Draft,
            ..test_fixtures::event("ev2", "org1")
        };
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_fixtures::event("ev1", "org1"), draft]])
            .append_query_results([[totals(4, 6, 3_000)]])
            .append_query_results([[totals(1, 2, 1_000)]])
            .append_query_results([[maplit::btreemap! {
                "ticket_type" => Value::from("REGULAR"),
                "count" => Value::BigInt(Some(4)),
                "tickets" => Value::BigInt(Some(6)),
                "revenue" => Value::BigInt(Some(3_000)),
            }]])
            .append_query_results([[maplit::btreemap! {
                "event_id" => Value::from("ev1"),
                "count" => Value::BigInt(Some(4)),
                "revenue" => Value::BigInt(Some(3_000)),
            }]])
            .append_query_results([[maplit::btreemap! {
                "date" => Value::from("2026-03-01"),
                "count" => Value::BigInt(Some(4)),
                "revenue" => Value::BigInt(Some(3_000)),
            }]]);

        let analytics = service(db).organizer_analytics("org1").await.unwrap();
        assert_eq!(
            analytics.summary,
            DashboardSummary {
                total_events: 2,
                published_events: 1,
                draft_events: 1,
                completed_events: 0,
                total_registrations: 4,
                total_revenue: 3_000,
                recent_registrations: 1,
            }
        );
        assert_eq!(analytics.top_events[0].event_title, "Rust Meetup");
        assert_eq!(analytics.ticket_type_stats[0].ticket_type, "REGULAR");
        assert_eq!(analytics.registrations_trend[0].date, "2026-03-01");
    }

    #[tokio::test]
    async fn test_event_analytics() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_fixtures::event("ev1", "org1")]])
            .append_query_results([[
                test_fixtures::tier("ev1", TicketType::Regular, 500, 30),
                test_fixtures::tier("ev1", TicketType::Vip, 2_000, 10),
            ]])
            .append_query_results([[totals(10, 25, 12_500)]])
            .append_query_results([Vec::<std::collections::BTreeMap<&str, Value>>::new()])
            .append_query_results([[maplit::btreemap! {
                "payment_status" => Value::from("PAID"),
                "count" => Value::BigInt(Some(10)),
            }]]);

        let analytics = service(db).event_analytics("org1", "ev1").await.unwrap();
        assert_eq!(
            analytics.stats,
            EventStats {
                total_registrations: 25,
                total_revenue: 12_500,
                available_tickets: 40,
                capacity_filled: "25.00%".to_string(),
            }
        );
        assert_eq!(analytics.payment_status_stats[0].payment_status, "PAID");
    }

    #[tokio::test]
    async fn test_event_analytics_requires_owner() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_fixtures::event("ev1", "org1")]]);

        let err = service(db).event_analytics("org2", "ev1").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_event_users() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[test_fixtures::event("ev1", "org1")]])
            .append_query_results([[test_fixtures::completed("reg1", "ev1")]]);

        let users = service(db)
            .event_users("org1", "ev1", &AttendeeFilter::default())
            .await
            .unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].total_amount, 1_000);
        assert_eq!(users[0].registration_number.as_deref(), Some("REG-1700000000000"));
    }
}
