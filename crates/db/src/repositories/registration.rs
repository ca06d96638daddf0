//! Registration repository.

use std::sync::Arc;

use crate::entities::{
    Event, Registration, TicketTier, event, registration,
    registration::{PaymentStatus, RegistrationStatus},
    ticket_tier,
    ticket_tier::TicketType,
};
use chrono::{DateTime, Utc};
use eventz_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::Expr,
};

/// Optional filters for attendee listings.
#[derive(Debug, Clone, Default)]
pub struct AttendeeFilter {
    pub ticket_type: Option<TicketType>,
    pub payment_status: Option<PaymentStatus>,
}

/// Registration repository for database operations.
#[derive(Clone)]
pub struct RegistrationRepository {
    db: Arc<DatabaseConnection>,
}

impl RegistrationRepository {
    /// Create a new registration repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a registration by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<registration::Model>> {
        Registration::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a registration by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<registration::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Registration not found".to_string()))
    }

    /// Find the registration a gateway order was created for.
    pub async fn find_by_gateway_order_id(
        &self,
        order_id: &str,
    ) -> AppResult<Option<registration::Model>> {
        Registration::find()
            .filter(registration::Column::GatewayOrderId.eq(order_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A completed registration for the event with the same email or phone.
    pub async fn find_completed_duplicate(
        &self,
        event_id: &str,
        email: &str,
        phone: &str,
    ) -> AppResult<Option<registration::Model>> {
        Registration::find()
            .filter(registration::Column::EventId.eq(event_id))
            .filter(registration::Column::Status.eq(RegistrationStatus::Completed))
            .filter(
                Condition::any()
                    .add(registration::Column::UserEmail.eq(email))
                    .add(registration::Column::UserPhone.eq(phone)),
            )
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Completed registrations of an event, newest first.
    pub async fn find_completed_by_event(
        &self,
        event_id: &str,
        filter: &AttendeeFilter,
    ) -> AppResult<Vec<registration::Model>> {
        let mut query = Registration::find()
            .filter(registration::Column::EventId.eq(event_id))
            .filter(registration::Column::Status.eq(RegistrationStatus::Completed));

        if let Some(ticket_type) = filter.ticket_type {
            query = query.filter(registration::Column::TicketType.eq(ticket_type));
        }
        if let Some(payment_status) = filter.payment_status {
            query = query.filter(registration::Column::PaymentStatus.eq(payment_status));
        }

        query
            .order_by_desc(registration::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All registrations made with a phone number, newest first.
    pub async fn find_by_phone(&self, phone: &str) -> AppResult<Vec<registration::Model>> {
        Registration::find()
            .filter(registration::Column::UserPhone.eq(phone))
            .order_by_desc(registration::Column::CreatedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new registration.
    pub async fn create(&self, model: registration::ActiveModel) -> AppResult<registration::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a registration.
    pub async fn update(&self, model: registration::ActiveModel) -> AppResult<registration::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Apply `changes` only while the row is still in `from`.
    ///
    /// Returns `false` when another request moved it first.
    pub async fn transition(
        &self,
        id: &str,
        from: RegistrationStatus,
        changes: registration::ActiveModel,
    ) -> AppResult<bool> {
        let result = Registration::update_many()
            .set(changes)
            .filter(registration::Column::Id.eq(id))
            .filter(registration::Column::Status.eq(from))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// Take the right to send the ticket of a completed registration.
    ///
    /// Flips `ticket_sent` from false to true and stores the QR image.
    /// Exactly one caller wins; the others get `false`.
    pub async fn claim_ticket(
        &self,
        id: &str,
        qr_code: &str,
        now: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = Registration::update_many()
            .set(registration::ActiveModel {
                ticket_sent: Set(true),
                qr_code: Set(Some(qr_code.to_string())),
                updated_at: Set(Some(now.into())),
                ..Default::default()
            })
            .filter(registration::Column::Id.eq(id))
            .filter(registration::Column::Status.eq(RegistrationStatus::Completed))
            .filter(registration::Column::TicketSent.eq(false))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected == 1)
    }

    /// Give a claimed ticket back after the mail could not be sent.
    pub async fn release_ticket(&self, id: &str) -> AppResult<()> {
        Registration::update_many()
            .col_expr(registration::Column::TicketSent, Expr::value(false))
            .filter(registration::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Move a registration to `COMPLETED` and take its tickets out of stock.
    ///
    /// Runs in one transaction:
    /// 1. apply `changes` only if the row is still in `current.status`,
    /// 2. decrement the tier with `available >= quantity` as a guard,
    /// 3. bump the event's sold/revenue counters.
    ///
    /// Returns `Ok(false)` when the status guard matched nothing, i.e. another
    /// caller finalized first. A failed decrement rolls back and reports
    /// the tier as sold out.
    pub async fn finalize(
        &self,
        current: &registration::Model,
        changes: registration::ActiveModel,
        revenue: i64,
    ) -> AppResult<bool> {
        let txn = self
            .db
            .begin()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let claimed = Registration::update_many()
            .set(changes)
            .filter(registration::Column::Id.eq(current.id.as_str()))
            .filter(registration::Column::Status.eq(current.status))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if claimed.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Ok(false);
        }

        let decremented = TicketTier::update_many()
            .col_expr(
                ticket_tier::Column::Available,
                Expr::col(ticket_tier::Column::Available).sub(current.quantity),
            )
            .filter(ticket_tier::Column::EventId.eq(current.event_id.as_str()))
            .filter(ticket_tier::Column::TierType.eq(current.ticket_type))
            .filter(ticket_tier::Column::Available.gte(current.quantity))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if decremented.rows_affected == 0 {
            txn.rollback()
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
            return Err(AppError::Unprocessable("Tickets sold out".to_string()));
        }

        Event::update_many()
            .col_expr(
                event::Column::TotalRegistrations,
                Expr::col(event::Column::TotalRegistrations).add(current.quantity),
            )
            .col_expr(
                event::Column::TotalRevenue,
                Expr::col(event::Column::TotalRevenue).add(revenue),
            )
            .filter(event::Column::Id.eq(current.event_id.as_str()))
            .exec(&txn)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        txn.commit()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(true)
    }

    /// Cancel every unfinished registration whose hold ran out.
    pub async fn expire_stale(&self, now: DateTime<Utc>) -> AppResult<u64> {
        let result = Registration::update_many()
            .set(registration::ActiveModel {
                status: Set(RegistrationStatus::Cancelled),
                updated_at: Set(Some(now.into())),
                ..Default::default()
            })
            .filter(registration::Column::Status.is_in(RegistrationStatus::UNFINISHED))
            .filter(registration::Column::ExpiresAt.lte(now))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(result.rows_affected)
    }

    /// Unfinished registrations due for a reminder.
    ///
    /// Due means: never reminded or last reminded before `cutoff`, fewer
    /// than `max_reminders` sent, and not yet expired.
    pub async fn find_reminder_candidates(
        &self,
        now: DateTime<Utc>,
        cutoff: DateTime<Utc>,
        max_reminders: i32,
        limit: u64,
    ) -> AppResult<Vec<registration::Model>> {
        Registration::find()
            .filter(registration::Column::Status.is_in(RegistrationStatus::UNFINISHED))
            .filter(registration::Column::ReminderCount.lt(max_reminders))
            .filter(
                Condition::any()
                    .add(registration::Column::LastReminderAt.is_null())
                    .add(registration::Column::LastReminderAt.lt(cutoff)),
            )
            .filter(
                Condition::any()
                    .add(registration::Column::ExpiresAt.is_null())
                    .add(registration::Column::ExpiresAt.gt(now)),
            )
            .order_by_asc(registration::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count a reminder as sent.
    pub async fn record_reminder(&self, id: &str, now: DateTime<Utc>) -> AppResult<()> {
        Registration::update_many()
            .col_expr(
                registration::Column::ReminderCount,
                Expr::col(registration::Column::ReminderCount).add(1),
            )
            .col_expr(registration::Column::LastReminderAt, Expr::value(now))
            .col_expr(registration::Column::UpdatedAt, Expr::value(now))
            .filter(registration::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
