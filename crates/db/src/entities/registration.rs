//! Registration entity.

use super::ticket_tier::TicketType;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Workflow state of a registration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RegistrationStatus {
    /// Waiting for the attendee to enter the emailed OTP.
    #[sea_orm(string_value = "PENDING_OTP")]
    PendingOtp,
    /// OTP verified, waiting for payment.
    #[sea_orm(string_value = "PENDING_PAYMENT")]
    PendingPayment,
    /// Confirmed. Tier stock has been decremented.
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    /// Expired before completion.
    #[sea_orm(string_value = "CANCELLED")]
    Cancelled,
}

impl RegistrationStatus {
    /// States the maintenance jobs act on.
    pub const UNFINISHED: [Self; 2] = [Self::PendingOtp, Self::PendingPayment];
}

/// Payment state of a registration.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Free ticket.
    #[sea_orm(string_value = "NOT_REQUIRED")]
    NotRequired,
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "PAID")]
    Paid,
    #[sea_orm(string_value = "FAILED")]
    Failed,
    #[sea_orm(string_value = "REFUNDED")]
    Refunded,
}

/// An attendee's signup for one ticket tier of an event.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "registration")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(indexed)]
    pub event_id: String,

    pub user_name: String,
    pub user_email: String,

    #[sea_orm(indexed)]
    pub user_phone: String,

    pub ticket_type: TicketType,

    /// Unit price captured at initiation.
    pub ticket_price: i64,

    #[sea_orm(default_value = 1)]
    pub quantity: i32,

    #[sea_orm(indexed)]
    pub status: RegistrationStatus,

    pub payment_status: PaymentStatus,

    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub otp: Option<String>,

    #[sea_orm(nullable)]
    #[serde(skip_serializing)]
    pub otp_expires_at: Option<DateTimeWithTimeZone>,

    #[sea_orm(default_value = false)]
    pub otp_verified: bool,

    /// Order id returned by the payment gateway.
    #[sea_orm(nullable, indexed)]
    pub gateway_order_id: Option<String>,

    #[sea_orm(nullable)]
    pub gateway_payment_id: Option<String>,

    /// QR code as a PNG data URL.
    #[sea_orm(column_type = "Text", nullable)]
    pub qr_code: Option<String>,

    #[sea_orm(nullable, unique)]
    pub registration_number: Option<String>,

    #[sea_orm(default_value = false)]
    pub ticket_sent: bool,

    /// Reminder emails sent for this registration.
    #[sea_orm(default_value = 0)]
    pub reminder_count: i32,

    #[sea_orm(nullable)]
    pub last_reminder_at: Option<DateTimeWithTimeZone>,

    /// After this instant an unfinished registration is cancelled.
    #[sea_orm(nullable, indexed)]
    pub expires_at: Option<DateTimeWithTimeZone>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Amount due for the whole registration.
    #[must_use]
    pub fn total_amount(&self) -> i64 {
        self.ticket_price * i64::from(self.quantity)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::event::Entity",
        from = "Column::EventId",
        to = "super::event::Column::Id",
        on_delete = "Cascade"
    )]
    Event,
}

impl Related<super::event::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Event.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
