//! Repositories wrapping the database connection.

#![allow(missing_docs)]

pub mod analytics;
pub mod contact_message;
pub mod event;
pub mod invoice;
pub mod organizer;
pub mod registration;
pub mod ticket_tier;

pub use analytics::{
    AnalyticsRepository, DailyStat, EventStat, PaymentStatusStat, RegistrationTotals,
    TicketTypeStat,
};
pub use contact_message::ContactMessageRepository;
pub use event::{EventFilter, EventRepository};
pub use invoice::InvoiceRepository;
pub use organizer::OrganizerRepository;
pub use registration::{AttendeeFilter, RegistrationRepository};
pub use ticket_tier::TicketTierRepository;
