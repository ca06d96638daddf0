//! Database entities.

#![allow(missing_docs)]

pub mod contact_message;
pub mod event;
pub mod invoice;
pub mod invoice_counter;
pub mod organizer;
pub mod registration;
pub mod ticket_tier;

pub use contact_message::Entity as ContactMessage;
pub use event::Entity as Event;
pub use invoice::Entity as Invoice;
pub use invoice_counter::Entity as InvoiceCounter;
pub use organizer::Entity as Organizer;
pub use registration::Entity as Registration;
pub use ticket_tier::Entity as TicketTier;
