//! API endpoints.

mod auth;
mod contact;
mod dashboard;
mod events;
mod organizers;
mod payments;
mod registrations;
mod tickets;

use axum::Router;

use crate::middleware::AppState;

pub use payments::SIGNATURE_HEADER;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth/organizer", auth::router())
        .nest("/organizers", organizers::router())
        .nest("/events", events::router())
        .nest("/registrations", registrations::router())
        .nest("/payments", payments::router())
        .nest("/tickets", tickets::router())
        .nest("/dashboard", dashboard::router())
        .nest("/contact", contact::router())
}
