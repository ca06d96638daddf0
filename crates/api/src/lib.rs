//! HTTP API layer for eventz.
//!
//! - **Endpoints**: organizer auth, events, registrations, payments,
//!   tickets, dashboards and the contact form
//! - **Extractors**: organizer authentication
//! - **Middleware**: bearer token resolution
//!
//! Built on Axum 0.8. Successful responses use a `{"data": ...}` envelope;
//! errors render through [`eventz_common::AppError`].

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::{SIGNATURE_HEADER, router};
pub use middleware::{AppState, auth_middleware};
