//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use eventz_core::{
    ContactService, DashboardService, EventService, OrganizerService, PaymentService,
    RegistrationService, TicketService,
};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub organizer_service: OrganizerService,
    pub event_service: EventService,
    pub registration_service: RegistrationService,
    pub payment_service: PaymentService,
    pub ticket_service: TicketService,
    pub dashboard_service: DashboardService,
    pub contact_service: ContactService,
}

/// Authentication middleware.
///
/// A valid bearer token puts the organizer into the request extensions.
/// Routes that need one reject the request through the extractor.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.organizer_service.authenticate(token.trim()).await {
            Ok(organizer) => {
                req.extensions_mut().insert(organizer);
            }
            Err(e) => tracing::debug!(error = %e, "Rejected bearer token"),
        }
    }

    next.run(req).await
}
