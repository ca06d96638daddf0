//! Organizer dashboard endpoints.

use axum::{
    Router,
    extract::{Path, Query, State},
    routing::get,
};
use eventz_common::AppResult;
use eventz_core::{Attendee, EventAnalytics, OrganizerAnalytics};
use eventz_db::{
    entities::{registration::PaymentStatus, ticket_tier::TicketType},
    repositories::AttendeeFilter,
};
use serde::Deserialize;

use crate::{extractors::AuthOrganizer, middleware::AppState, response::ApiResponse};

/// Attendee list filters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendeeQuery {
    pub ticket_type: Option<TicketType>,
    pub payment_status: Option<PaymentStatus>,
}

async fn analytics(
    AuthOrganizer(organizer): AuthOrganizer,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<OrganizerAnalytics>> {
    let analytics = state
        .dashboard_service
        .organizer_analytics(&organizer.id)
        .await?;
    Ok(ApiResponse::ok(analytics))
}

async fn event_analytics(
    AuthOrganizer(organizer): AuthOrganizer,
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> AppResult<ApiResponse<EventAnalytics>> {
    let analytics = state
        .dashboard_service
        .event_analytics(&organizer.id, &event_id)
        .await?;
    Ok(ApiResponse::ok(analytics))
}

async fn event_users(
    AuthOrganizer(organizer): AuthOrganizer,
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Query(query): Query<AttendeeQuery>,
) -> AppResult<ApiResponse<Vec<Attendee>>> {
    let filter = AttendeeFilter {
        ticket_type: query.ticket_type,
        payment_status: query.payment_status,
    };
    let users = state
        .dashboard_service
        .event_users(&organizer.id, &event_id, &filter)
        .await?;
    Ok(ApiResponse::ok(users))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/analytics", get(analytics))
        .route("/events/{event_id}/analytics", get(event_analytics))
        .route("/events/{event_id}/users", get(event_users))
}
