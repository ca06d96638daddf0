//! Event endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use eventz_common::AppResult;
use eventz_core::{CreateEventInput, EventWithTiers, UpdateEventInput};
use eventz_db::{
    entities::{
        event::{self, EventStatus},
        ticket_tier::{self, TicketType},
    },
    repositories::EventFilter,
};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthOrganizer,
    middleware::AppState,
    response::{ApiResponse, MessageResponse},
};

// ==================== Request/Response Types ====================

/// Ticket tier response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketTierResponse {
    pub id: String,
    #[serde(rename = "type")]
    pub tier_type: TicketType,
    pub name: String,
    pub price: i64,
    pub quantity: i32,
    pub available: i32,
    pub description: Option<String>,
}

impl From<ticket_tier::Model> for TicketTierResponse {
    fn from(t: ticket_tier::Model) -> Self {
        Self {
            id: t.id,
            tier_type: t.tier_type,
            name: t.name,
            price: t.price,
            quantity: t.quantity,
            available: t.available,
            description: t.description,
        }
    }
}

/// Event response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub organizer_id: String,
    pub title: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub start_time: String,
    pub end_time: String,
    pub location: String,
    pub city: String,
    pub category: String,
    pub media_urls: serde_json::Value,
    pub capacity: i32,
    pub status: EventStatus,
    pub total_registrations: i32,
    pub total_revenue: i64,
    pub tickets: Vec<TicketTierResponse>,
    pub created_at: String,
}

impl EventResponse {
    fn new(e: event::Model, tiers: Vec<ticket_tier::Model>) -> Self {
        Self {
            id: e.id,
            organizer_id: e.organizer_id,
            title: e.title,
            description: e.description,
            start_date: e.start_date.to_string(),
            end_date: e.end_date.to_string(),
            start_time: e.start_time,
            end_time: e.end_time,
            location: e.location,
            city: e.city,
            category: e.category,
            media_urls: e.media_urls,
            capacity: e.capacity,
            status: e.status,
            total_registrations: e.total_registrations,
            total_revenue: e.total_revenue,
            tickets: tiers.into_iter().map(Into::into).collect(),
            created_at: e.created_at.to_rfc3339(),
        }
    }
}

impl From<EventWithTiers> for EventResponse {
    fn from(e: EventWithTiers) -> Self {
        Self::new(e.event, e.tiers)
    }
}

impl From<event::Model> for EventResponse {
    fn from(e: event::Model) -> Self {
        Self::new(e, Vec::new())
    }
}

/// Listing filters.
#[derive(Debug, Default, Deserialize)]
pub struct EventListQuery {
    pub status: Option<EventStatus>,
    pub category: Option<String>,
    pub city: Option<String>,
}

impl From<EventListQuery> for EventFilter {
    fn from(q: EventListQuery) -> Self {
        Self {
            status: q.status,
            category: q.category,
            city: q.city,
        }
    }
}

// ==================== Handlers ====================

/// Public listing. Published events unless a status is given.
async fn list(
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
) -> AppResult<ApiResponse<Vec<EventResponse>>> {
    let events = state.event_service.list(&query.into()).await?;
    Ok(ApiResponse::ok(events.into_iter().map(Into::into).collect()))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state.event_service.get(&id).await?;
    Ok(ApiResponse::ok(event.into()))
}

async fn create(
    AuthOrganizer(organizer): AuthOrganizer,
    State(state): State<AppState>,
    Json(input): Json<CreateEventInput>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state.event_service.create(&organizer.id, input).await?;
    Ok(ApiResponse::created(event.into()))
}

async fn update(
    AuthOrganizer(organizer): AuthOrganizer,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<UpdateEventInput>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state.event_service.update(&organizer.id, &id, input).await?;
    Ok(ApiResponse::ok(event.into()))
}

async fn delete(
    AuthOrganizer(organizer): AuthOrganizer,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.event_service.delete(&organizer.id, &id).await?;
    Ok(ApiResponse::ok(MessageResponse::new("Event deleted successfully")))
}

async fn my_events(
    AuthOrganizer(organizer): AuthOrganizer,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<EventResponse>>> {
    let events = state.event_service.my_events(&organizer.id).await?;
    Ok(ApiResponse::ok(events.into_iter().map(Into::into).collect()))
}

async fn publish(
    AuthOrganizer(organizer): AuthOrganizer,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state.event_service.publish(&organizer.id, &id).await?;
    Ok(ApiResponse::ok(event.into()))
}

async fn unpublish(
    AuthOrganizer(organizer): AuthOrganizer,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state.event_service.unpublish(&organizer.id, &id).await?;
    Ok(ApiResponse::ok(event.into()))
}

async fn complete(
    AuthOrganizer(organizer): AuthOrganizer,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<EventResponse>> {
    let event = state.event_service.mark_completed(&organizer.id, &id).await?;
    Ok(ApiResponse::ok(event.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list).post(create))
        .route("/organizer/me", get(my_events))
        .route("/{id}", get(show).put(update).delete(delete))
        .route("/{id}/publish", patch(publish))
        .route("/{id}/unpublish", patch(unpublish))
        .route("/{id}/complete", patch(complete))
}
