//! Organizer profile endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post, put},
};
use eventz_common::AppResult;
use eventz_core::{ChangePasswordInput, UpdateProfileInput};
use eventz_db::entities::organizer;
use serde::Serialize;

use crate::{
    extractors::AuthOrganizer,
    middleware::AppState,
    response::{ApiResponse, MessageResponse},
};

/// Organizer response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganizerResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub photo_url: Option<String>,
    pub created_at: String,
}

impl From<organizer::Model> for OrganizerResponse {
    fn from(o: organizer::Model) -> Self {
        Self {
            id: o.id,
            name: o.name,
            email: o.email,
            role: o.role,
            photo_url: o.photo_url,
            created_at: o.created_at.to_rfc3339(),
        }
    }
}

async fn me(
    AuthOrganizer(organizer): AuthOrganizer,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<OrganizerResponse>> {
    let organizer = state.organizer_service.get_profile(&organizer.id).await?;
    Ok(ApiResponse::ok(organizer.into()))
}

async fn update_me(
    AuthOrganizer(organizer): AuthOrganizer,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<OrganizerResponse>> {
    let organizer = state
        .organizer_service
        .update_profile(&organizer.id, input)
        .await?;
    Ok(ApiResponse::ok(organizer.into()))
}

pub(super) async fn change_password(
    AuthOrganizer(organizer): AuthOrganizer,
    State(state): State<AppState>,
    Json(input): Json<ChangePasswordInput>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state
        .organizer_service
        .change_password(&organizer.id, input)
        .await?;
    Ok(ApiResponse::ok(MessageResponse::new(
        "Password changed successfully",
    )))
}

pub(super) async fn delete_account(
    AuthOrganizer(organizer): AuthOrganizer,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.organizer_service.delete_account(&organizer.id).await?;
    Ok(ApiResponse::ok(MessageResponse::new(
        "Account deleted successfully",
    )))
}

/// Tokens are stateless; the client discards its copy.
pub(super) async fn logout(
    AuthOrganizer(_): AuthOrganizer,
) -> AppResult<ApiResponse<MessageResponse>> {
    Ok(ApiResponse::ok(MessageResponse::new("Logged out successfully")))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/me", get(me).put(update_me).delete(delete_account))
        .route("/change-password", put(change_password))
        .route("/logout", post(logout))
}
