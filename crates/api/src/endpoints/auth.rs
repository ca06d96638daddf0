//! Organizer authentication endpoints.

use axum::{Json, Router, extract::State, routing::post};
use eventz_common::AppResult;
use eventz_core::{
    AuthSession, ForgotPasswordInput, LoginInput, RegisterOrganizerInput, ResetPasswordInput,
};
use serde::Serialize;

use super::organizers::{OrganizerResponse, change_password, delete_account, logout};
use crate::{
    middleware::AppState,
    response::{ApiResponse, MessageResponse},
};

/// Token plus profile.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub organizer: OrganizerResponse,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            access_token: session.access_token,
            organizer: session.organizer.into(),
        }
    }
}

/// Create an organizer account.
async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterOrganizerInput>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let session = state.organizer_service.register(input).await?;
    Ok(ApiResponse::created(session.into()))
}

/// Exchange credentials for an access token.
async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<ApiResponse<AuthResponse>> {
    let session = state.organizer_service.login(input).await?;
    Ok(ApiResponse::ok(session.into()))
}

/// Email a reset link. Responds the same whether or not the email exists.
async fn forgot_password(
    State(state): State<AppState>,
    Json(input): Json<ForgotPasswordInput>,
) -> AppResult<ApiResponse<MessageResponse>> {
    let message = state.organizer_service.forgot_password(input).await?;
    Ok(ApiResponse::ok(MessageResponse::new(message)))
}

async fn reset_password(
    State(state): State<AppState>,
    Json(input): Json<ResetPasswordInput>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.organizer_service.reset_password(input).await?;
    Ok(ApiResponse::ok(MessageResponse::new(
        "Password has been reset successfully",
    )))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/logout", post(logout))
        .route("/change-password", post(change_password))
        .route("/delete-account", post(delete_account))
}
