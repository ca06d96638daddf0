//! Contact form endpoints.

use axum::{Json, Router, extract::State, routing::get};
use eventz_common::AppResult;
use eventz_core::{CONTACT_SUCCESS_MESSAGE, ContactInput};
use eventz_db::entities::contact_message;
use serde::Serialize;

use crate::{
    extractors::AuthOrganizer,
    middleware::AppState,
    response::{ApiResponse, MessageResponse},
};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactMessageResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub subject: String,
    pub message: String,
    pub created_at: String,
}

impl From<contact_message::Model> for ContactMessageResponse {
    fn from(m: contact_message::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            email: m.email,
            subject: m.subject,
            message: m.message,
            created_at: m.created_at.to_rfc3339(),
        }
    }
}

async fn submit(
    State(state): State<AppState>,
    Json(input): Json<ContactInput>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state.contact_service.submit(input).await?;
    Ok(ApiResponse::created(MessageResponse::new(
        CONTACT_SUCCESS_MESSAGE,
    )))
}

async fn list(
    AuthOrganizer(_): AuthOrganizer,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Vec<ContactMessageResponse>>> {
    let messages = state.contact_service.list().await?;
    Ok(ApiResponse::ok(messages.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list).post(submit))
}
