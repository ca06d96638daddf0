//! Ticket endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use eventz_common::AppResult;
use eventz_core::QrVerification;
use serde::{Deserialize, Serialize};

use super::{events::EventResponse, registrations::RegistrationResponse};
use crate::{middleware::AppState, response::ApiResponse};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyQrRequest {
    pub qr_data: String,
}

/// Gate scan result.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyQrResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ticket_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
}

impl From<QrVerification> for VerifyQrResponse {
    fn from(v: QrVerification) -> Self {
        match v {
            QrVerification::Invalid(message) => Self {
                valid: false,
                message: Some(message),
                user_name: None,
                event_title: None,
                ticket_type: None,
                quantity: None,
                registration_number: None,
            },
            QrVerification::Valid {
                user_name,
                event_title,
                ticket_type,
                quantity,
                registration_number,
            } => Self {
                valid: true,
                message: None,
                user_name: Some(user_name),
                event_title: Some(event_title),
                ticket_type: Some(ticket_type),
                quantity: Some(quantity),
                registration_number: Some(registration_number),
            },
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub registration: RegistrationResponse,
    pub event: EventResponse,
}

async fn verify(
    State(state): State<AppState>,
    Json(req): Json<VerifyQrRequest>,
) -> AppResult<ApiResponse<VerifyQrResponse>> {
    let result = state.ticket_service.verify_qr(&req.qr_data).await?;
    Ok(ApiResponse::ok(result.into()))
}

async fn show(
    State(state): State<AppState>,
    Path(registration_id): Path<String>,
) -> AppResult<ApiResponse<TicketResponse>> {
    let (registration, event) = state.ticket_service.get(&registration_id).await?;
    Ok(ApiResponse::ok(TicketResponse {
        registration: registration.into(),
        event: event.into(),
    }))
}

async fn download(
    State(state): State<AppState>,
    Path(registration_id): Path<String>,
) -> AppResult<Response> {
    let ticket = state.ticket_service.download(&registration_id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", ticket.filename),
            ),
        ],
        ticket.bytes,
    )
        .into_response())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/verify", post(verify))
        .route("/download/{registration_id}", get(download))
        .route("/{registration_id}", get(show))
}
