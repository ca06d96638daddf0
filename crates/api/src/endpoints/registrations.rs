//! Attendee registration endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use eventz_common::AppResult;
use eventz_core::{InitiateRegistrationInput, VerifyOtpOutcome, VerifyPaymentInput};
use eventz_db::entities::{
    registration::{self, PaymentStatus, RegistrationStatus},
    ticket_tier::TicketType,
};
use serde::{Deserialize, Serialize};

use crate::{
    extractors::AuthOrganizer,
    middleware::AppState,
    response::{ApiResponse, MessageResponse},
};

// ==================== Request/Response Types ====================

/// Registration response. OTP fields are never exposed.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub id: String,
    pub event_id: String,
    pub user_name: String,
    pub user_email: String,
    pub user_phone: String,
    pub ticket_type: TicketType,
    pub ticket_price: i64,
    pub quantity: i32,
    pub total_amount: i64,
    pub status: RegistrationStatus,
    pub payment_status: PaymentStatus,
    pub otp_verified: bool,
    pub registration_number: Option<String>,
    pub qr_code: Option<String>,
    pub ticket_sent: bool,
    pub expires_at: Option<String>,
    pub created_at: String,
}

impl From<registration::Model> for RegistrationResponse {
    fn from(r: registration::Model) -> Self {
        Self {
            total_amount: r.total_amount(),
            id: r.id,
            event_id: r.event_id,
            user_name: r.user_name,
            user_email: r.user_email,
            user_phone: r.user_phone,
            ticket_type: r.ticket_type,
            ticket_price: r.ticket_price,
            quantity: r.quantity,
            status: r.status,
            payment_status: r.payment_status,
            otp_verified: r.otp_verified,
            registration_number: r.registration_number,
            qr_code: r.qr_code,
            ticket_sent: r.ticket_sent,
            expires_at: r.expires_at.map(|t| t.to_rfc3339()),
            created_at: r.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateResponse {
    pub registration_id: String,
    pub message: &'static str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpRequest {
    pub registration_id: String,
    pub otp: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    pub registration_id: String,
    pub payment_required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<i64>,
    pub message: &'static str,
}

impl From<VerifyOtpOutcome> for VerifyOtpResponse {
    fn from(outcome: VerifyOtpOutcome) -> Self {
        match outcome {
            VerifyOtpOutcome::Completed { registration_id } => Self {
                registration_id,
                payment_required: false,
                amount: None,
                message: "Registration completed. Your ticket has been emailed.",
            },
            VerifyOtpOutcome::PaymentRequired {
                registration_id,
                amount,
            } => Self {
                registration_id,
                payment_required: true,
                amount: Some(amount),
                message: "OTP verified. Please complete the payment.",
            },
        }
    }
}

/// Body naming a registration.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationIdRequest {
    pub registration_id: String,
}

// ==================== Handlers ====================

async fn initiate(
    State(state): State<AppState>,
    Json(input): Json<InitiateRegistrationInput>,
) -> AppResult<ApiResponse<InitiateResponse>> {
    let registration_id = state.registration_service.initiate(input).await?;
    Ok(ApiResponse::created(InitiateResponse {
        registration_id,
        message: "OTP sent to your email and phone",
    }))
}

async fn verify_otp(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> AppResult<ApiResponse<VerifyOtpResponse>> {
    let outcome = state
        .registration_service
        .verify_otp(&req.registration_id, &req.otp)
        .await?;
    Ok(ApiResponse::ok(outcome.into()))
}

async fn resend_otp(
    State(state): State<AppState>,
    Json(req): Json<RegistrationIdRequest>,
) -> AppResult<ApiResponse<MessageResponse>> {
    state
        .registration_service
        .resend_otp(&req.registration_id)
        .await?;
    Ok(ApiResponse::ok(MessageResponse::new("OTP resent successfully")))
}

/// Completion needs the same signed checkout result as `/payments/registration/verify`.
async fn complete(
    State(state): State<AppState>,
    Json(input): Json<VerifyPaymentInput>,
) -> AppResult<ApiResponse<RegistrationResponse>> {
    let registration = state.payment_service.verify_payment(input).await?;
    Ok(ApiResponse::ok(registration.into()))
}

async fn payment_cancelled(
    State(state): State<AppState>,
    Json(req): Json<RegistrationIdRequest>,
) -> AppResult<ApiResponse<RegistrationResponse>> {
    let registration = state
        .registration_service
        .mark_payment_cancelled(&req.registration_id)
        .await?;
    Ok(ApiResponse::ok(registration.into()))
}

async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<ApiResponse<RegistrationResponse>> {
    let registration = state.registration_service.find_by_id(&id).await?;
    Ok(ApiResponse::ok(registration.into()))
}

async fn by_user(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> AppResult<ApiResponse<Vec<RegistrationResponse>>> {
    let registrations = state.registration_service.find_by_user(&phone).await?;
    Ok(ApiResponse::ok(
        registrations.into_iter().map(Into::into).collect(),
    ))
}

async fn by_event(
    AuthOrganizer(organizer): AuthOrganizer,
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> AppResult<ApiResponse<Vec<RegistrationResponse>>> {
    let registrations = state
        .registration_service
        .find_by_event(&event_id, &organizer.id)
        .await?;
    Ok(ApiResponse::ok(
        registrations.into_iter().map(Into::into).collect(),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/initiate", post(initiate))
        .route("/verify-otp", post(verify_otp))
        .route("/resend-otp", post(resend_otp))
        .route("/complete", post(complete))
        .route("/payment-cancelled", post(payment_cancelled))
        .route("/user/{phone}", get(by_user))
        .route("/event/{event_id}", get(by_event))
        .route("/{id}", get(show))
}
