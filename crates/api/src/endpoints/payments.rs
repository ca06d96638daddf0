//! Payment endpoints.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
};
use eventz_common::AppResult;
use eventz_core::{CheckoutOrder, VerifyPaymentInput};
use serde::Serialize;

use super::registrations::{RegistrationIdRequest, RegistrationResponse};
use crate::{middleware::AppState, response::ApiResponse};

/// Header carrying the webhook HMAC.
pub const SIGNATURE_HEADER: &str = "x-razorpay-signature";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub registration: RegistrationResponse,
}

#[derive(Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
}

async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<RegistrationIdRequest>,
) -> AppResult<ApiResponse<CheckoutOrder>> {
    let order = state.payment_service.create_order(&req.registration_id).await?;
    Ok(ApiResponse::ok(order))
}

async fn retry(
    State(state): State<AppState>,
    Json(req): Json<RegistrationIdRequest>,
) -> AppResult<ApiResponse<CheckoutOrder>> {
    let order = state.payment_service.retry(&req.registration_id).await?;
    Ok(ApiResponse::ok(order))
}

async fn verify(
    State(state): State<AppState>,
    Json(input): Json<VerifyPaymentInput>,
) -> AppResult<ApiResponse<VerifyPaymentResponse>> {
    let registration = state.payment_service.verify_payment(input).await?;
    Ok(ApiResponse::ok(VerifyPaymentResponse {
        success: true,
        registration: registration.into(),
    }))
}

async fn failed(
    State(state): State<AppState>,
    Json(req): Json<RegistrationIdRequest>,
) -> AppResult<ApiResponse<RegistrationResponse>> {
    let registration = state.payment_service.mark_failed(&req.registration_id).await?;
    Ok(ApiResponse::ok(registration.into()))
}

/// Gateway callback. The body is taken raw so the signature can be checked
/// over the exact bytes received.
async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> AppResult<Json<WebhookAck>> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());
    state.payment_service.handle_webhook(&body, signature).await?;
    Ok(Json(WebhookAck { status: "ok" }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/registration/create-order", post(create_order))
        .route("/registration/verify", post(verify))
        .route("/registration/retry", post(retry))
        .route("/registration/failed", post(failed))
        .route("/webhook", post(webhook))
}
