//! API integration tests.
//!
//! These tests drive the full router against a mocked database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use eventz_api::{AppState, SIGNATURE_HEADER, auth_middleware, router as api_router};
use eventz_common::config::{
    AuthConfig, Config, ContactConfig, DatabaseConfig, PaymentConfig, RegistrationConfig,
    SchedulerSettings, ServerConfig,
};
use eventz_core::{
    ContactService, DashboardService, EmailService, EventService, GatewayOrder, InvoiceService,
    MemorySmsSender, MemoryTransport, OrganizerService, PaymentGateway, PaymentService,
    PaymentSettings, RegistrationService, RegistrationSettings, TicketService, TokenService,
};
use eventz_common::AppResult;
use eventz_db::{
    entities::{event, organizer},
    repositories::{
        AnalyticsRepository, ContactMessageRepository, EventRepository, InvoiceRepository,
        OrganizerRepository, RegistrationRepository, TicketTierRepository,
    },
};
use hmac::{Hmac, Mac};
use sea_orm::{DatabaseBackend, MockDatabase};
use sha2::Sha256;
use std::sync::Arc;
use tower::ServiceExt;

const WEBHOOK_SECRET: &str = "hook-secret";

/// Create a test configuration.
fn create_test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 5000,
            url: "https://api.eventz.test".to_string(),
            frontend_url: "https://eventz.test".to_string(),
            cors_origins: Vec::new(),
        },
        database: DatabaseConfig {
            url: "postgres://localhost/test".to_string(),
            max_connections: 10,
            min_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_hours: 1,
        },
        email: None,
        payment: PaymentConfig {
            key_id: "rzp_test_key".to_string(),
            key_secret: "key-secret".to_string(),
            webhook_secret: WEBHOOK_SECRET.to_string(),
            api_base: "http://127.0.0.1:9".to_string(),
            currency: "INR".to_string(),
        },
        registration: RegistrationConfig::default(),
        contact: ContactConfig::default(),
        scheduler: SchedulerSettings::default(),
    }
}

/// Gateway that never leaves the process.
struct NoopGateway;

#[async_trait::async_trait]
impl PaymentGateway for NoopGateway {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> AppResult<GatewayOrder> {
        Ok(GatewayOrder {
            id: format!("order_{receipt}"),
            amount: amount_minor,
            currency: currency.to_string(),
        })
    }

    fn key_id(&self) -> &str {
        "rzp_test_key"
    }
}

/// Create a test application state on top of `db`.
fn create_test_state(db: MockDatabase) -> (AppState, MemoryTransport) {
    let config = create_test_config();
    let db = Arc::new(db.into_connection());
    let outbox = MemoryTransport::new();
    let email = EmailService::new(Arc::new(outbox.clone()));

    let organizer_repo = OrganizerRepository::new(db.clone());
    let event_repo = EventRepository::new(db.clone());
    let tier_repo = TicketTierRepository::new(db.clone());
    let registration_repo = RegistrationRepository::new(db.clone());

    let ticket_service = TicketService::new(registration_repo.clone(), event_repo.clone(), email.clone());
    let registration_service = RegistrationService::new(
        registration_repo.clone(),
        event_repo.clone(),
        tier_repo.clone(),
        ticket_service.clone(),
        InvoiceService::new(InvoiceRepository::new(db.clone()), email.clone()),
        email.clone(),
        Arc::new(MemorySmsSender::new()),
        RegistrationSettings::from_config(&config),
    );
    let payment_service = PaymentService::new(
        registration_repo.clone(),
        event_repo.clone(),
        registration_service.clone(),
        Arc::new(NoopGateway),
        email.clone(),
        PaymentSettings::from_config(&config),
    );

    let state = AppState {
        organizer_service: OrganizerService::new(
            organizer_repo,
            TokenService::from_config(&config.auth),
            email.clone(),
            &config.server.frontend_url,
        ),
        event_service: EventService::new(event_repo.clone(), tier_repo.clone()),
        registration_service,
        payment_service,
        ticket_service,
        dashboard_service: DashboardService::new(
            event_repo,
            tier_repo,
            registration_repo,
            AnalyticsRepository::new(db.clone()),
        ),
        contact_service: ContactService::new(
            ContactMessageRepository::new(db),
            email,
            &config.contact.receiver_email,
        ),
    };

    (state, outbox)
}

/// Create the test router, wired the way the server wires it.
fn create_test_router(db: MockDatabase) -> (Router, MemoryTransport) {
    let (state, outbox) = create_test_state(db);
    let app = api_router()
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state);
    (app, outbox)
}

fn empty_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .method(method)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_unknown_endpoint_returns_404() {
    let (app, _) = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nonexistent/endpoint")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_protected_route_without_token_returns_401() {
    let (app, _) = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/dashboard/analytics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let (app, _) = create_test_router(empty_db());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/organizers/me")
                .header("Authorization", "Bearer not-a-jwt")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_bearer_token_authenticates() {
    let config = create_test_config();
    let token = TokenService::from_config(&config.auth)
        .issue("org1", organizer::ROLE_ORGANIZER)
        .unwrap();
    let organizer = organizer::Model {
        id: "org1".to_string(),
        email: "host@eventz.test".to_string(),
        password_hash: "x".to_string(),
        name: "Host".to_string(),
        role: organizer::ROLE_ORGANIZER.to_string(),
        photo_url: None,
        password_reset_token: None,
        password_reset_expires: None,
        created_at: chrono::Utc::now().into(),
        updated_at: None,
    };
    // middleware lookup, then the profile handler
    let db = empty_db().append_query_results([[organizer.clone()], [organizer]]);
    let (app, _) = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/organizers/me")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["email"], "host@eventz.test");
}

#[tokio::test]
async fn test_login_with_unknown_email_returns_401() {
    let db = empty_db().append_query_results([Vec::<organizer::Model>::new()]);
    let (app, _) = create_test_router(db);

    let response = app
        .oneshot(json_request(
            "POST",
            "/auth/organizer/login",
            r#"{"email":"nobody@eventz.test","password":"password123"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_event_listing_with_no_events() {
    let db = empty_db().append_query_results([Vec::<event::Model>::new()]);
    let (app, _) = create_test_router(db);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/events?city=Pune")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"], serde_json::json!([]));
}

#[tokio::test]
async fn test_webhook_without_signature_returns_400() {
    let (app, _) = create_test_router(empty_db());

    let response = app
        .oneshot(json_request(
            "POST",
            "/payments/webhook",
            r#"{"event":"payment.captured"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_webhook_with_valid_signature_acknowledges() {
    let (app, _) = create_test_router(empty_db());
    let body = r#"{"event":"payment.failed","payload":{}}"#;
    let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
    mac.update(body.as_bytes());
    let signature = hex::encode(mac.finalize().into_bytes());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/payments/webhook")
                .method("POST")
                .header("Content-Type", "application/json")
                .header(SIGNATURE_HEADER, signature)
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ok");
}

#[tokio::test]
async fn test_verify_qr_with_malformed_payload() {
    let (app, _) = create_test_router(empty_db());

    let response = app
        .oneshot(json_request(
            "POST",
            "/tickets/verify",
            r#"{"qrData":"definitely not json"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["valid"], false);
    assert_eq!(body["data"]["message"], "Invalid QR format");
}

#[tokio::test]
async fn test_contact_with_invalid_email_returns_400() {
    let (app, outbox) = create_test_router(empty_db());

    let response = app
        .oneshot(json_request(
            "POST",
            "/contact",
            r#"{"name":"Meera","email":"nope","subject":"Hi","message":"Hello"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(outbox.sent().is_empty());
}

#[tokio::test]
async fn test_initiate_with_invalid_json_returns_error() {
    let (app, _) = create_test_router(empty_db());

    let response = app
        .oneshot(json_request(
            "POST",
            "/registrations/initiate",
            "invalid json",
        ))
        .await
        .unwrap();

    assert!(
        response.status() == StatusCode::BAD_REQUEST
            || response.status() == StatusCode::UNPROCESSABLE_ENTITY
    );
}

#[tokio::test]
async fn test_complete_without_signature_is_rejected() {
    let (app, outbox) = create_test_router(empty_db());

    let response = app
        .oneshot(json_request(
            "POST",
            "/registrations/complete",
            r#"{"registrationId":"reg1","razorpayPaymentId":"pay_forged"}"#,
        ))
        .await
        .unwrap();

    assert!(response.status().is_client_error());
    assert!(outbox.sent().is_empty());
}

#[tokio::test]
async fn test_complete_with_forged_signature_returns_400() {
    let (app, outbox) = create_test_router(empty_db());

    let response = app
        .oneshot(json_request(
            "POST",
            "/registrations/complete",
            r#"{"registrationId":"reg1","razorpayOrderId":"order_reg1","razorpayPaymentId":"pay_forged","razorpaySignature":"deadbeef"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(outbox.sent().is_empty());
}
