//! Eventz server entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{Json, Router, http::HeaderValue, middleware, routing::get};
use eventz_api::{AppState, auth_middleware, router as api_router};
use eventz_common::Config;
use eventz_core::{
    ContactService, DashboardService, EmailService, EventService, InvoiceService, LogSmsSender,
    OrganizerService, PaymentGatewayService, PaymentService, PaymentSettings, RazorpayGateway,
    RegistrationService, RegistrationSettings, SmsService, TicketService, TokenService,
};
use eventz_db::repositories::{
    AnalyticsRepository, ContactMessageRepository, EventRepository, InvoiceRepository,
    OrganizerRepository, RegistrationRepository, TicketTierRepository,
};
use eventz_queue::{MaintenanceExecutor, SchedulerConfig, run_scheduler};
use serde_json::{Value, json};
use tokio::signal;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Waits for a shutdown signal (SIGINT or SIGTERM).
///
/// On Unix systems, this listens for both SIGINT (Ctrl+C) and SIGTERM.
/// On Windows, this only listens for Ctrl+C.
#[allow(clippy::expect_used)]
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received SIGINT, initiating graceful shutdown...");
        },
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown...");
        },
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "eventz=debug,tower_http=debug".into());
    let json = std::env::var("EVENTZ_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (this also reads .env)
    let config = Config::load().context("failed to load configuration")?;

    init_tracing();
    info!("Starting eventz server...");

    // Connect to database
    let db = eventz_db::init(&config).await?;
    info!("Connected to database");

    // Run migrations
    info!("Running database migrations...");
    eventz_db::migrate(&db).await?;
    info!("Migrations completed");

    // Initialize repositories
    let db = Arc::new(db);
    let organizer_repo = OrganizerRepository::new(Arc::clone(&db));
    let event_repo = EventRepository::new(Arc::clone(&db));
    let tier_repo = TicketTierRepository::new(Arc::clone(&db));
    let registration_repo = RegistrationRepository::new(Arc::clone(&db));
    let invoice_repo = InvoiceRepository::new(Arc::clone(&db));
    let contact_repo = ContactMessageRepository::new(Arc::clone(&db));
    let analytics_repo = AnalyticsRepository::new(Arc::clone(&db));

    // Outbound channels
    let email = EmailService::from_config(config.email.as_ref())?;
    if config.email.is_none() {
        warn!("No [email] section configured, outgoing mail is only logged");
    }
    let sms: SmsService = Arc::new(LogSmsSender);
    let gateway: PaymentGatewayService = Arc::new(RazorpayGateway::new(&config.payment));

    // Initialize services
    let organizer_service = OrganizerService::new(
        organizer_repo,
        TokenService::from_config(&config.auth),
        email.clone(),
        &config.server.frontend_url,
    );
    let event_service = EventService::new(event_repo.clone(), tier_repo.clone());
    let ticket_service =
        TicketService::new(registration_repo.clone(), event_repo.clone(), email.clone());
    let invoice_service = InvoiceService::new(invoice_repo, email.clone());
    let registration_service = RegistrationService::new(
        registration_repo.clone(),
        event_repo.clone(),
        tier_repo.clone(),
        ticket_service.clone(),
        invoice_service,
        email.clone(),
        sms,
        RegistrationSettings::from_config(&config),
    );
    let payment_service = PaymentService::new(
        registration_repo.clone(),
        event_repo.clone(),
        registration_service.clone(),
        gateway,
        email.clone(),
        PaymentSettings::from_config(&config),
    );
    let dashboard_service =
        DashboardService::new(event_repo, tier_repo, registration_repo, analytics_repo);
    let contact_service =
        ContactService::new(contact_repo, email, &config.contact.receiver_email);

    // Start background jobs
    let scheduler_handles = run_scheduler(
        SchedulerConfig::from(&config.scheduler),
        Arc::new(MaintenanceExecutor::new(registration_service.clone())),
    );

    // Create app state
    let state = AppState {
        organizer_service,
        event_service,
        registration_service,
        payment_service,
        ticket_service,
        dashboard_service,
        contact_service,
    };

    // Build router
    let app = Router::new()
        .route("/health", get(health))
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.server.cors_origins))
        .with_state(state);

    // Start server with graceful shutdown
    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("invalid server.host {}", config.server.host))?;
    let addr = SocketAddr::from((host, config.server.port));
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    for handle in scheduler_handles {
        handle.abort();
    }

    info!("Server shutdown complete");
    Ok(())
}
