//! Queue integration tests.
//!
//! Drive the maintenance executor against a mocked database.

#![allow(clippy::unwrap_used)]

use std::sync::Arc;

use chrono::Duration;
use eventz_core::{
    EmailService, InvoiceService, MemorySmsSender, MemoryTransport, RegistrationService,
    RegistrationSettings, TicketService,
};
use eventz_db::repositories::{
    EventRepository, InvoiceRepository, RegistrationRepository, TicketTierRepository,
};
use eventz_queue::{JobExecutor, MaintenanceExecutor, ScheduledJob, run_job};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

fn executor(db: MockDatabase) -> (MaintenanceExecutor, MemoryTransport) {
    let db = Arc::new(db.into_connection());
    let outbox = MemoryTransport::new();
    let email = EmailService::new(Arc::new(outbox.clone()));
    let registration_repo = RegistrationRepository::new(db.clone());
    let event_repo = EventRepository::new(db.clone());

    let registrations = RegistrationService::new(
        registration_repo.clone(),
        event_repo.clone(),
        TicketTierRepository::new(db.clone()),
        TicketService::new(registration_repo, event_repo, email.clone()),
        InvoiceService::new(InvoiceRepository::new(db), email.clone()),
        email,
        Arc::new(MemorySmsSender::new()),
        RegistrationSettings {
            otp_ttl: Duration::minutes(5),
            hold_ttl: Duration::hours(24),
            reminder_interval: Duration::hours(2),
            max_reminders: 5,
            frontend_url: "https://eventz.test".to_string(),
        },
    );

    (MaintenanceExecutor::new(registrations), outbox)
}

#[tokio::test]
async fn test_expire_job_reports_cancelled_count() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).append_exec_results([MockExecResult {
        last_insert_id: 0,
        rows_affected: 4,
    }]);
    let (executor, _) = executor(db);

    assert_eq!(executor.expire_stale_registrations().await.unwrap(), 4);
}

#[tokio::test]
async fn test_reminder_job_with_nothing_due() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<eventz_db::entities::registration::Model>::new()]);
    let (executor, outbox) = executor(db);

    assert_eq!(
        run_job(ScheduledJob::SendRegistrationReminders, &executor).await,
        Some(0)
    );
    assert!(outbox.sent().is_empty());
}

#[tokio::test]
async fn test_job_failure_is_contained() {
    // no mocked results: the query errors
    let (executor, _) = executor(MockDatabase::new(DatabaseBackend::Postgres));

    assert_eq!(
        run_job(ScheduledJob::ExpireStaleRegistrations, &executor).await,
        None
    );
}
