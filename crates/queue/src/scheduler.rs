//! Scheduled jobs for periodic maintenance tasks.

#![allow(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use eventz_common::config::SchedulerSettings;
use serde::{Deserialize, Serialize};
use tokio::{task::JoinHandle, time::interval};

/// Scheduled job types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledJob {
    /// Cancel unfinished registrations whose hold ran out.
    ExpireStaleRegistrations,
    /// Email attendees who stopped before completing.
    SendRegistrationReminders,
}

impl ScheduledJob {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ExpireStaleRegistrations => "expire_stale_registrations",
            Self::SendRegistrationReminders => "send_registration_reminders",
        }
    }
}

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Interval of the expiry sweep (default: 1 hour).
    pub expiry_interval: Duration,
    /// Interval of the reminder job (default: 2 hours).
    pub reminder_interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            expiry_interval: Duration::from_secs(3600),
            reminder_interval: Duration::from_secs(2 * 3600),
        }
    }
}

impl From<&SchedulerSettings> for SchedulerConfig {
    fn from(settings: &SchedulerSettings) -> Self {
        Self {
            expiry_interval: Duration::from_secs(settings.expiry_interval_secs.max(1)),
            reminder_interval: Duration::from_secs(settings.reminder_interval_secs.max(1)),
        }
    }
}

/// Job executor trait for scheduled jobs.
#[async_trait::async_trait]
pub trait JobExecutor: Send + Sync {
    /// Cancel expired registrations. Returns how many were cancelled.
    async fn expire_stale_registrations(
        &self,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;

    /// Send due reminders. Returns how many were sent.
    async fn send_registration_reminders(
        &self,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>>;
}

/// Run one job once, logging its outcome.
pub async fn run_job<E: JobExecutor + ?Sized>(job: ScheduledJob, executor: &E) -> Option<u64> {
    let result = match job {
        ScheduledJob::ExpireStaleRegistrations => executor.expire_stale_registrations().await,
        ScheduledJob::SendRegistrationReminders => executor.send_registration_reminders().await,
    };

    match result {
        Ok(count) => {
            if count > 0 {
                tracing::info!(job = job.name(), count, "Scheduled job finished");
            }
            Some(count)
        }
        Err(e) => {
            tracing::error!(job = job.name(), error = %e, "Scheduled job failed");
            None
        }
    }
}

fn spawn_loop<E: JobExecutor + 'static>(
    job: ScheduledJob,
    period: Duration,
    executor: Arc<E>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = interval(period);
        loop {
            interval.tick().await;
            run_job(job, executor.as_ref()).await;
        }
    })
}

/// Run the scheduler with the given configuration and executor.
///
/// Each job gets its own interval task; the first run happens immediately.
/// Abort the returned handles to stop the jobs.
pub fn run_scheduler<E: JobExecutor + 'static>(
    config: SchedulerConfig,
    executor: Arc<E>,
) -> Vec<JoinHandle<()>> {
    tracing::info!(
        expiry_interval_secs = config.expiry_interval.as_secs(),
        reminder_interval_secs = config.reminder_interval.as_secs(),
        "Starting scheduler"
    );

    vec![
        spawn_loop(
            ScheduledJob::ExpireStaleRegistrations,
            config.expiry_interval,
            executor.clone(),
        ),
        spawn_loop(
            ScheduledJob::SendRegistrationReminders,
            config.reminder_interval,
            executor,
        ),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Default)]
    struct CountingExecutor {
        expiry_runs: AtomicU64,
        reminder_runs: AtomicU64,
        fail_reminders: bool,
    }

    #[async_trait::async_trait]
    impl JobExecutor for CountingExecutor {
        async fn expire_stale_registrations(
            &self,
        ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.expiry_runs.fetch_add(1, Ordering::SeqCst) + 1)
        }

        async fn send_registration_reminders(
            &self,
        ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
            self.reminder_runs.fetch_add(1, Ordering::SeqCst);
            if self.fail_reminders {
                return Err("smtp down".into());
            }
            Ok(0)
        }
    }

    #[test]
    fn test_scheduler_config_default() {
        let config = SchedulerConfig::default();
        assert_eq!(config.expiry_interval, Duration::from_secs(3600));
        assert_eq!(config.reminder_interval, Duration::from_secs(7200));
    }

    #[test]
    fn test_scheduler_config_from_settings() {
        let config = SchedulerConfig::from(&SchedulerSettings {
            expiry_interval_secs: 60,
            reminder_interval_secs: 0,
        });
        assert_eq!(config.expiry_interval, Duration::from_secs(60));
        assert_eq!(config.reminder_interval, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_run_job_reports_failure() {
        let executor = CountingExecutor {
            fail_reminders: true,
            ..Default::default()
        };

        assert_eq!(
            run_job(ScheduledJob::ExpireStaleRegistrations, &executor).await,
            Some(1)
        );
        assert_eq!(
            run_job(ScheduledJob::SendRegistrationReminders, &executor).await,
            None
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_scheduler_ticks_each_job() {
        let executor = Arc::new(CountingExecutor::default());
        let handles = run_scheduler(
            SchedulerConfig {
                expiry_interval: Duration::from_secs(60),
                reminder_interval: Duration::from_secs(120),
            },
            executor.clone(),
        );

        tokio::time::sleep(Duration::from_secs(121)).await;
        for handle in handles {
            handle.abort();
        }

        // immediate first tick, then one per period
        assert_eq!(executor.expiry_runs.load(Ordering::SeqCst), 3);
        assert_eq!(executor.reminder_runs.load(Ordering::SeqCst), 2);
    }
}
