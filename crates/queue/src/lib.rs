//! Background jobs for eventz.
//!
//! - **Scheduler**: interval loops for registration expiry and reminders
//! - **Executor**: the production [`JobExecutor`] over the registration service

pub mod executor;
pub mod scheduler;

pub use executor::MaintenanceExecutor;
pub use scheduler::{JobExecutor, ScheduledJob, SchedulerConfig, run_job, run_scheduler};
