//! Job executor backed by the registration service.

use eventz_core::RegistrationService;

use crate::scheduler::JobExecutor;

/// Runs maintenance jobs against the database.
#[derive(Clone)]
pub struct MaintenanceExecutor {
    registrations: RegistrationService,
}

impl MaintenanceExecutor {
    /// Create a new executor.
    #[must_use]
    pub const fn new(registrations: RegistrationService) -> Self {
        Self { registrations }
    }
}

#[async_trait::async_trait]
impl JobExecutor for MaintenanceExecutor {
    async fn expire_stale_registrations(
        &self,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.registrations.expire_stale().await?)
    }

    async fn send_registration_reminders(
        &self,
    ) -> Result<u64, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.registrations.send_reminders().await?)
    }
}
