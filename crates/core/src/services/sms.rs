//! SMS notifications.
//!
//! No SMS provider is wired up yet; [`LogSmsSender`] records the message
//! in the log so the OTP flow can be exercised end to end.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use eventz_common::{AppError, AppResult};

/// Sends short text messages to a phone number.
#[async_trait]
pub trait SmsSender: Send + Sync {
    async fn send_sms(&self, phone: &str, message: &str) -> AppResult<()>;
}

/// Type alias for a shared SMS sender.
pub type SmsService = Arc<dyn SmsSender>;

/// Placeholder sender that logs instead of sending.
#[derive(Debug, Clone, Default)]
pub struct LogSmsSender;

#[async_trait]
impl SmsSender for LogSmsSender {
    async fn send_sms(&self, phone: &str, message: &str) -> AppResult<()> {
        tracing::info!(phone = %phone, message = %message, "SMS sent (log only)");
        Ok(())
    }
}

/// Sender that records messages, for tests.
#[derive(Debug, Clone, Default)]
pub struct MemorySmsSender {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl MemorySmsSender {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `(phone, message)` pairs sent so far.
    #[must_use]
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl SmsSender for MemorySmsSender {
    async fn send_sms(&self, phone: &str, message: &str) -> AppResult<()> {
        self.sent
            .lock()
            .map_err(|_| AppError::Internal("SMS outbox poisoned".to_string()))?
            .push((phone.to_string(), message.to_string()));
        Ok(())
    }
}
