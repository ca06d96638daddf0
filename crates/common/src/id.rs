//! ID, token and OTP generation.

use chrono::{DateTime, Utc};
use rand::Rng;
use ulid::Ulid;
use uuid::Uuid;

/// Generator for entity ids and user-facing codes.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    _private: (),
}

impl IdGenerator {
    /// Create a new ID generator.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }

    /// Generate a new ULID-based ID.
    ///
    /// ULIDs sort by creation time, so `ORDER BY id` roughly follows
    /// insertion order.
    #[must_use]
    pub fn generate(&self) -> String {
        Ulid::new().to_string().to_lowercase()
    }

    /// Generate an unguessable token (password reset links).
    #[must_use]
    pub fn generate_token(&self) -> String {
        // v4 has no time component
        Uuid::new_v4().simple().to_string()
    }

    /// Generate a six digit one-time password.
    #[must_use]
    pub fn generate_otp(&self) -> String {
        rand::thread_rng().gen_range(100_000..=999_999).to_string()
    }

    /// Human-facing registration number, `REG-<unix millis>`.
    #[must_use]
    pub fn registration_number(&self, at: DateTime<Utc>) -> String {
        format!("REG-{}", at.timestamp_millis())
    }
}
