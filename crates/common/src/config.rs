//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Organizer authentication configuration.
    pub auth: AuthConfig,
    /// Outgoing email (SMTP). Mail is only logged when absent.
    #[serde(default)]
    pub email: Option<EmailConfig>,
    /// Payment gateway configuration.
    pub payment: PaymentConfig,
    /// Registration workflow tunables.
    #[serde(default)]
    pub registration: RegistrationConfig,
    /// Contact form configuration.
    #[serde(default)]
    pub contact: ContactConfig,
    /// Background job intervals.
    #[serde(default)]
    pub scheduler: SchedulerSettings,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of the API.
    pub url: String,
    /// Public URL of the attendee/organizer web app, used for links in emails.
    pub frontend_url: String,
    /// Allowed CORS origins. Any origin is allowed when empty.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Bearer token settings for organizers.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret used to sign access tokens.
    pub jwt_secret: String,
    /// Access token lifetime.
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
}

/// SMTP relay settings.
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// SMTP host.
    pub smtp_host: String,
    /// SMTP port.
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    /// SMTP username.
    #[serde(default)]
    pub smtp_username: Option<String>,
    /// SMTP password.
    #[serde(default)]
    pub smtp_password: Option<String>,
    /// Upgrade the connection with STARTTLS.
    #[serde(default = "default_true")]
    pub starttls: bool,
    /// Sender address.
    pub from_address: String,
    /// Sender display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

/// Payment gateway credentials.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Public key id, handed to the checkout widget.
    pub key_id: String,
    /// Secret used for API auth and payment signatures.
    pub key_secret: String,
    /// Secret used to sign webhook deliveries.
    pub webhook_secret: String,
    /// Gateway REST base URL.
    #[serde(default = "default_payment_api_base")]
    pub api_base: String,
    /// ISO currency code for orders.
    #[serde(default = "default_currency")]
    pub currency: String,
}

/// Registration workflow settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationConfig {
    /// OTP validity window.
    #[serde(default = "default_otp_ttl_secs")]
    pub otp_ttl_secs: i64,
    /// How long an unfinished registration is kept before it expires.
    #[serde(default = "default_hold_ttl_hours")]
    pub hold_ttl_hours: i64,
    /// Minimum gap between two reminders for the same registration.
    #[serde(default = "default_reminder_interval_hours")]
    pub reminder_interval_hours: i64,
    /// Maximum reminders per registration.
    #[serde(default = "default_max_reminders")]
    pub max_reminders: i32,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            otp_ttl_secs: default_otp_ttl_secs(),
            hold_ttl_hours: default_hold_ttl_hours(),
            reminder_interval_hours: default_reminder_interval_hours(),
            max_reminders: default_max_reminders(),
        }
    }
}

/// Contact form settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ContactConfig {
    /// Inbox that receives contact form notifications.
    #[serde(default = "default_contact_receiver")]
    pub receiver_email: String,
}

impl Default for ContactConfig {
    fn default() -> Self {
        Self {
            receiver_email: default_contact_receiver(),
        }
    }
}

/// Background job intervals.
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSettings {
    /// Interval of the expiry sweep.
    #[serde(default = "default_expiry_interval_secs")]
    pub expiry_interval_secs: u64,
    /// Interval of the reminder job.
    #[serde(default = "default_reminder_interval_secs")]
    pub reminder_interval_secs: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            expiry_interval_secs: default_expiry_interval_secs(),
            reminder_interval_secs: default_reminder_interval_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    5000
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

const fn default_token_ttl_hours() -> i64 {
    24 * 7
}

const fn default_smtp_port() -> u16 {
    587
}

const fn default_true() -> bool {
    true
}

fn default_from_name() -> String {
    "Eventz".to_string()
}

fn default_payment_api_base() -> String {
    "https://api.razorpay.com/v1".to_string()
}

fn default_currency() -> String {
    "INR".to_string()
}

const fn default_otp_ttl_secs() -> i64 {
    5 * 60
}

const fn default_hold_ttl_hours() -> i64 {
    24
}

const fn default_reminder_interval_hours() -> i64 {
    2
}

const fn default_max_reminders() -> i32 {
    5
}

fn default_contact_receiver() -> String {
    "support@eventz.com".to_string()
}

const fn default_expiry_interval_secs() -> u64 {
    60 * 60
}

const fn default_reminder_interval_secs() -> u64 {
    2 * 60 * 60
}

fn environment_source() -> config::Environment {
    config::Environment::with_prefix("EVENTZ")
        .separator("__")
        .list_separator(",")
        .with_list_parse_key("server.cors_origins")
        .try_parsing(true)
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present) into the process environment
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `EVENTZ_ENV`)
    /// 4. Environment variables with `EVENTZ_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("EVENTZ_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(environment_source())
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(environment_source())
            .build()?;

        config.try_deserialize()
    }
}
