//! Payment gateway integration.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use eventz_common::{AppError, AppResult, Config, config::PaymentConfig};
use eventz_db::{
    entities::registration::{self, PaymentStatus, RegistrationStatus},
    repositories::{EventRepository, RegistrationRepository},
};
use hmac::{Hmac, Mac};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sha2::Sha256;
use tracing::{debug, info, warn};

use super::{EmailService, PaymentReference, RegistrationService, templates::EmailTemplate};

type HmacSha256 = Hmac<Sha256>;

/// Webhook event that completes a registration.
pub const PAYMENT_CAPTURED: &str = "payment.captured";

#[allow(clippy::expect_used)] // HMAC accepts any key size, this cannot fail
fn mac(secret: &str) -> HmacSha256 {
    HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size")
}

/// Hex HMAC-SHA256 of `data`.
#[must_use]
pub fn sign(secret: &str, data: &[u8]) -> String {
    let mut mac = mac(secret);
    mac.update(data);
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time check of a hex HMAC-SHA256 signature.
#[must_use]
pub fn verify_signature(secret: &str, data: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let mut mac = mac(secret);
    mac.update(data);
    mac.verify_slice(&expected).is_ok()
}

/// An order created at the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GatewayOrder {
    pub id: String,
    /// Minor units.
    pub amount: i64,
    pub currency: String,
}

/// Payment gateway operations.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Create an order for `amount_minor` (paise for INR).
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> AppResult<GatewayOrder>;

    /// Public key handed to the checkout widget.
    fn key_id(&self) -> &str;
}

/// Type alias for the gateway used by the service.
pub type PaymentGatewayService = Arc<dyn PaymentGateway>;

/// Razorpay REST client.
#[derive(Clone)]
pub struct RazorpayGateway {
    http_client: reqwest::Client,
    api_base: String,
    key_id: String,
    key_secret: String,
}

impl RazorpayGateway {
    #[must_use]
    #[allow(clippy::expect_used)] // Client build only fails with incompatible TLS settings
    pub fn new(config: &PaymentConfig) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
        }
    }
}

#[async_trait]
impl PaymentGateway for RazorpayGateway {
    async fn create_order(
        &self,
        amount_minor: i64,
        currency: &str,
        receipt: &str,
    ) -> AppResult<GatewayOrder> {
        let response = self
            .http_client
            .post(format!("{}/orders", self.api_base))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&json!({
                "amount": amount_minor,
                "currency": currency,
                "receipt": receipt,
            }))
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Payment gateway unreachable");
                AppError::ExternalService("Payment order creation failed".to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body, "Payment gateway rejected order");
            return Err(AppError::ExternalService(
                "Payment order creation failed".to_string(),
            ));
        }

        response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse gateway order");
            AppError::ExternalService("Payment order creation failed".to_string())
        })
    }

    fn key_id(&self) -> &str {
        &self.key_id
    }
}

/// Checkout parameters for the client widget.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOrder {
    pub razorpay_order_id: String,
    pub amount: i64,
    pub currency: String,
    pub key: String,
    pub registration_id: String,
}

/// Input for verifying a checkout result.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyPaymentInput {
    pub registration_id: String,
    #[serde(alias = "razorpay_order_id")]
    pub razorpay_order_id: String,
    #[serde(alias = "razorpay_payment_id")]
    pub razorpay_payment_id: String,
    #[serde(alias = "razorpay_signature")]
    pub razorpay_signature: String,
}

#[derive(Debug, Deserialize)]
struct WebhookEvent {
    event: String,
    #[serde(default)]
    payload: Option<WebhookPayload>,
}

#[derive(Debug, Deserialize)]
struct WebhookPayload {
    payment: Option<WebhookPayment>,
}

#[derive(Debug, Deserialize)]
struct WebhookPayment {
    entity: PaymentEntity,
}

#[derive(Debug, Deserialize)]
struct PaymentEntity {
    id: String,
    order_id: Option<String>,
}

/// Secrets and settings for the payment flow.
#[derive(Debug, Clone)]
pub struct PaymentSettings {
    pub key_secret: String,
    pub webhook_secret: String,
    pub currency: String,
    pub frontend_url: String,
}

impl PaymentSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            key_secret: config.payment.key_secret.clone(),
            webhook_secret: config.payment.webhook_secret.clone(),
            currency: config.payment.currency.clone(),
            frontend_url: config.server.frontend_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Payment service for business logic.
#[derive(Clone)]
pub struct PaymentService {
    registration_repo: RegistrationRepository,
    event_repo: EventRepository,
    registrations: RegistrationService,
    gateway: PaymentGatewayService,
    email: EmailService,
    settings: PaymentSettings,
}

impl PaymentService {
    /// Create a new payment service.
    #[must_use]
    pub const fn new(
        registration_repo: RegistrationRepository,
        event_repo: EventRepository,
        registrations: RegistrationService,
        gateway: PaymentGatewayService,
        email: EmailService,
        settings: PaymentSettings,
    ) -> Self {
        Self {
            registration_repo,
            event_repo,
            registrations,
            gateway,
            email,
            settings,
        }
    }

    async fn awaiting_payment(&self, registration_id: &str) -> AppResult<registration::Model> {
        let registration = self.registration_repo.get_by_id(registration_id).await?;
        if registration.status != RegistrationStatus::PendingPayment {
            return Err(AppError::Unprocessable("Payment not required".to_string()));
        }
        Ok(registration)
    }

    /// Open a gateway order for a registration awaiting payment.
    pub async fn create_order(&self, registration_id: &str) -> AppResult<CheckoutOrder> {
        let registration = self.awaiting_payment(registration_id).await?;

        let order = self
            .gateway
            .create_order(
                registration.total_amount() * 100,
                &self.settings.currency,
                &registration.id,
            )
            .await?;

        let mut active: registration::ActiveModel = registration.into();
        active.gateway_order_id = Set(Some(order.id.clone()));
        active.updated_at = Set(Some(Utc::now().into()));
        let registration = self.registration_repo.update(active).await?;

        info!(registration_id = %registration.id, order_id = %order.id, "Payment order created");

        Ok(CheckoutOrder {
            razorpay_order_id: order.id,
            amount: order.amount,
            currency: order.currency,
            key: self.gateway.key_id().to_string(),
            registration_id: registration.id,
        })
    }

    /// A fresh order for another checkout attempt.
    pub async fn retry(&self, registration_id: &str) -> AppResult<CheckoutOrder> {
        self.create_order(registration_id).await
    }

    /// Check the checkout signature and complete the registration.
    pub async fn verify_payment(&self, input: VerifyPaymentInput) -> AppResult<registration::Model> {
        let signed = format!("{}|{}", input.razorpay_order_id, input.razorpay_payment_id);
        if !verify_signature(
            &self.settings.key_secret,
            signed.as_bytes(),
            &input.razorpay_signature,
        ) {
            debug!(registration_id = %input.registration_id, "Payment signature mismatch");
            return Err(AppError::BadRequest("Invalid payment signature".to_string()));
        }

        self.registrations
            .complete(
                &input.registration_id,
                PaymentReference {
                    order_id: Some(input.razorpay_order_id),
                    payment_id: Some(input.razorpay_payment_id),
                },
            )
            .await
    }

    /// Process a gateway webhook delivery.
    ///
    /// The signature covers the raw body, so it must be checked before any
    /// parsing.
    pub async fn handle_webhook(&self, body: &[u8], signature: Option<&str>) -> AppResult<()> {
        let Some(signature) = signature else {
            return Err(AppError::BadRequest("Missing signature".to_string()));
        };
        if !verify_signature(&self.settings.webhook_secret, body, signature) {
            return Err(AppError::BadRequest("Invalid webhook signature".to_string()));
        }

        let event: WebhookEvent = serde_json::from_slice(body)
            .map_err(|_| AppError::BadRequest("Invalid webhook payload".to_string()))?;

        if event.event != PAYMENT_CAPTURED {
            debug!(event = %event.event, "Ignoring webhook event");
            return Ok(());
        }

        let Some(payment) = event.payload.and_then(|p| p.payment).map(|p| p.entity) else {
            warn!("payment.captured webhook without payment entity");
            return Ok(());
        };
        let Some(order_id) = payment.order_id else {
            warn!(payment_id = %payment.id, "Captured payment has no order id");
            return Ok(());
        };

        let Some(registration) = self
            .registration_repo
            .find_by_gateway_order_id(&order_id)
            .await?
        else {
            warn!(order_id = %order_id, "Captured payment for unknown order");
            return Ok(());
        };

        if registration.status == RegistrationStatus::PendingPayment {
            self.registrations
                .complete(
                    &registration.id,
                    PaymentReference {
                        order_id: Some(order_id),
                        payment_id: Some(payment.id),
                    },
                )
                .await?;
        }

        Ok(())
    }

    /// Record a failed payment and email a retry link.
    pub async fn mark_failed(&self, registration_id: &str) -> AppResult<registration::Model> {
        let registration = self.registration_repo.get_by_id(registration_id).await?;
        if registration.status != RegistrationStatus::PendingPayment {
            return Err(AppError::Unprocessable(
                "Registration is not awaiting payment".to_string(),
            ));
        }

        let mut active: registration::ActiveModel = registration.into();
        active.payment_status = Set(PaymentStatus::Failed);
        active.updated_at = Set(Some(Utc::now().into()));
        let registration = self.registration_repo.update(active).await?;
        info!(registration_id = %registration.id, "Payment failed");

        let event_title = self
            .event_repo
            .find_by_id(&registration.event_id)
            .await?
            .map(|event| event.title)
            .unwrap_or_default();
        let retry_url = format!("{}/payment/{}", self.settings.frontend_url, registration.id);

        if let Err(e) = self
            .email
            .send_template(
                &registration.user_email,
                &EmailTemplate::PaymentFailed {
                    user_name: &registration.user_name,
                    event_title: &event_title,
                    retry_url: &retry_url,
                },
                Vec::new(),
            )
            .await
        {
            warn!(error = %e, registration_id = %registration.id, "Failed to send payment failure email");
        }

        Ok(registration)
    }
}
