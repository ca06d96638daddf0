//! Attendee registration workflow.
//!
//! ```text
//! PENDING_OTP --verify--> PENDING_PAYMENT --pay--> COMPLETED
//!      |  \___________verify (free tier)___________/
//!      |                  |
//!      +------expire------+----> CANCELLED
//! ```
//!
//! Tickets are only taken from a tier when a registration reaches
//! `COMPLETED`, inside the same transaction as the status change.

use std::{collections::HashMap, sync::LazyLock};

use chrono::{Duration, Utc};
use eventz_common::{AppError, AppResult, Config, IdGenerator};
use eventz_db::{
    entities::{
        event::EventStatus,
        registration::{self, PaymentStatus, RegistrationStatus},
        ticket_tier::TicketType,
    },
    repositories::{AttendeeFilter, EventRepository, RegistrationRepository, TicketTierRepository},
};
use regex::Regex;
use sea_orm::Set;
use serde::Deserialize;
use tracing::{error, info, warn};
use validator::Validate;

use super::{
    EmailService, InvoiceService, SmsService, TicketService, templates::EmailTemplate,
};

#[allow(clippy::expect_used)]
static PHONE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9]{7,15}$").expect("valid phone regex"));

const REMINDER_BATCH: u64 = 100;

const fn default_quantity() -> i32 {
    1
}

/// Registration workflow tunables.
#[derive(Debug, Clone)]
pub struct RegistrationSettings {
    pub otp_ttl: Duration,
    pub hold_ttl: Duration,
    pub reminder_interval: Duration,
    pub max_reminders: i32,
    pub frontend_url: String,
}

impl RegistrationSettings {
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            otp_ttl: Duration::seconds(config.registration.otp_ttl_secs),
            hold_ttl: Duration::hours(config.registration.hold_ttl_hours),
            reminder_interval: Duration::hours(config.registration.reminder_interval_hours),
            max_reminders: config.registration.max_reminders,
            frontend_url: config.server.frontend_url.trim_end_matches('/').to_string(),
        }
    }
}

/// Input for starting a registration.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InitiateRegistrationInput {
    #[validate(length(min = 1))]
    pub event_id: String,

    #[validate(length(min = 1, max = 100))]
    pub user_name: String,

    #[validate(email)]
    pub user_email: String,

    #[validate(regex(path = *PHONE_REGEX, message = "Invalid phone number"))]
    pub user_phone: String,

    pub ticket_type: TicketType,

    #[serde(default = "default_quantity")]
    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// Gateway references recorded when a payment completes.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentReference {
    #[serde(alias = "razorpayOrderId")]
    pub order_id: Option<String>,
    #[serde(alias = "razorpayPaymentId")]
    pub payment_id: Option<String>,
}

/// What happens after a correct OTP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyOtpOutcome {
    /// Free ticket, registration is complete.
    Completed { registration_id: String },
    /// Paid ticket, awaiting payment of `amount`.
    PaymentRequired { registration_id: String, amount: i64 },
}

/// Registration service for business logic.
#[derive(Clone)]
pub struct RegistrationService {
    registration_repo: RegistrationRepository,
    event_repo: EventRepository,
    tier_repo: TicketTierRepository,
    tickets: TicketService,
    invoices: InvoiceService,
    email: EmailService,
    sms: SmsService,
    id_gen: IdGenerator,
    settings: RegistrationSettings,
}

impl RegistrationService {
    /// Create a new registration service.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        registration_repo: RegistrationRepository,
        event_repo: EventRepository,
        tier_repo: TicketTierRepository,
        tickets: TicketService,
        invoices: InvoiceService,
        email: EmailService,
        sms: SmsService,
        settings: RegistrationSettings,
    ) -> Self {
        Self {
            registration_repo,
            event_repo,
            tier_repo,
            tickets,
            invoices,
            email,
            sms,
            id_gen: IdGenerator::new(),
            settings,
        }
    }

    fn otp_minutes(&self) -> i64 {
        self.settings.otp_ttl.num_minutes().max(1)
    }

    async fn send_otp_sms(&self, phone: &str, otp: &str) {
        if let Err(e) = self.sms.send_sms(phone, &format!("OTP: {otp}")).await {
            warn!(error = %e, "Failed to send OTP SMS");
        }
    }

    /// Start a registration and send the OTP. Returns the registration id.
    pub async fn initiate(&self, input: InitiateRegistrationInput) -> AppResult<String> {
        input.validate()?;

        let event = self.event_repo.get_by_id(&input.event_id).await?;
        if event.status != EventStatus::Published {
            return Err(AppError::Unprocessable(
                "Event not open for registration".to_string(),
            ));
        }

        let tier = self
            .tier_repo
            .find_tier(&event.id, input.ticket_type)
            .await?
            .ok_or_else(|| AppError::Unprocessable("Invalid ticket type".to_string()))?;

        if tier.available < input.quantity {
            return Err(AppError::Unprocessable("Tickets sold out".to_string()));
        }

        let user_email = input.user_email.trim().to_lowercase();
        let user_phone = input.user_phone.trim().to_string();

        if self
            .registration_repo
            .find_completed_duplicate(&event.id, &user_email, &user_phone)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("You have already registered".to_string()));
        }

        let now = Utc::now();
        let otp = self.id_gen.generate_otp();
        let payment_status = if tier.price == 0 {
            PaymentStatus::NotRequired
        } else {
            PaymentStatus::Pending
        };

        let model = registration::ActiveModel {
            id: Set(self.id_gen.generate()),
            event_id: Set(event.id.clone()),
            user_name: Set(input.user_name.trim().to_string()),
            user_email: Set(user_email),
            user_phone: Set(user_phone),
            ticket_type: Set(tier.tier_type),
            ticket_price: Set(tier.price),
            quantity: Set(input.quantity),
            status: Set(RegistrationStatus::PendingOtp),
            payment_status: Set(payment_status),
            otp: Set(Some(otp.clone())),
            otp_expires_at: Set(Some((now + self.settings.otp_ttl).into())),
            otp_verified: Set(false),
            gateway_order_id: Set(None),
            gateway_payment_id: Set(None),
            qr_code: Set(None),
            registration_number: Set(None),
            ticket_sent: Set(false),
            reminder_count: Set(0),
            last_reminder_at: Set(None),
            expires_at: Set(Some((now + self.settings.hold_ttl).into())),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let registration = self.registration_repo.create(model).await?;
        info!(
            registration_id = %registration.id,
            event_id = %event.id,
            ticket_type = registration.ticket_type.as_str(),
            quantity = registration.quantity,
            "Registration initiated"
        );

        self.email
            .send_template(
                &registration.user_email,
                &EmailTemplate::Otp {
                    user_name: &registration.user_name,
                    event_title: &event.title,
                    otp: &otp,
                    valid_minutes: self.otp_minutes(),
                },
                Vec::new(),
            )
            .await?;
        self.send_otp_sms(&registration.user_phone, &otp).await;

        Ok(registration.id)
    }

    /// Check the OTP and move the registration forward.
    pub async fn verify_otp(&self, registration_id: &str, otp: &str) -> AppResult<VerifyOtpOutcome> {
        let registration = self.registration_repo.get_by_id(registration_id).await?;

        if registration.status != RegistrationStatus::PendingOtp {
            return Err(AppError::Unprocessable("OTP is no longer valid".to_string()));
        }

        let now = Utc::now();
        let expired = registration
            .otp_expires_at
            .is_none_or(|expires| expires < now);
        let Some(expected) = registration.otp.as_deref().filter(|_| !expired) else {
            return Err(AppError::Unprocessable("OTP expired".to_string()));
        };
        if expected != otp.trim() {
            return Err(AppError::BadRequest("Invalid OTP".to_string()));
        }

        if registration.ticket_price == 0 {
            let number = self.id_gen.registration_number(now);
            let changes = registration::ActiveModel {
                status: Set(RegistrationStatus::Completed),
                payment_status: Set(PaymentStatus::NotRequired),
                otp: Set(None),
                otp_expires_at: Set(None),
                otp_verified: Set(true),
                registration_number: Set(Some(number.clone())),
                updated_at: Set(Some(now.into())),
                ..Default::default()
            };

            if !self
                .registration_repo
                .finalize(&registration, changes, 0)
                .await?
            {
                let current = self.registration_repo.get_by_id(registration_id).await?;
                return if current.status == RegistrationStatus::Completed {
                    Ok(VerifyOtpOutcome::Completed {
                        registration_id: current.id,
                    })
                } else {
                    Err(AppError::Unprocessable("OTP is no longer valid".to_string()))
                };
            }

            let completed = registration::Model {
                status: RegistrationStatus::Completed,
                payment_status: PaymentStatus::NotRequired,
                otp: None,
                otp_expires_at: None,
                otp_verified: true,
                registration_number: Some(number),
                updated_at: Some(now.into()),
                ..registration
            };
            info!(registration_id = %completed.id, "Free registration completed");

            if let Err(e) = self.tickets.generate_and_send(&completed).await {
                error!(error = %e, registration_id = %completed.id, "Failed to issue ticket");
            }

            return Ok(VerifyOtpOutcome::Completed {
                registration_id: completed.id,
            });
        }

        let changes = registration::ActiveModel {
            status: Set(RegistrationStatus::PendingPayment),
            otp: Set(None),
            otp_expires_at: Set(None),
            otp_verified: Set(true),
            updated_at: Set(Some(now.into())),
            ..Default::default()
        };
        if !self
            .registration_repo
            .transition(&registration.id, RegistrationStatus::PendingOtp, changes)
            .await?
        {
            return Err(AppError::Unprocessable("OTP is no longer valid".to_string()));
        }

        Ok(VerifyOtpOutcome::PaymentRequired {
            amount: registration.total_amount(),
            registration_id: registration.id,
        })
    }

    /// Issue a fresh OTP for a registration still awaiting verification.
    pub async fn resend_otp(&self, registration_id: &str) -> AppResult<()> {
        let registration = self.registration_repo.get_by_id(registration_id).await?;
        if registration.status != RegistrationStatus::PendingOtp {
            return Err(AppError::Unprocessable(
                "OTP can only be resent before verification".to_string(),
            ));
        }

        let now = Utc::now();
        let otp = self.id_gen.generate_otp();
        let mut active: registration::ActiveModel = registration.into();
        active.otp = Set(Some(otp.clone()));
        active.otp_expires_at = Set(Some((now + self.settings.otp_ttl).into()));
        active.updated_at = Set(Some(now.into()));
        let registration = self.registration_repo.update(active).await?;

        self.email
            .send_template(
                &registration.user_email,
                &EmailTemplate::OtpResent {
                    user_name: &registration.user_name,
                    otp: &otp,
                    valid_minutes: self.otp_minutes(),
                },
                Vec::new(),
            )
            .await?;
        self.send_otp_sms(&registration.user_phone, &otp).await;

        Ok(())
    }

    /// Finish a paid registration. Safe to call more than once.
    ///
    /// Only reachable through [`crate::PaymentService`], after the checkout
    /// signature or the webhook signature has been checked.
    ///
    /// Ticket and invoice delivery happen after the commit; their failures
    /// are logged and do not undo the completion.
    pub(crate) async fn complete(
        &self,
        registration_id: &str,
        payment: PaymentReference,
    ) -> AppResult<registration::Model> {
        let registration = self.registration_repo.get_by_id(registration_id).await?;

        if registration.ticket_sent {
            return Ok(registration);
        }

        if registration.status == RegistrationStatus::Completed {
            return match self.tickets.generate_and_send(&registration).await {
                Ok(updated) => Ok(updated),
                Err(e) => {
                    error!(error = %e, registration_id = %registration.id, "Ticket retry failed");
                    Ok(registration)
                }
            };
        }

        if registration.status != RegistrationStatus::PendingPayment {
            return Err(AppError::Unprocessable(
                "Registration is not awaiting payment".to_string(),
            ));
        }

        let now = Utc::now();
        let number = self.id_gen.registration_number(now);
        let order_id = payment.order_id.or_else(|| registration.gateway_order_id.clone());
        let payment_id = payment.payment_id;

        let changes = registration::ActiveModel {
            status: Set(RegistrationStatus::Completed),
            payment_status: Set(PaymentStatus::Paid),
            registration_number: Set(Some(number.clone())),
            gateway_order_id: Set(order_id.clone()),
            gateway_payment_id: Set(payment_id.clone()),
            updated_at: Set(Some(now.into())),
            ..Default::default()
        };

        let revenue = registration.total_amount();
        if !self
            .registration_repo
            .finalize(&registration, changes, revenue)
            .await?
        {
            info!(registration_id = %registration_id, "Registration already finalized elsewhere");
            return self.registration_repo.get_by_id(registration_id).await;
        }

        let mut completed = registration::Model {
            status: RegistrationStatus::Completed,
            payment_status: PaymentStatus::Paid,
            registration_number: Some(number),
            gateway_order_id: order_id,
            gateway_payment_id: payment_id,
            updated_at: Some(now.into()),
            ..registration
        };
        info!(registration_id = %completed.id, revenue, "Paid registration completed");

        match self.tickets.generate_and_send(&completed).await {
            Ok(updated) => completed = updated,
            Err(e) => error!(error = %e, registration_id = %completed.id, "Failed to issue ticket"),
        }

        let event_title = match self.event_repo.find_by_id(&completed.event_id).await {
            Ok(Some(event)) => event.title,
            Ok(None) => String::new(),
            Err(e) => {
                warn!(error = %e, "Failed to load event for invoice");
                String::new()
            }
        };
        if let Err(e) = self.invoices.send_invoice(&completed, &event_title).await {
            error!(error = %e, registration_id = %completed.id, "Failed to send invoice");
        }

        Ok(completed)
    }

    /// The attendee closed the checkout without paying.
    pub async fn mark_payment_cancelled(
        &self,
        registration_id: &str,
    ) -> AppResult<registration::Model> {
        let registration = self.registration_repo.get_by_id(registration_id).await?;
        if registration.status != RegistrationStatus::PendingPayment {
            return Err(AppError::Unprocessable(
                "Registration is not awaiting payment".to_string(),
            ));
        }

        let mut active: registration::ActiveModel = registration.into();
        active.payment_status = Set(PaymentStatus::Pending);
        active.updated_at = Set(Some(Utc::now().into()));
        self.registration_repo.update(active).await
    }

    pub async fn find_by_id(&self, registration_id: &str) -> AppResult<registration::Model> {
        self.registration_repo.get_by_id(registration_id).await
    }

    /// All registrations made with a phone number, newest first.
    pub async fn find_by_user(&self, phone: &str) -> AppResult<Vec<registration::Model>> {
        self.registration_repo.find_by_phone(phone.trim()).await
    }

    /// Completed registrations of an event, for its organizer.
    pub async fn find_by_event(
        &self,
        event_id: &str,
        organizer_id: &str,
    ) -> AppResult<Vec<registration::Model>> {
        let event = self.event_repo.get_by_id(event_id).await?;
        if event.organizer_id != organizer_id {
            return Err(AppError::Forbidden("Access denied".to_string()));
        }

        self.registration_repo
            .find_completed_by_event(event_id, &AttendeeFilter::default())
            .await
    }

    /// Cancel unfinished registrations whose hold has run out.
    pub async fn expire_stale(&self) -> AppResult<u64> {
        let count = self.registration_repo.expire_stale(Utc::now()).await?;
        if count > 0 {
            info!(count, "Expired stale registrations");
        }
        Ok(count)
    }

    /// Nudge attendees who stopped halfway. Returns the number of emails sent.
    pub async fn send_reminders(&self) -> AppResult<u64> {
        let now = Utc::now();
        let candidates = self
            .registration_repo
            .find_reminder_candidates(
                now,
                now - self.settings.reminder_interval,
                self.settings.max_reminders,
                REMINDER_BATCH,
            )
            .await?;

        let mut titles: HashMap<String, String> = HashMap::new();
        let mut sent = 0;

        for registration in candidates {
            let title = match titles.get(&registration.event_id) {
                Some(title) => title.clone(),
                None => {
                    let title = match self.event_repo.find_by_id(&registration.event_id).await {
                        Ok(Some(event)) => event.title,
                        Ok(None) => continue,
                        Err(e) => {
                            warn!(error = %e, registration_id = %registration.id, "Skipping reminder");
                            continue;
                        }
                    };
                    titles.insert(registration.event_id.clone(), title.clone());
                    title
                }
            };

            let (reason, path) = if registration.status == RegistrationStatus::PendingOtp {
                ("OTP was not verified", "verify-otp")
            } else {
                ("Payment was not completed", "payment")
            };
            let resume_url = format!("{}/{path}/{}", self.settings.frontend_url, registration.id);

            let result = self
                .email
                .send_template(
                    &registration.user_email,
                    &EmailTemplate::RegistrationReminder {
                        user_name: &registration.user_name,
                        event_title: &title,
                        reason,
                        resume_url: &resume_url,
                    },
                    Vec::new(),
                )
                .await;

            match result {
                Ok(()) => {
                    if let Err(e) = self.registration_repo.record_reminder(&registration.id, now).await {
                        warn!(error = %e, registration_id = %registration.id, "Failed to record reminder");
                    }
                    sent += 1;
                }
                Err(e) => {
                    warn!(error = %e, registration_id = %registration.id, "Failed to send reminder");
                }
            }
        }

        Ok(sent)
    }
}
