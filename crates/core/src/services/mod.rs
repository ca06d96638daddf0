//! Business logic services.

#![allow(missing_docs)]

pub mod contact;
pub mod dashboard;
pub mod email;
pub mod event;
pub mod invoice;
pub mod organizer;
pub mod payment;
pub mod pdf;
pub mod qr;
pub mod registration;
pub mod sms;
pub mod templates;
pub mod ticket;
pub mod token;

pub use contact::{CONTACT_SUCCESS_MESSAGE, ContactInput, ContactService};
pub use dashboard::{
    Attendee, DashboardService, DashboardSummary, EventAnalytics, EventStats, EventSummary,
    OrganizerAnalytics, PaymentStatusBreakdown, TicketTypeBreakdown, TopEvent, TrendPoint,
};
pub use email::{
    EmailAttachment, EmailMessage, EmailService, EmailTransport, LogTransport, MemoryTransport,
    SmtpTransport,
};
pub use event::{
    CreateEventInput, EventService, EventWithTiers, TicketTierInput, UpdateEventInput,
};
pub use invoice::InvoiceService;
pub use organizer::{
    AuthSession, ChangePasswordInput, FORGOT_PASSWORD_MESSAGE, ForgotPasswordInput, LoginInput,
    OrganizerService, RegisterOrganizerInput, ResetPasswordInput, UpdateProfileInput,
};
pub use payment::{
    CheckoutOrder, GatewayOrder, PaymentGateway, PaymentGatewayService, PaymentService,
    PaymentSettings, RazorpayGateway, VerifyPaymentInput,
};
pub use qr::{QrMatrix, TicketQrPayload};
pub use registration::{
    InitiateRegistrationInput, PaymentReference, RegistrationService, RegistrationSettings,
    VerifyOtpOutcome,
};
pub use sms::{LogSmsSender, MemorySmsSender, SmsSender, SmsService};
pub use templates::{EmailTemplate, RenderedEmail};
pub use ticket::{QrVerification, TicketPdf, TicketService};
pub use token::{Claims, TokenService};
