//! Model builders shared by service tests.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use eventz_db::entities::{
    event::{self, EventStatus},
    organizer,
    registration::{self, PaymentStatus, RegistrationStatus},
    ticket_tier::{self, TicketType},
};
use sea_orm::MockExecResult;
use serde_json::json;

use crate::services::{EmailService, MemoryTransport};

pub fn organizer(id: &str) -> organizer::Model {
    organizer::Model {
        id: id.to_string(),
        email: format!("{id}@example.com"),
        password_hash: String::new(),
        name: "Asha".to_string(),
        role: organizer::ROLE_ORGANIZER.to_string(),
        photo_url: None,
        password_reset_token: None,
        password_reset_expires: None,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

pub fn event(id: &str, organizer_id: &str) -> event::Model {
    event::Model {
        id: id.to_string(),
        organizer_id: organizer_id.to_string(),
        title: "Rust Meetup".to_string(),
        description: "Talks and pizza".to_string(),
        start_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap_or_default(),
        end_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap_or_default(),
        start_time: "18:00".to_string(),
        end_time: "21:00".to_string(),
        location: "Hall 2".to_string(),
        city: "Pune".to_string(),
        category: "tech".to_string(),
        media_urls: json!([]),
        capacity: 100,
        status: EventStatus::Published,
        total_registrations: 0,
        total_revenue: 0,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

pub fn tier(event_id: &str, tier_type: TicketType, price: i64, available: i32) -> ticket_tier::Model {
    ticket_tier::Model {
        id: format!("{event_id}-{}", tier_type.as_str().to_lowercase()),
        event_id: event_id.to_string(),
        tier_type,
        name: tier_type.as_str().to_string(),
        price,
        quantity: 50,
        available,
        description: None,
        position: 0,
    }
}

pub fn registration(id: &str, event_id: &str, status: RegistrationStatus) -> registration::Model {
    registration::Model {
        id: id.to_string(),
        event_id: event_id.to_string(),
        user_name: "Ravi".to_string(),
        user_email: "ravi@example.com".to_string(),
        user_phone: "9876543210".to_string(),
        ticket_type: TicketType::Regular,
        ticket_price: 500,
        quantity: 2,
        status,
        payment_status: PaymentStatus::Pending,
        otp: Some("123456".to_string()),
        otp_expires_at: Some((Utc::now() + Duration::minutes(5)).into()),
        otp_verified: false,
        gateway_order_id: None,
        gateway_payment_id: None,
        qr_code: None,
        registration_number: None,
        ticket_sent: false,
        reminder_count: 0,
        last_reminder_at: None,
        expires_at: Some((Utc::now() + Duration::hours(24)).into()),
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

pub fn completed(id: &str, event_id: &str) -> registration::Model {
    registration::Model {
        payment_status: PaymentStatus::Paid,
        otp: None,
        otp_expires_at: None,
        otp_verified: true,
        registration_number: Some("REG-1700000000000".to_string()),
        ..registration(id, event_id, RegistrationStatus::Completed)
    }
}

pub fn exec(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

pub fn mailer() -> (EmailService, MemoryTransport) {
    let outbox = MemoryTransport::new();
    (EmailService::new(Arc::new(outbox.clone())), outbox)
}
