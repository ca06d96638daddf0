//! Transactional email templates.

use chrono::{DateTime, Utc};
use chrono_tz::Asia::Kolkata;

const BRAND: &str = "Eventz";

/// Subject, bodies and reply-to of a rendered email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEmail {
    pub subject: String,
    pub text: String,
    pub html: String,
    pub reply_to: Option<String>,
}

/// Every email the platform sends.
#[derive(Debug, Clone)]
pub enum EmailTemplate<'a> {
    Otp {
        user_name: &'a str,
        event_title: &'a str,
        otp: &'a str,
        valid_minutes: i64,
    },
    OtpResent {
        user_name: &'a str,
        otp: &'a str,
        valid_minutes: i64,
    },
    TicketConfirmation {
        user_name: &'a str,
        event_title: &'a str,
        event_date: &'a str,
        venue: &'a str,
        ticket_type: &'a str,
        quantity: i32,
        registration_number: &'a str,
    },
    Invoice {
        user_name: &'a str,
        event_title: &'a str,
        invoice_number: &'a str,
        quantity: i32,
        unit_price: i64,
        total_amount: i64,
    },
    PaymentFailed {
        user_name: &'a str,
        event_title: &'a str,
        retry_url: &'a str,
    },
    RegistrationReminder {
        user_name: &'a str,
        event_title: &'a str,
        reason: &'a str,
        resume_url: &'a str,
    },
    PasswordReset {
        name: &'a str,
        reset_url: &'a str,
    },
    PasswordChanged {
        name: &'a str,
    },
    PasswordUpdated {
        name: &'a str,
    },
    ContactAdmin {
        name: &'a str,
        email: &'a str,
        subject: &'a str,
        message: &'a str,
        received_at: DateTime<Utc>,
    },
    ContactAcknowledgement {
        name: &'a str,
        subject: &'a str,
        message: &'a str,
    },
}

/// Escape text for inclusion in HTML.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// First `max` characters of `text`, with an ellipsis when cut.
pub fn preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max).collect();
        format!("{cut}...")
    }
}

fn button(url: &str, label: &str) -> String {
    format!(
        "<p><a href=\"{}\" style=\"display:inline-block;padding:12px 24px;background:#111827;color:#fff;text-decoration:none;border-radius:6px;\">{label}</a></p>",
        escape_html(url)
    )
}

fn details_table(rows: &[(&str, String)]) -> String {
    let mut html = String::from(
        "<table width=\"100%\" cellpadding=\"8\" cellspacing=\"0\" style=\"background:#f9fafb;border-radius:6px;\">",
    );
    for (label, value) in rows {
        html.push_str(&format!(
            "<tr><td><strong>{label}</strong></td><td>{}</td></tr>",
            escape_html(value)
        ));
    }
    html.push_str("</table>");
    html
}

/// Wrap content in the shared layout.
fn wrap_html(heading: &str, tagline: &str, content: &str, footer: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
</head>
<body style="margin:0;padding:0;background:#f4f6f8;font-family:Arial,sans-serif;">
    <table width="100%" cellpadding="0" cellspacing="0"><tr><td align="center">
    <table width="600" cellpadding="0" cellspacing="0" style="background:#ffffff;border-radius:8px;overflow:hidden;">
        <tr><td style="background:#111827;color:#ffffff;padding:24px;">
            <h2 style="margin:0;">{heading}</h2>
            <p style="margin:4px 0 0;">{tagline}</p>
        </td></tr>
        <tr><td style="padding:24px;color:#111827;">{content}</td></tr>
        <tr><td style="background:#f3f4f6;padding:16px;text-align:center;font-size:12px;color:#6b7280;">{footer}</td></tr>
    </table>
    </td></tr></table>
</body>
</html>"#
    )
}

fn greeting(name: &str) -> String {
    format!("<p>Hi <strong>{}</strong>,</p>", escape_html(name))
}

impl EmailTemplate<'_> {
    /// Render subject, plain text and HTML.
    #[must_use]
    pub fn render(&self) -> RenderedEmail {
        let footer = format!("This is an automated message from {BRAND}.");
        let mut reply_to = None;

        let (subject, text, html) = match *self {
            Self::Otp {
                user_name,
                event_title,
                otp,
                valid_minutes,
            } => {
                let subject = "Your OTP for Event Registration".to_string();
                let text = format!(
                    "Hi {user_name},\n\nYour OTP for registering to \"{event_title}\" is {otp}.\n\
                     It is valid for the next {valid_minutes} minutes.\n\n\
                     If you did not request this, you can ignore this email."
                );
                let html = wrap_html(
                    BRAND,
                    "Verify your registration",
                    &format!(
                        "{}<p>Your OTP for registering to <strong>{}</strong> is:</p>\
                         <p style=\"font-size:28px;letter-spacing:6px;font-weight:bold;\">{otp}</p>\
                         <p>It is valid for the next {valid_minutes} minutes.</p>\
                         <p><small>If you did not request this, you can ignore this email.</small></p>",
                        greeting(user_name),
                        escape_html(event_title)
                    ),
                    &footer,
                );
                (subject, text, html)
            }

            Self::OtpResent {
                user_name,
                otp,
                valid_minutes,
            } => {
                let subject = "OTP Resent".to_string();
                let text = format!(
                    "Hi {user_name},\n\nYour OTP is {otp}.\nIt is valid for the next {valid_minutes} minutes."
                );
                let html = wrap_html(
                    BRAND,
                    "Here is your new OTP",
                    &format!(
                        "{}<p>Your OTP is <strong style=\"font-size:22px;letter-spacing:4px;\">{otp}</strong></p>\
                         <p>It is valid for the next {valid_minutes} minutes.</p>",
                        greeting(user_name)
                    ),
                    &footer,
                );
                (subject, text, html)
            }

            Self::TicketConfirmation {
                user_name,
                event_title,
                event_date,
                venue,
                ticket_type,
                quantity,
                registration_number,
            } => {
                let subject = format!("Your Ticket for {event_title}");
                let text = format!(
                    "Hi {user_name},\n\nYour registration for {event_title} has been confirmed.\n\n\
                     Date: {event_date}\nVenue: {venue}\nTicket Type: {ticket_type} x {quantity}\n\
                     Registration No: {registration_number}\n\n\
                     Your ticket (PDF with QR code) is attached. Please show it at the event entrance."
                );
                let html = wrap_html(
                    BRAND,
                    "Your ticket is confirmed",
                    &format!(
                        "{}<p>Your registration for <strong>{}</strong> has been \
                         <strong style=\"color:#16a34a;\">successfully confirmed</strong>.</p>{}\
                         <p style=\"margin-top:20px;\">Your ticket (PDF with QR code) is attached to this email. \
                         Please show it at the event entrance.</p>\
                         <p>We look forward to seeing you!</p>",
                        greeting(user_name),
                        escape_html(event_title),
                        details_table(&[
                            ("Date", event_date.to_string()),
                            ("Venue", venue.to_string()),
                            ("Ticket Type", format!("{ticket_type} x {quantity}")),
                            ("Registration No", registration_number.to_string()),
                        ])
                    ),
                    &footer,
                );
                (subject, text, html)
            }

            Self::Invoice {
                user_name,
                event_title,
                invoice_number,
                quantity,
                unit_price,
                total_amount,
            } => {
                let subject = format!("Invoice {invoice_number} for {event_title}");
                let text = format!(
                    "Hi {user_name},\n\nThank you for your payment for {event_title}.\n\n\
                     Ticket x {quantity} (Rs. {unit_price} per ticket)\nTotal Paid: Rs. {total_amount}\n\n\
                     Your invoice PDF is attached to this email for your records."
                );
                let html = wrap_html(
                    &format!("{BRAND} Invoice"),
                    "Payment Successful",
                    &format!(
                        "{}<p>Thank you for your payment for <strong>{}</strong>.</p>\
                         <table width=\"100%\" cellpadding=\"8\" cellspacing=\"0\" style=\"border-collapse:collapse;\">\
                         <tr style=\"background:#f3f4f6;\"><th align=\"left\">Description</th><th align=\"right\">Amount</th></tr>\
                         <tr><td>Ticket &times; {quantity}<br/><small>&#8377;{unit_price} per ticket</small></td>\
                         <td align=\"right\">&#8377;{total_amount}</td></tr>\
                         <tr><td style=\"border-top:1px solid #e5e7eb;\"><strong>Total Paid</strong></td>\
                         <td align=\"right\" style=\"border-top:1px solid #e5e7eb;\"><strong>&#8377;{total_amount}</strong></td></tr>\
                         </table>\
                         <p style=\"margin-top:20px;\">Your invoice PDF is attached to this email for your records.</p>",
                        greeting(user_name),
                        escape_html(event_title)
                    ),
                    "This is a system-generated invoice. No signature required.",
                );
                (subject, text, html)
            }

            Self::PaymentFailed {
                user_name,
                event_title,
                retry_url,
            } => {
                let subject = "Payment Failed - Retry Your Registration".to_string();
                let text = format!(
                    "Hi {user_name},\n\nYour payment for {event_title} did not go through.\n\
                     Your tickets are still reserved. Retry here: {retry_url}"
                );
                let html = wrap_html(
                    BRAND,
                    "Payment failed",
                    &format!(
                        "{}<p>Your payment for <strong>{}</strong> did not go through.</p>\
                         <p>Your tickets are still reserved.</p>{}",
                        greeting(user_name),
                        escape_html(event_title),
                        button(retry_url, "Retry Payment")
                    ),
                    &footer,
                );
                (subject, text, html)
            }

            Self::RegistrationReminder {
                user_name,
                event_title,
                reason,
                resume_url,
            } => {
                let subject = "Complete your Event Registration".to_string();
                let text = format!(
                    "Hi {user_name},\n\nYour registration for {event_title} is incomplete: {reason}.\n\
                     Continue here: {resume_url}\n\nYour registration will expire automatically."
                );
                let html = wrap_html(
                    BRAND,
                    "Your registration is waiting",
                    &format!(
                        "{}<p>Your registration for <strong>{}</strong> is incomplete.</p>\
                         <p><strong>Reason:</strong> {}</p>{}\
                         <p><small>Your registration will expire automatically.</small></p>",
                        greeting(user_name),
                        escape_html(event_title),
                        escape_html(reason),
                        button(resume_url, "Complete Registration")
                    ),
                    &footer,
                );
                (subject, text, html)
            }

            Self::PasswordReset { name, reset_url } => {
                let subject = format!("Password Reset Request - {BRAND}");
                let text = format!(
                    "Hi {name},\n\nWe received a request to reset your {BRAND} password.\n\
                     Reset it here (valid for 1 hour): {reset_url}\n\n\
                     If you did not request this, you can safely ignore this email."
                );
                let html = wrap_html(
                    BRAND,
                    "Password reset",
                    &format!(
                        "{}<p>We received a request to reset your password.</p>{}\
                         <p><small>The link is valid for 1 hour. If you did not request this, \
                         you can safely ignore this email.</small></p>",
                        greeting(name),
                        button(reset_url, "Reset Password")
                    ),
                    &footer,
                );
                (subject, text, html)
            }

            Self::PasswordChanged { name } => {
                let subject = format!("Password Changed - {BRAND}");
                let text = format!(
                    "Hi {name},\n\nThe password of your {BRAND} organizer account was just changed.\n\
                     If this wasn't you, reset your password immediately."
                );
                let html = wrap_html(
                    BRAND,
                    "Security notice",
                    &format!(
                        "{}<p>The password of your organizer account was just changed.</p>\
                         <p style=\"color:#dc2626;\">If this wasn't you, reset your password immediately.</p>",
                        greeting(name)
                    ),
                    &footer,
                );
                (subject, text, html)
            }

            Self::PasswordUpdated { name } => {
                let subject = format!("Password Updated - {BRAND}");
                let text = format!(
                    "Hi {name},\n\nYour {BRAND} password has been reset. You can now log in with your new password."
                );
                let html = wrap_html(
                    BRAND,
                    "Password updated",
                    &format!(
                        "{}<p>Your password has been reset. You can now log in with your new password.</p>",
                        greeting(name)
                    ),
                    &footer,
                );
                (subject, text, html)
            }

            Self::ContactAdmin {
                name,
                email,
                subject: topic,
                message,
                received_at,
            } => {
                reply_to = Some(email.to_string());
                let received = received_at
                    .with_timezone(&Kolkata)
                    .format("%d %b %Y, %I:%M %p IST")
                    .to_string();
                let reply_link = format!(
                    "mailto:{email}?subject={}",
                    urlencoding::encode(&format!("Re: {topic}"))
                );
                let subject = format!("New Contact Message: {topic}");
                let text = format!(
                    "New message from {name} <{email}>\nReceived: {received}\nSubject: {topic}\n\n{message}"
                );
                let html = wrap_html(
                    BRAND,
                    "New contact message",
                    &format!(
                        "{}<blockquote style=\"margin:16px 0;padding:12px 16px;border-left:4px solid #e5e7eb;background:#f9fafb;white-space:pre-wrap;\">{}</blockquote>{}",
                        details_table(&[
                            ("Name", name.to_string()),
                            ("Email", email.to_string()),
                            ("Subject", topic.to_string()),
                            ("Received", received),
                        ]),
                        escape_html(message),
                        button(&reply_link, "Reply")
                    ),
                    &footer,
                );
                (subject, text, html)
            }

            Self::ContactAcknowledgement {
                name,
                subject: topic,
                message,
            } => {
                let excerpt = preview(message, 200);
                let subject = format!("We received your message - {BRAND}");
                let text = format!(
                    "Hi {name},\n\nThanks for reaching out about \"{topic}\". Our team will get back to you soon.\n\n\
                     Your message:\n{excerpt}"
                );
                let html = wrap_html(
                    BRAND,
                    "Thanks for contacting us",
                    &format!(
                        "{}<p>Thanks for reaching out about <strong>{}</strong>. \
                         Our team will get back to you soon.</p>\
                         <blockquote style=\"margin:16px 0;padding:12px 16px;border-left:4px solid #e5e7eb;background:#f9fafb;\">{}</blockquote>",
                        greeting(name),
                        escape_html(topic),
                        escape_html(&excerpt)
                    ),
                    &footer,
                );
                (subject, text, html)
            }
        };

        RenderedEmail {
            subject,
            text,
            html,
            reply_to,
        }
    }
}
