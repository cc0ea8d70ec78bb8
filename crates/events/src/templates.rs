//! Notification email templates.
//!
//! Each template is a typed struct; [`EmailTemplate::render`] produces the
//! subject line and an HTML body. All interpolated values are HTML-escaped.

use chrono::{DateTime, Utc};
use serde::Serialize;

const BRAND: &str = "TutorHub";
const ACCENT: &str = "#4F46E5";

/// A rendered email ready for delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedEmail {
    pub subject: String,
    pub html: String,
}

// ---------------------------------------------------------------------------
// Template data
// ---------------------------------------------------------------------------

/// Sent when a student is placed in a cohort or books an event.
#[derive(Debug, Clone)]
pub struct BookingConfirmation {
    pub recipient_name: String,
    /// Cohort name for placements, event title for bookings.
    pub title: String,
    pub color: Option<String>,
    pub program_name: Option<String>,
    pub schedule: String,
    pub meet_link: Option<String>,
    pub dashboard_url: String,
}

#[derive(Debug, Clone)]
pub struct EventReminder {
    pub recipient_name: String,
    pub event_title: String,
    pub start_time: DateTime<Utc>,
    /// "tomorrow", "in 1 hour".
    pub time_until: String,
    pub meet_link: Option<String>,
    pub not_attending_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RescheduleUpdate {
    pub recipient_name: String,
    pub event_title: String,
    /// `approved` or `denied`.
    pub status: String,
    pub admin_notes: Option<String>,
    pub dashboard_url: String,
}

#[derive(Debug, Clone)]
pub struct PaymentReminder {
    pub recipient_name: String,
    pub student_name: String,
    pub days_remaining: i64,
    pub payment_url: String,
}

#[derive(Debug, Clone)]
pub enum EmailTemplate {
    BookingConfirmation(BookingConfirmation),
    EventReminder(EventReminder),
    RescheduleUpdate(RescheduleUpdate),
    PaymentReminder(PaymentReminder),
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

impl EmailTemplate {
    /// Stable template identifier, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            EmailTemplate::BookingConfirmation(_) => "booking_confirmation",
            EmailTemplate::EventReminder(_) => "event_reminder",
            EmailTemplate::RescheduleUpdate(_) => "reschedule_update",
            EmailTemplate::PaymentReminder(_) => "payment_reminder",
        }
    }

    pub fn render(&self) -> RenderedEmail {
        match self {
            EmailTemplate::BookingConfirmation(d) => render_booking_confirmation(d),
            EmailTemplate::EventReminder(d) => render_event_reminder(d),
            EmailTemplate::RescheduleUpdate(d) => render_reschedule_update(d),
            EmailTemplate::PaymentReminder(d) => render_payment_reminder(d),
        }
    }
}

fn render_booking_confirmation(d: &BookingConfirmation) -> RenderedEmail {
    let color = d.color.as_deref().unwrap_or(ACCENT);
    let mut body = format!(
        "<p>Hi {name},</p>\
         <p>You're booked in:</p>\
         <p><span style=\"display:inline-block;padding:4px 12px;border-radius:12px;\
         background:{color};color:#fff\">{title}</span></p>",
        name = escape(&d.recipient_name),
        color = escape(color),
        title = escape(&d.title),
    );
    if let Some(program) = &d.program_name {
        body.push_str(&format!("<p><strong>Program:</strong> {}</p>", escape(program)));
    }
    body.push_str(&format!(
        "<p><strong>Schedule:</strong> {}</p>",
        escape(&d.schedule)
    ));
    if let Some(link) = &d.meet_link {
        body.push_str(&format!(
            "<p><strong>Meet link:</strong> <a href=\"{l}\">{l}</a></p>",
            l = escape(link)
        ));
    }
    body.push_str(&button(&d.dashboard_url, "View your dashboard"));

    RenderedEmail {
        subject: format!("You're booked: {}", d.title),
        html: layout("Booking Confirmed", &body),
    }
}

fn render_event_reminder(d: &EventReminder) -> RenderedEmail {
    let mut body = format!(
        "<p>Hi {name},</p>\
         <p>Your class is coming up {until}:</p>\
         <h2 style=\"margin:0\">{title}</h2>\
         <p style=\"color:#64748b\">{date} at {time} (UTC)</p>",
        name = escape(&d.recipient_name),
        until = escape(&d.time_until),
        title = escape(&d.event_title),
        date = format_date(d.start_time),
        time = format_time(d.start_time),
    );
    if let Some(link) = &d.meet_link {
        body.push_str(&button(link, "Join meeting"));
    }
    if let Some(url) = &d.not_attending_url {
        body.push_str(&button(url, "I can't attend"));
    }

    RenderedEmail {
        subject: format!("Reminder: {} {}", d.event_title, d.time_until),
        html: layout("Class Reminder", &body),
    }
}

fn render_reschedule_update(d: &RescheduleUpdate) -> RenderedEmail {
    let mut body = format!(
        "<p>Hi {name},</p>\
         <p>Your reschedule request for <strong>{title}</strong> has been \
         <strong>{status}</strong>.</p>",
        name = escape(&d.recipient_name),
        title = escape(&d.event_title),
        status = escape(&d.status),
    );
    if let Some(notes) = d.admin_notes.as_deref().filter(|n| !n.trim().is_empty()) {
        body.push_str(&format!("<p><strong>Notes:</strong> {}</p>", escape(notes)));
    }
    body.push_str(&button(&d.dashboard_url, "View dashboard"));

    RenderedEmail {
        subject: format!("Reschedule request {}: {}", d.status, d.event_title),
        html: layout("Reschedule Request Update", &body),
    }
}

fn render_payment_reminder(d: &PaymentReminder) -> RenderedEmail {
    let days = match d.days_remaining {
        n if n <= 0 => "today".to_string(),
        1 => "within 1 day".to_string(),
        n => format!("within {n} days"),
    };
    let body = format!(
        "<p>Hi {name},</p>\
         <p>Payment is due {days}.</p>\
         <p>Please complete your payment to keep class access for {student}.</p>{button}",
        name = escape(&d.recipient_name),
        student = escape(&d.student_name),
        button = button(&d.payment_url, "Complete payment"),
    );

    RenderedEmail {
        subject: format!("Payment required for {}", d.student_name),
        html: layout("Payment Required", &body),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn layout(heading: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><body style=\"font-family:sans-serif;color:#1e293b\">\
         <div style=\"max-width:600px;margin:0 auto\">\
         <div style=\"background:{ACCENT};color:#fff;padding:24px\">\
         <h1 style=\"margin:0\">{heading}</h1></div>\
         <div style=\"padding:24px\">{body}</div>\
         <div style=\"padding:24px;color:#64748b;font-size:12px\"><p>{BRAND}</p></div>\
         </div></body></html>",
        heading = escape(heading),
    )
}

fn button(href: &str, label: &str) -> String {
    format!(
        "<p><a href=\"{}\" style=\"display:inline-block;padding:12px 24px;\
         background:{ACCENT};color:#fff;text-decoration:none;border-radius:6px\">{}</a></p>",
        escape(href),
        escape(label)
    )
}

/// "Tuesday, 10 February".
pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%A, %-d %B").to_string()
}

/// "9:05 AM".
pub fn format_time(at: DateTime<Utc>) -> String {
    at.format("%-I:%M %p").to_string()
}

/// Minimal HTML escaping for text and attribute values.
pub fn escape(input: &str) -> String {
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

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
