//! Event bus and notification infrastructure for the tutoring platform.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DomainEvent`]: the envelope handlers publish after a mutation.
//! - [`templates`]: notification emails rendered to subject + HTML.
//! - [`delivery`]: SMTP email delivery.
//! - [`ReminderScheduler`]: periodic 24h / 1h event reminders.
//! - [`CalendarSync`]: best-effort push of events to an external calendar.

pub mod bus;
pub mod calendar;
pub mod delivery;
pub mod reminders;
pub mod templates;

pub use bus::{DomainEvent, EventBus};
pub use calendar::{CalendarProvider, CalendarSync, HttpCalendarProvider};
pub use delivery::email::{EmailConfig, EmailDelivery};
pub use reminders::ReminderScheduler;
