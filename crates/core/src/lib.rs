//! Domain rules for the tutoring platform.
//!
//! This crate has zero internal dependencies so the same rules can be used by
//! the repository layer, the HTTP handlers, and the background services.

pub mod attendance;
pub mod availability;
pub mod booking;
pub mod cohort;
pub mod customer_status;
pub mod error;
pub mod event_types;
pub mod principal;
pub mod reminders;
pub mod reschedule;
pub mod roles;
pub mod tokens;
pub mod types;
