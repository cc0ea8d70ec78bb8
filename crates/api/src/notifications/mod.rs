//! Email notifications driven by the event bus.
//!
//! The [`EmailDispatcher`] subscribes to the bus and emails the affected user
//! for the events that have a template. Only spawned when SMTP is configured.

pub mod dispatcher;

pub use dispatcher::EmailDispatcher;
