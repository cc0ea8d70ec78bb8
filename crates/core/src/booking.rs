//! Booking ledger rules: cancellation cutoff, capacity checks, consult naming.

use chrono::Duration;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Bookings cannot be cancelled within this many hours of the event start.
pub const CANCELLATION_CUTOFF_HOURS: i64 = 24;

/// Consult slots are only offered this many days ahead.
pub const CONSULT_BOOKING_HORIZON_DAYS: i64 = 28;

/// Fallback tutor name used in consult event titles.
pub const DEFAULT_TUTOR_NAME: &str = "Tutor";

/// Check the cancellation window for an event starting at `start_time`.
///
/// Cancelling is rejected when strictly less than
/// [`CANCELLATION_CUTOFF_HOURS`] remain before the start. Exactly 24 hours
/// out is still allowed.
pub fn check_cancellation_window(start_time: Timestamp, now: Timestamp) -> Result<(), CoreError> {
    let remaining = start_time - now;
    if remaining < Duration::hours(CANCELLATION_CUTOFF_HOURS) {
        return Err(CoreError::PolicyViolation(format!(
            "Bookings cannot be cancelled within {CANCELLATION_CUTOFF_HOURS} hours of the event start"
        )));
    }
    Ok(())
}

/// Check whether one more booking fits under an optional capacity.
pub fn check_capacity(capacity: Option<i32>, current_bookings: i64) -> Result<(), CoreError> {
    match capacity {
        Some(cap) if current_bookings >= i64::from(cap) => Err(CoreError::CapacityExceeded(
            format!("Event is full ({current_bookings}/{cap} booked)"),
        )),
        _ => Ok(()),
    }
}

/// Reject bookings for events that already started.
pub fn check_bookable(start_time: Timestamp, now: Timestamp) -> Result<(), CoreError> {
    if start_time <= now {
        return Err(CoreError::validation("Cannot book an event that has already started"));
    }
    Ok(())
}

/// Title of the consult event derived from a booked slot.
pub fn consult_title(tutor_name: Option<&str>) -> String {
    let name = tutor_name
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(DEFAULT_TUTOR_NAME);
    format!("Consult with {name}")
}

/// End of the window in which consult slots are listed as available.
pub fn consult_horizon(now: Timestamp) -> Timestamp {
    now + Duration::days(CONSULT_BOOKING_HORIZON_DAYS)
}
