//! Event booking models and outcomes.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tutorhub_core::types::{DbId, Timestamp};

/// A row from the `event_bookings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct EventBooking {
    pub id: DbId,
    pub user_id: DbId,
    pub event_id: DbId,
    pub booked_at: Timestamp,
}

/// A booking joined with its event, for "my bookings" views.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BookedEvent {
    pub booking_id: DbId,
    pub booked_at: Timestamp,
    pub event_id: DbId,
    pub title: String,
    pub event_type: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub cohort_id: Option<DbId>,
    pub program_id: Option<DbId>,
    pub meet_link: Option<String>,
}

/// Optional target user for booking and cancellation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingTarget {
    pub user_id: Option<DbId>,
}

/// Outcome of an attempt to book an event.
#[derive(Debug)]
pub enum BookingOutcome {
    Booked(EventBooking),
    EventNotFound,
    AlreadyStarted,
    AlreadyBooked,
    Full { capacity: i32 },
}

/// Outcome of an attempt to cancel a booking.
#[derive(Debug)]
pub enum CancelOutcome {
    /// The booking was removed. For consults the event is gone too.
    Cancelled { event_type: String },
    EventNotFound,
    NotBooked,
    /// Inside the cancellation cutoff.
    TooLate,
}
