use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tutorhub_core::types::{DbId, Timestamp};

use super::booking::EventBooking;
use super::event::Event;

/// A row from the `consult_slots` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ConsultSlot {
    pub id: DbId,
    pub tutor_id: DbId,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub is_booked: bool,
    pub event_id: Option<DbId>,
    pub booked_by: Option<DbId>,
    pub created_at: Timestamp,
}

/// An open slot joined with the tutor's name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AvailableSlot {
    pub id: DbId,
    pub tutor_id: DbId,
    pub tutor_name: Option<String>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateConsultSlot {
    /// Defaults to the caller. Only admins may create slots for another tutor.
    pub tutor_id: Option<DbId>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

/// Outcome of booking a consult slot.
#[derive(Debug)]
pub enum ConsultBookingOutcome {
    Booked {
        event: Event,
        booking: EventBooking,
    },
    SlotNotFound,
    AlreadyBooked,
    SlotInPast,
}

/// Outcome of deleting a consult slot.
#[derive(Debug, PartialEq, Eq)]
pub enum DeleteSlotOutcome {
    Deleted,
    NotFound,
    Booked,
}
