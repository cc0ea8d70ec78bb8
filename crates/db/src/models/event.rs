//! Event models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use tutorhub_core::event_types::RecurrencePattern;
use tutorhub_core::types::{DbId, Timestamp};

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub cohort_id: Option<DbId>,
    pub program_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub event_type: String,
    pub is_required: bool,
    pub capacity: Option<i32>,
    pub recurrence_pattern: Option<Json<RecurrencePattern>>,
    pub recurrence_end_date: Option<NaiveDate>,
    pub external_calendar_id: Option<String>,
    pub meet_link: Option<String>,
    pub created_by: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an event.
///
/// Handlers apply the per-type rules before the insert, so by the time this
/// reaches the repository `is_required` and `capacity` hold final values.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateEvent {
    pub cohort_id: Option<DbId>,
    pub program_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub event_type: String,
    pub is_required: Option<bool>,
    pub capacity: Option<i32>,
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub recurrence_end_date: Option<NaiveDate>,
}

/// Request body for moving an event.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEventTime {
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

/// Result of creating an event, including drop-in auto-enrollment.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedEvent {
    #[serde(flatten)]
    pub event: Event,
    /// Students booked automatically (drop-in events only).
    pub enrolled_count: u64,
}

/// Filters for listing events. All optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EventFilter {
    pub cohort_id: Option<DbId>,
    pub program_id: Option<DbId>,
    pub event_type: Option<String>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
}
