//! Event type constants and the ownership/capacity rules per type.
//!
//! | Type      | Owner            | Capacity          | Required      |
//! |-----------|------------------|-------------------|---------------|
//! | content   | cohort           | not allowed       | always true   |
//! | applied   | cohort           | optional          | caller choice |
//! | drop-in   | program          | not allowed       | caller choice |
//! | consult   | neither          | forced to 1       | caller choice |

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

pub const EVENT_TYPE_CONTENT: &str = "content";
pub const EVENT_TYPE_APPLIED: &str = "applied";
pub const EVENT_TYPE_DROP_IN: &str = "drop-in";
pub const EVENT_TYPE_CONSULT: &str = "consult";

/// All valid event type values.
pub const VALID_EVENT_TYPES: &[&str] = &[
    EVENT_TYPE_CONTENT,
    EVENT_TYPE_APPLIED,
    EVENT_TYPE_DROP_IN,
    EVENT_TYPE_CONSULT,
];

/// Consult events represent a single 1:1 booking.
pub const CONSULT_CAPACITY: i32 = 1;

/// Maximum length of an event title.
pub const MAX_TITLE_LEN: usize = 200;

/// Validate that an event type string is one of the accepted values.
pub fn validate_event_type(event_type: &str) -> Result<(), String> {
    if VALID_EVENT_TYPES.contains(&event_type) {
        Ok(())
    } else {
        Err(format!(
            "Invalid event_type '{event_type}'. Must be one of: {}",
            VALID_EVENT_TYPES.join(", ")
        ))
    }
}

/// Reject empty or inverted time ranges.
pub fn validate_time_range(start: Timestamp, end: Timestamp) -> Result<(), CoreError> {
    if start >= end {
        return Err(CoreError::validation("start_time must be before end_time"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Recurrence metadata
// ---------------------------------------------------------------------------

/// How often a recurring event repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceFrequency {
    Weekly,
    Biweekly,
    Monthly,
}

/// Descriptive recurrence metadata stored alongside an event.
///
/// No occurrences are generated from this; each occurrence is its own event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurrencePattern {
    /// Lowercase weekday name, e.g. `"monday"`.
    pub day: String,
    /// Local start time as `HH:MM`.
    pub time: String,
    pub freq: RecurrenceFrequency,
}

const WEEKDAYS: &[&str] = &[
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

impl RecurrencePattern {
    pub fn validate(&self) -> Result<(), CoreError> {
        if !WEEKDAYS.contains(&self.day.as_str()) {
            return Err(CoreError::Validation(format!(
                "Invalid recurrence day '{}'",
                self.day
            )));
        }
        if chrono::NaiveTime::parse_from_str(&self.time, "%H:%M").is_err() {
            return Err(CoreError::Validation(format!(
                "Invalid recurrence time '{}', expected HH:MM",
                self.time
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Event normalization
// ---------------------------------------------------------------------------

/// Raw input for a new event, before type rules are applied.
#[derive(Debug, Clone)]
pub struct EventDraft<'a> {
    pub event_type: &'a str,
    pub cohort_id: Option<DbId>,
    pub program_id: Option<DbId>,
    pub title: &'a str,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub is_required: Option<bool>,
    pub capacity: Option<i32>,
    pub recurrence_pattern: Option<&'a RecurrencePattern>,
}

/// The fields of an event after type rules have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedEvent {
    pub cohort_id: Option<DbId>,
    pub program_id: Option<DbId>,
    pub is_required: bool,
    pub capacity: Option<i32>,
}

/// Apply the per-type ownership, capacity, and required-flag rules.
pub fn normalize_event(draft: &EventDraft<'_>) -> Result<NormalizedEvent, CoreError> {
    validate_event_type(draft.event_type).map_err(CoreError::Validation)?;

    let title = draft.title.trim();
    if title.is_empty() {
        return Err(CoreError::validation("title is required"));
    }
    if title.len() > MAX_TITLE_LEN {
        return Err(CoreError::Validation(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }

    validate_time_range(draft.start_time, draft.end_time)?;

    if let Some(pattern) = draft.recurrence_pattern {
        pattern.validate()?;
    }

    if let Some(capacity) = draft.capacity {
        if capacity <= 0 {
            return Err(CoreError::validation("capacity must be a positive integer"));
        }
    }

    match draft.event_type {
        EVENT_TYPE_CONTENT | EVENT_TYPE_APPLIED => {
            let cohort_id = draft.cohort_id.ok_or_else(|| {
                CoreError::Validation(format!("{} events require a cohort_id", draft.event_type))
            })?;
            if draft.program_id.is_some() {
                return Err(CoreError::Validation(format!(
                    "{} events belong to a cohort and must not set program_id",
                    draft.event_type
                )));
            }
            let is_content = draft.event_type == EVENT_TYPE_CONTENT;
            if is_content && draft.capacity.is_some() {
                return Err(CoreError::validation(
                    "capacity is only allowed for applied and consult events",
                ));
            }
            Ok(NormalizedEvent {
                cohort_id: Some(cohort_id),
                program_id: None,
                is_required: is_content || draft.is_required.unwrap_or(false),
                capacity: draft.capacity,
            })
        }
        EVENT_TYPE_DROP_IN => {
            let program_id = draft
                .program_id
                .ok_or_else(|| CoreError::validation("drop-in events require a program_id"))?;
            if draft.cohort_id.is_some() {
                return Err(CoreError::validation(
                    "drop-in events span a program and must not set cohort_id",
                ));
            }
            if draft.capacity.is_some() {
                return Err(CoreError::validation(
                    "capacity is only allowed for applied and consult events",
                ));
            }
            Ok(NormalizedEvent {
                cohort_id: None,
                program_id: Some(program_id),
                is_required: draft.is_required.unwrap_or(false),
                capacity: None,
            })
        }
        _ => {
            if draft.cohort_id.is_some() || draft.program_id.is_some() {
                return Err(CoreError::validation(
                    "consult events must not set cohort_id or program_id",
                ));
            }
            Ok(NormalizedEvent {
                cohort_id: None,
                program_id: None,
                is_required: draft.is_required.unwrap_or(false),
                capacity: Some(CONSULT_CAPACITY),
            })
        }
    }
}
