use serde::Serialize;
use sqlx::FromRow;
use tutorhub_core::types::{DbId, Timestamp};

/// A booking due for a reminder, with everything needed to send it.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReminderCandidate {
    pub event_id: DbId,
    pub user_id: DbId,
    pub email: String,
    pub full_name: Option<String>,
    pub title: String,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub event_meet_link: Option<String>,
    pub cohort_meet_link: Option<String>,
}

impl ReminderCandidate {
    /// Cohort events use the cohort's stable link; others their own.
    pub fn meet_link(&self) -> Option<&str> {
        self.cohort_meet_link
            .as_deref()
            .or(self.event_meet_link.as_deref())
    }
}
