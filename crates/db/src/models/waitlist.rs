//! Cohort waitlist models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tutorhub_core::types::{DbId, Timestamp};

use super::cohort::CohortStudent;

/// A row from the `cohort_waitlist` table. `program_id = None` means any program.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WaitlistEntry {
    pub id: DbId,
    pub user_id: DbId,
    pub program_id: Option<DbId>,
    pub notes: Option<String>,
    pub waitlisted_at: Timestamp,
}

/// A waitlist entry joined with the user's profile and program name.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WaitlistEntryDetail {
    pub id: DbId,
    pub user_id: DbId,
    pub email: String,
    pub full_name: Option<String>,
    pub status: String,
    pub program_id: Option<DbId>,
    pub program_name: Option<String>,
    pub notes: Option<String>,
    pub waitlisted_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWaitlistEntry {
    /// Defaults to the caller.
    pub user_id: Option<DbId>,
    pub program_id: Option<DbId>,
    pub notes: Option<String>,
}

/// Request body for placing a waitlisted student into a cohort.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceStudent {
    pub student_id: DbId,
    pub cohort_id: DbId,
}

/// Outcome of a placement.
#[derive(Debug)]
pub enum PlacementOutcome {
    Placed {
        enrollment: CohortStudent,
        status_changed: bool,
    },
    EntryNotFound,
    StudentMismatch,
    CohortNotFound,
    AlreadyEnrolled,
}
