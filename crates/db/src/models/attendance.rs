//! Attendance models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tutorhub_core::attendance::AttendanceStats;
use tutorhub_core::types::{DbId, Timestamp};

/// A row from the `attendance` table. `status = None` means unmarked.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Attendance {
    pub id: DbId,
    pub user_id: DbId,
    pub event_id: DbId,
    pub status: Option<String>,
    pub marked_by: Option<DbId>,
    pub marked_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// An attendance row joined with the attendee's profile.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendanceWithUser {
    pub id: DbId,
    pub user_id: DbId,
    pub email: String,
    pub full_name: Option<String>,
    pub status: Option<String>,
    pub marked_by: Option<DbId>,
    pub marked_at: Option<Timestamp>,
}

/// An attendance row joined with its event.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AttendanceWithEvent {
    pub id: DbId,
    pub event_id: DbId,
    pub title: String,
    pub event_type: String,
    pub start_time: Timestamp,
    pub status: Option<String>,
    pub marked_at: Option<Timestamp>,
}

/// Request body for marking attendance by (user, event).
#[derive(Debug, Clone, Deserialize)]
pub struct MarkAttendance {
    /// Defaults to the caller.
    pub user_id: Option<DbId>,
    pub status: Option<String>,
}

/// Request body for marking an existing attendance row.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAttendanceStatus {
    pub status: Option<String>,
}

/// Rows plus aggregate counts for one event.
#[derive(Debug, Clone, Serialize)]
pub struct EventAttendance {
    pub event_id: DbId,
    pub stats: AttendanceStats,
    pub rows: Vec<AttendanceWithUser>,
}

/// Rows plus aggregate counts for one user.
#[derive(Debug, Clone, Serialize)]
pub struct UserAttendance {
    pub user_id: DbId,
    pub stats: AttendanceStats,
    /// See [`AttendanceStats::attendance_rate`].
    pub attendance_rate: i64,
    pub rows: Vec<AttendanceWithEvent>,
}

impl UserAttendance {
    pub fn new(user_id: DbId, rows: Vec<AttendanceWithEvent>) -> Self {
        let stats = AttendanceStats::from_statuses(rows.iter().map(|r| r.status.as_deref()));
        Self {
            user_id,
            stats,
            attendance_rate: stats.attendance_rate(),
            rows,
        }
    }
}
