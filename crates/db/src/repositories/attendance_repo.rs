//! Repository for the `attendance` table.

use sqlx::PgPool;
use tutorhub_core::types::DbId;

use crate::models::attendance::{Attendance, AttendanceWithEvent, AttendanceWithUser};

pub(crate) const COLUMNS: &str = "id, user_id, event_id, status, marked_by, marked_at, created_at";

/// Insert-or-update keyed on (user, event), stamping marker and time.
pub(crate) fn upsert_query() -> String {
    format!(
        "INSERT INTO attendance (user_id, event_id, status, marked_by, marked_at)
         VALUES ($1, $2, $3, $4, NOW())
         ON CONFLICT ON CONSTRAINT uq_attendance_user_event DO UPDATE SET
            status = EXCLUDED.status,
            marked_by = EXCLUDED.marked_by,
            marked_at = EXCLUDED.marked_at
         RETURNING {COLUMNS}"
    )
}

pub struct AttendanceRepo;

impl AttendanceRepo {
    /// Set the attendance status for (user, event), creating the row if needed.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        event_id: DbId,
        status: Option<&str>,
        marked_by: DbId,
    ) -> Result<Attendance, sqlx::Error> {
        sqlx::query_as::<_, Attendance>(&upsert_query())
            .bind(user_id)
            .bind(event_id)
            .bind(status)
            .bind(marked_by)
            .fetch_one(pool)
            .await
    }

    /// Set the status of an existing row. Returns `None` if it does not exist.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: Option<&str>,
        marked_by: DbId,
    ) -> Result<Option<Attendance>, sqlx::Error> {
        let query = format!(
            "UPDATE attendance SET status = $2, marked_by = $3, marked_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Attendance>(&query)
            .bind(id)
            .bind(status)
            .bind(marked_by)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Attendance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM attendance WHERE id = $1");
        sqlx::query_as::<_, Attendance>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        event_id: DbId,
    ) -> Result<Option<Attendance>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM attendance WHERE user_id = $1 AND event_id = $2");
        sqlx::query_as::<_, Attendance>(&query)
            .bind(user_id)
            .bind(event_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<AttendanceWithUser>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceWithUser>(
            "SELECT a.id, a.user_id, p.email, p.full_name, a.status, a.marked_by, a.marked_at
             FROM attendance a
             JOIN profiles p ON p.id = a.user_id
             WHERE a.event_id = $1
             ORDER BY p.full_name ASC NULLS LAST, p.email ASC",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await
    }

    /// A user's attendance history, most recent event first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<AttendanceWithEvent>, sqlx::Error> {
        sqlx::query_as::<_, AttendanceWithEvent>(
            "SELECT a.id, a.event_id, e.title, e.event_type, e.start_time, a.status, a.marked_at
             FROM attendance a
             JOIN events e ON e.id = a.event_id
             WHERE a.user_id = $1
             ORDER BY e.start_time DESC",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
