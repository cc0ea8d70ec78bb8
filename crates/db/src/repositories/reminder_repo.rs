//! Queries backing the reminder scheduler.

use sqlx::PgPool;
use tutorhub_core::reminders::ReminderKind;
use tutorhub_core::types::{DbId, Timestamp};

use crate::models::reminder::ReminderCandidate;

pub struct ReminderRepo;

impl ReminderRepo {
    /// Bookings whose event starts in `[from, to)`, that have not had this
    /// reminder yet, and whose user has not opted out of it.
    pub async fn list_due(
        pool: &PgPool,
        kind: ReminderKind,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<ReminderCandidate>, sqlx::Error> {
        let pref_column = match kind {
            ReminderKind::DayBefore => "reminder_24h",
            ReminderKind::HourBefore => "reminder_1h",
        };
        let query = format!(
            "SELECT e.id AS event_id, p.id AS user_id, p.email, p.full_name, e.title,
                    e.start_time, e.end_time, e.meet_link AS event_meet_link,
                    c.stable_meet_link AS cohort_meet_link
             FROM event_bookings b
             JOIN events e ON e.id = b.event_id
             JOIN profiles p ON p.id = b.user_id
             LEFT JOIN cohorts c ON c.id = e.cohort_id
             LEFT JOIN notification_preferences np ON np.user_id = p.id
             WHERE e.start_time >= $1 AND e.start_time < $2
               AND COALESCE(np.email_reminders, TRUE)
               AND COALESCE(np.{pref_column}, TRUE)
               AND NOT EXISTS (
                   SELECT 1 FROM event_reminders r
                   WHERE r.event_id = e.id AND r.user_id = p.id AND r.reminder_type = $3)
             ORDER BY e.start_time ASC"
        );
        sqlx::query_as::<_, ReminderCandidate>(&query)
            .bind(from)
            .bind(to)
            .bind(kind.as_str())
            .fetch_all(pool)
            .await
    }

    /// Claim a reminder before sending it.
    ///
    /// Returns `false` when another tick already claimed it.
    pub async fn mark_sent(
        pool: &PgPool,
        event_id: DbId,
        user_id: DbId,
        kind: ReminderKind,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO event_reminders (event_id, user_id, reminder_type)
             VALUES ($1, $2, $3)
             ON CONFLICT ON CONSTRAINT uq_event_reminders DO NOTHING",
        )
        .bind(event_id)
        .bind(user_id)
        .bind(kind.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
