//! Repository for the `events` table.

use sqlx::types::Json;
use sqlx::PgPool;
use tutorhub_core::event_types::{EVENT_TYPE_CONSULT, EVENT_TYPE_DROP_IN};
use tutorhub_core::types::{DbId, Timestamp};

use crate::models::event::{CreatedEvent, CreateEvent, Event, EventFilter};

pub(crate) const EVENT_COLUMNS: &str = "id, cohort_id, program_id, title, description, \
    start_time, end_time, event_type, is_required, capacity, recurrence_pattern, \
    recurrence_end_date, external_calendar_id, meet_link, created_by, created_at, updated_at";

pub struct EventRepo;

impl EventRepo {
    /// Insert an event. For drop-in events every distinct student enrolled in
    /// any cohort of the program is booked with an unmarked attendance row,
    /// in the same transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateEvent,
        created_by: DbId,
    ) -> Result<CreatedEvent, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO events
                (cohort_id, program_id, title, description, start_time, end_time, event_type,
                 is_required, capacity, recurrence_pattern, recurrence_end_date, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {EVENT_COLUMNS}"
        );
        let event = sqlx::query_as::<_, Event>(&query)
            .bind(input.cohort_id)
            .bind(input.program_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(&input.event_type)
            .bind(input.is_required.unwrap_or(false))
            .bind(input.capacity)
            .bind(input.recurrence_pattern.as_ref().map(Json))
            .bind(input.recurrence_end_date)
            .bind(created_by)
            .fetch_one(&mut *tx)
            .await?;

        let mut enrolled_count = 0;
        if event.event_type == EVENT_TYPE_DROP_IN {
            if let Some(program_id) = event.program_id {
                let booked = sqlx::query(
                    "INSERT INTO event_bookings (user_id, event_id)
                     SELECT DISTINCT cs.student_id, $1
                     FROM cohort_students cs
                     JOIN cohorts c ON c.id = cs.cohort_id
                     WHERE c.program_id = $2
                     ON CONFLICT ON CONSTRAINT uq_event_bookings_user_event DO NOTHING",
                )
                .bind(event.id)
                .bind(program_id)
                .execute(&mut *tx)
                .await?;

                sqlx::query(
                    "INSERT INTO attendance (user_id, event_id)
                     SELECT user_id, event_id FROM event_bookings WHERE event_id = $1
                     ON CONFLICT ON CONSTRAINT uq_attendance_user_event DO NOTHING",
                )
                .bind(event.id)
                .execute(&mut *tx)
                .await?;

                enrolled_count = booked.rows_affected();
            }
        }

        tx.commit().await?;

        if enrolled_count > 0 {
            tracing::debug!(event_id = event.id, enrolled_count, "Drop-in students auto-enrolled");
        }

        Ok(CreatedEvent {
            event,
            enrolled_count,
        })
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List events matching the filter, ordered by start time.
    pub async fn list(pool: &PgPool, filter: &EventFilter) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE ($1::BIGINT IS NULL OR cohort_id = $1)
               AND ($2::BIGINT IS NULL OR program_id = $2)
               AND ($3::TEXT IS NULL OR event_type = $3)
               AND ($4::TIMESTAMPTZ IS NULL OR start_time >= $4)
               AND ($5::TIMESTAMPTZ IS NULL OR start_time < $5)
             ORDER BY start_time ASC"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(filter.cohort_id)
            .bind(filter.program_id)
            .bind(&filter.event_type)
            .bind(filter.from)
            .bind(filter.to)
            .fetch_all(pool)
            .await
    }

    /// Events a tutor teaches: their cohorts' events, drop-ins of those
    /// cohorts' programs, and consults booked from their slots.
    pub async fn list_for_tutor(
        pool: &PgPool,
        tutor_id: DbId,
        from: Option<Timestamp>,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE (cohort_id IN (SELECT cohort_id FROM cohort_tutors WHERE tutor_id = $1)
                 OR program_id IN (
                     SELECT c.program_id FROM cohorts c
                     JOIN cohort_tutors ct ON ct.cohort_id = c.id
                     WHERE ct.tutor_id = $1)
                 OR id IN (SELECT event_id FROM consult_slots
                           WHERE tutor_id = $1 AND event_id IS NOT NULL))
               AND ($2::TIMESTAMPTZ IS NULL OR start_time >= $2)
             ORDER BY start_time ASC"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(tutor_id)
            .bind(from)
            .fetch_all(pool)
            .await
    }

    /// Whether the tutor may manage the event: assigned to its cohort, or
    /// owner of the consult slot it was booked from.
    pub async fn is_tutor_for_event(
        pool: &PgPool,
        event_id: DbId,
        tutor_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let (allowed,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(
                SELECT 1 FROM events e
                JOIN cohort_tutors ct ON ct.cohort_id = e.cohort_id
                WHERE e.id = $1 AND ct.tutor_id = $2
             ) OR EXISTS(
                SELECT 1 FROM consult_slots WHERE event_id = $1 AND tutor_id = $2
             )",
        )
        .bind(event_id)
        .bind(tutor_id)
        .fetch_one(pool)
        .await?;
        Ok(allowed)
    }

    /// Move an event. Bookings and attendance are left untouched.
    ///
    /// A consult event carries its slot with it so the two rows never
    /// disagree on the time.
    pub async fn update_time(
        pool: &PgPool,
        id: DbId,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Result<Option<Event>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE events SET start_time = $2, end_time = $3
             WHERE id = $1
             RETURNING {EVENT_COLUMNS}"
        );
        let event = sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(start_time)
            .bind(end_time)
            .fetch_optional(&mut *tx)
            .await?;

        if event.as_ref().is_some_and(|e| e.event_type == EVENT_TYPE_CONSULT) {
            sqlx::query(
                "UPDATE consult_slots SET start_time = $2, end_time = $3 WHERE event_id = $1",
            )
            .bind(id)
            .bind(start_time)
            .bind(end_time)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(event)
    }

    /// Delete an event, freeing any consult slot it was booked from.
    /// Bookings, attendance, tokens and reschedule requests cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query(
            "UPDATE consult_slots SET is_booked = FALSE, event_id = NULL, booked_by = NULL
             WHERE event_id = $1",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Calendar sync
    // -----------------------------------------------------------------------

    /// Record the external calendar id (and meet link, when one was made).
    pub async fn set_calendar_sync(
        pool: &PgPool,
        id: DbId,
        external_calendar_id: Option<&str>,
        meet_link: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE events SET
                external_calendar_id = $2,
                meet_link = COALESCE($3, meet_link)
             WHERE id = $1",
        )
        .bind(id)
        .bind(external_calendar_id)
        .bind(meet_link)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Events starting at or after `from` that have been pushed to the
    /// external calendar.
    pub async fn list_synced(pool: &PgPool, from: Timestamp) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE external_calendar_id IS NOT NULL AND start_time >= $1
             ORDER BY start_time ASC"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(from)
            .fetch_all(pool)
            .await
    }
}
