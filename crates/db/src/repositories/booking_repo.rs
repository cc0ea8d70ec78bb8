//! Repository for the `event_bookings` table.
//!
//! Booking and cancellation lock the event row before reading counts, so
//! concurrent bookings for the last seat are serialized.

use sqlx::PgPool;
use tutorhub_core::booking::{check_bookable, check_cancellation_window, check_capacity};
use tutorhub_core::event_types::{EVENT_TYPE_APPLIED, EVENT_TYPE_CONSULT};
use tutorhub_core::types::{DbId, Timestamp};

use crate::models::booking::{BookedEvent, BookingOutcome, CancelOutcome, EventBooking};

const COLUMNS: &str = "id, user_id, event_id, booked_at";

pub struct BookingRepo;

impl BookingRepo {
    /// Book `user_id` onto an event and seed an unmarked attendance row.
    pub async fn book(
        pool: &PgPool,
        event_id: DbId,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<BookingOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let event: Option<(Timestamp, Option<i32>)> =
            sqlx::query_as("SELECT start_time, capacity FROM events WHERE id = $1 FOR UPDATE")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((start_time, capacity)) = event else {
            return Ok(BookingOutcome::EventNotFound);
        };

        if check_bookable(start_time, now).is_err() {
            return Ok(BookingOutcome::AlreadyStarted);
        }

        let (already_booked, booked_count): (bool, i64) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM event_bookings WHERE event_id = $1 AND user_id = $2),
                    (SELECT COUNT(*) FROM event_bookings WHERE event_id = $1)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if already_booked {
            return Ok(BookingOutcome::AlreadyBooked);
        }
        if check_capacity(capacity, booked_count).is_err() {
            return Ok(BookingOutcome::Full {
                capacity: capacity.unwrap_or_default(),
            });
        }

        let query = format!(
            "INSERT INTO event_bookings (user_id, event_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        let booking = sqlx::query_as::<_, EventBooking>(&query)
            .bind(user_id)
            .bind(event_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO attendance (user_id, event_id)
             VALUES ($1, $2)
             ON CONFLICT ON CONSTRAINT uq_attendance_user_event DO NOTHING",
        )
        .bind(user_id)
        .bind(event_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(BookingOutcome::Booked(booking))
    }

    /// Cancel a booking, honouring the cancellation cutoff.
    ///
    /// Applied events also lose the attendance row. Consult events are
    /// deleted outright and their slot is freed.
    pub async fn cancel(
        pool: &PgPool,
        event_id: DbId,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<CancelOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let event: Option<(Timestamp, String)> =
            sqlx::query_as("SELECT start_time, event_type FROM events WHERE id = $1 FOR UPDATE")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((start_time, event_type)) = event else {
            return Ok(CancelOutcome::EventNotFound);
        };

        let (booked,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM event_bookings WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;

        if !booked {
            return Ok(CancelOutcome::NotBooked);
        }
        if check_cancellation_window(start_time, now).is_err() {
            return Ok(CancelOutcome::TooLate);
        }

        sqlx::query("DELETE FROM event_bookings WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        match event_type.as_str() {
            EVENT_TYPE_APPLIED => {
                sqlx::query("DELETE FROM attendance WHERE event_id = $1 AND user_id = $2")
                    .bind(event_id)
                    .bind(user_id)
                    .execute(&mut *tx)
                    .await?;
            }
            EVENT_TYPE_CONSULT => {
                sqlx::query(
                    "UPDATE consult_slots SET is_booked = FALSE, event_id = NULL, booked_by = NULL
                     WHERE event_id = $1",
                )
                .bind(event_id)
                .execute(&mut *tx)
                .await?;
                sqlx::query("DELETE FROM events WHERE id = $1")
                    .bind(event_id)
                    .execute(&mut *tx)
                    .await?;
            }
            _ => {}
        }

        tx.commit().await?;
        Ok(CancelOutcome::Cancelled { event_type })
    }

    pub async fn find(
        pool: &PgPool,
        event_id: DbId,
        user_id: DbId,
    ) -> Result<Option<EventBooking>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM event_bookings WHERE event_id = $1 AND user_id = $2"
        );
        sqlx::query_as::<_, EventBooking>(&query)
            .bind(event_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_event(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<EventBooking>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM event_bookings WHERE event_id = $1 ORDER BY booked_at ASC"
        );
        sqlx::query_as::<_, EventBooking>(&query)
            .bind(event_id)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_event(pool: &PgPool, event_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM event_bookings WHERE event_id = $1")
                .bind(event_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }

    /// A user's bookings for events ending after `from`, soonest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        from: Timestamp,
    ) -> Result<Vec<BookedEvent>, sqlx::Error> {
        sqlx::query_as::<_, BookedEvent>(
            "SELECT b.id AS booking_id, b.booked_at, e.id AS event_id, e.title, e.event_type,
                    e.start_time, e.end_time, e.cohort_id, e.program_id,
                    COALESCE(c.stable_meet_link, e.meet_link) AS meet_link
             FROM event_bookings b
             JOIN events e ON e.id = b.event_id
             LEFT JOIN cohorts c ON c.id = e.cohort_id
             WHERE b.user_id = $1 AND e.end_time > $2
             ORDER BY e.start_time ASC",
        )
        .bind(user_id)
        .bind(from)
        .fetch_all(pool)
        .await
    }

    /// Emails of everyone booked onto an event.
    pub async fn list_attendee_emails(
        pool: &PgPool,
        event_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT p.email FROM event_bookings b
             JOIN profiles p ON p.id = b.user_id
             WHERE b.event_id = $1
             ORDER BY p.email ASC",
        )
        .bind(event_id)
        .fetch_all(pool)
        .await?;
        Ok(rows.into_iter().map(|(email,)| email).collect())
    }
}
