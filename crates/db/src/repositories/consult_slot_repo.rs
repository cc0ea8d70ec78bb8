//! Repository for the `consult_slots` table.

use sqlx::PgPool;
use tutorhub_core::booking::consult_title;
use tutorhub_core::event_types::{CONSULT_CAPACITY, EVENT_TYPE_CONSULT};
use tutorhub_core::types::{DbId, Timestamp};

use super::event_repo::EVENT_COLUMNS;
use crate::models::booking::EventBooking;
use crate::models::consult_slot::{
    AvailableSlot, ConsultBookingOutcome, ConsultSlot, DeleteSlotOutcome,
};
use crate::models::event::Event;

const COLUMNS: &str =
    "id, tutor_id, start_time, end_time, is_booked, event_id, booked_by, created_at";

pub struct ConsultSlotRepo;

impl ConsultSlotRepo {
    pub async fn create(
        pool: &PgPool,
        tutor_id: DbId,
        start_time: Timestamp,
        end_time: Timestamp,
    ) -> Result<ConsultSlot, sqlx::Error> {
        let query = format!(
            "INSERT INTO consult_slots (tutor_id, start_time, end_time)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ConsultSlot>(&query)
            .bind(tutor_id)
            .bind(start_time)
            .bind(end_time)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ConsultSlot>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM consult_slots WHERE id = $1");
        sqlx::query_as::<_, ConsultSlot>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Unbooked slots starting in `[from, until)`, soonest first.
    pub async fn list_available(
        pool: &PgPool,
        from: Timestamp,
        until: Timestamp,
    ) -> Result<Vec<AvailableSlot>, sqlx::Error> {
        sqlx::query_as::<_, AvailableSlot>(
            "SELECT s.id, s.tutor_id, p.full_name AS tutor_name, s.start_time, s.end_time
             FROM consult_slots s
             JOIN profiles p ON p.id = s.tutor_id
             WHERE NOT s.is_booked AND s.start_time >= $1 AND s.start_time < $2
             ORDER BY s.start_time ASC",
        )
        .bind(from)
        .bind(until)
        .fetch_all(pool)
        .await
    }

    /// All slots belonging to one tutor, newest first.
    pub async fn list_for_tutor(
        pool: &PgPool,
        tutor_id: DbId,
    ) -> Result<Vec<ConsultSlot>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM consult_slots WHERE tutor_id = $1 ORDER BY start_time DESC"
        );
        sqlx::query_as::<_, ConsultSlot>(&query)
            .bind(tutor_id)
            .fetch_all(pool)
            .await
    }

    /// Delete a slot that has not been booked.
    pub async fn delete_unbooked(
        pool: &PgPool,
        id: DbId,
    ) -> Result<DeleteSlotOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let slot: Option<(bool,)> =
            sqlx::query_as("SELECT is_booked FROM consult_slots WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        match slot {
            None => Ok(DeleteSlotOutcome::NotFound),
            Some((true,)) => Ok(DeleteSlotOutcome::Booked),
            Some((false,)) => {
                sqlx::query("DELETE FROM consult_slots WHERE id = $1")
                    .bind(id)
                    .execute(&mut *tx)
                    .await?;
                tx.commit().await?;
                Ok(DeleteSlotOutcome::Deleted)
            }
        }
    }

    /// Book a consult slot for `user_id`.
    ///
    /// Locks the slot row, creates a capacity-1 consult event spanning the
    /// slot, books the user with an unmarked attendance row, and marks the
    /// slot booked. All or nothing.
    pub async fn book(
        pool: &PgPool,
        slot_id: DbId,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<ConsultBookingOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let slot: Option<(Timestamp, Timestamp, bool, Option<String>)> = sqlx::query_as(
            "SELECT s.start_time, s.end_time, s.is_booked, p.full_name
             FROM consult_slots s
             JOIN profiles p ON p.id = s.tutor_id
             WHERE s.id = $1
             FOR UPDATE OF s",
        )
        .bind(slot_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((start_time, end_time, is_booked, tutor_name)) = slot else {
            return Ok(ConsultBookingOutcome::SlotNotFound);
        };
        if is_booked {
            return Ok(ConsultBookingOutcome::AlreadyBooked);
        }
        if start_time <= now {
            return Ok(ConsultBookingOutcome::SlotInPast);
        }

        let query = format!(
            "INSERT INTO events
                 (title, start_time, end_time, event_type, is_required, capacity, created_by)
             VALUES ($1, $2, $3, '{EVENT_TYPE_CONSULT}', FALSE, $4, $5)
             RETURNING {EVENT_COLUMNS}"
        );
        let event = sqlx::query_as::<_, Event>(&query)
            .bind(consult_title(tutor_name.as_deref()))
            .bind(start_time)
            .bind(end_time)
            .bind(CONSULT_CAPACITY)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        let booking = sqlx::query_as::<_, EventBooking>(
            "INSERT INTO event_bookings (user_id, event_id)
             VALUES ($1, $2)
             RETURNING id, user_id, event_id, booked_at",
        )
        .bind(user_id)
        .bind(event.id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO attendance (user_id, event_id) VALUES ($1, $2)")
            .bind(user_id)
            .bind(event.id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE consult_slots SET is_booked = TRUE, event_id = $2, booked_by = $3
             WHERE id = $1",
        )
        .bind(slot_id)
        .bind(event.id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(ConsultBookingOutcome::Booked { event, booking })
    }
}
