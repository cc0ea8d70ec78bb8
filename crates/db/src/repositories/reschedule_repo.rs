//! Repository for the `reschedule_requests` table.

use sqlx::PgPool;
use tutorhub_core::reschedule::RESCHEDULE_PENDING;
use tutorhub_core::types::DbId;

use crate::models::reschedule::{
    CreateRescheduleRequest, RescheduleRequest, RescheduleRequestDetail, SubmitOutcome,
};

const COLUMNS: &str =
    "id, user_id, event_id, notes, status, requested_at, handled_by, handled_at, admin_notes";

const DETAIL_SELECT: &str = "SELECT r.id, r.user_id,
        p.full_name AS user_name, p.email AS user_email,
        r.event_id, e.title AS event_title, e.start_time AS event_start_time,
        r.notes, r.status, r.requested_at, r.handled_by, r.handled_at, r.admin_notes
     FROM reschedule_requests r
     JOIN profiles p ON p.id = r.user_id
     JOIN events e ON e.id = r.event_id";

pub struct RescheduleRepo;

impl RescheduleRepo {
    /// Submit a new pending request.
    ///
    /// The requester must hold a booking for the event and have no other
    /// pending request for it. The partial index
    /// `uq_reschedule_requests_pending` backs the duplicate check.
    pub async fn submit(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateRescheduleRequest,
    ) -> Result<SubmitOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let (event_exists, booked, pending): (bool, bool, bool) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM events WHERE id = $2),
                    EXISTS(SELECT 1 FROM event_bookings WHERE user_id = $1 AND event_id = $2),
                    EXISTS(SELECT 1 FROM reschedule_requests
                           WHERE user_id = $1 AND event_id = $2 AND status = 'pending')",
        )
        .bind(user_id)
        .bind(input.event_id)
        .fetch_one(&mut *tx)
        .await?;

        if !event_exists {
            return Ok(SubmitOutcome::EventNotFound);
        }
        if !booked {
            return Ok(SubmitOutcome::NotBooked);
        }
        if pending {
            return Ok(SubmitOutcome::DuplicatePending);
        }

        let query = format!(
            "INSERT INTO reschedule_requests (user_id, event_id, notes, status)
             VALUES ($1, $2, $3, '{RESCHEDULE_PENDING}')
             RETURNING {COLUMNS}"
        );
        let request = sqlx::query_as::<_, RescheduleRequest>(&query)
            .bind(user_id)
            .bind(input.event_id)
            .bind(&input.notes)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(SubmitOutcome::Created(request))
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<RescheduleRequest>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM reschedule_requests WHERE id = $1");
        sqlx::query_as::<_, RescheduleRequest>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete a request while it is still pending.
    pub async fn delete_pending(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM reschedule_requests WHERE id = $1 AND status = 'pending'")
                .bind(id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a decision on a pending request.
    ///
    /// Returns `None` when the request does not exist or is no longer pending.
    pub async fn decide(
        pool: &PgPool,
        id: DbId,
        status: &str,
        handled_by: DbId,
        admin_notes: Option<&str>,
    ) -> Result<Option<RescheduleRequest>, sqlx::Error> {
        let query = format!(
            "UPDATE reschedule_requests SET
                status = $2,
                handled_by = $3,
                handled_at = NOW(),
                admin_notes = $4
             WHERE id = $1 AND status = 'pending'
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, RescheduleRequest>(&query)
            .bind(id)
            .bind(status)
            .bind(handled_by)
            .bind(admin_notes)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<RescheduleRequestDetail>, sqlx::Error> {
        let query = format!("{DETAIL_SELECT} WHERE r.user_id = $1 ORDER BY r.requested_at DESC");
        sqlx::query_as::<_, RescheduleRequestDetail>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// All requests, optionally filtered by status, oldest first.
    pub async fn list(
        pool: &PgPool,
        status: Option<&str>,
    ) -> Result<Vec<RescheduleRequestDetail>, sqlx::Error> {
        let query = format!(
            "{DETAIL_SELECT} WHERE ($1::TEXT IS NULL OR r.status = $1) ORDER BY r.requested_at ASC"
        );
        sqlx::query_as::<_, RescheduleRequestDetail>(&query)
            .bind(status)
            .fetch_all(pool)
            .await
    }
}
