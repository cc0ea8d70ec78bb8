//! Repository for the `not_attending_tokens` table.

use sqlx::PgPool;
use tutorhub_core::attendance::ATTENDANCE_NOT_ATTENDING;
use tutorhub_core::tokens::is_expired;
use tutorhub_core::types::{DbId, Timestamp};
use uuid::Uuid;

use super::attendance_repo::upsert_query;
use crate::models::attendance::Attendance;
use crate::models::token::{NotAttendingToken, RedeemOutcome};

const COLUMNS: &str = "id, user_id, event_id, expires_at, created_at";

pub struct TokenRepo;

impl TokenRepo {
    /// Issue a fresh token for (user, event).
    pub async fn issue(
        pool: &PgPool,
        user_id: DbId,
        event_id: DbId,
        expires_at: Timestamp,
    ) -> Result<NotAttendingToken, sqlx::Error> {
        let query = format!(
            "INSERT INTO not_attending_tokens (id, user_id, event_id, expires_at)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, NotAttendingToken>(&query)
            .bind(Uuid::new_v4())
            .bind(user_id)
            .bind(event_id)
            .bind(expires_at)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<NotAttendingToken>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM not_attending_tokens WHERE id = $1");
        sqlx::query_as::<_, NotAttendingToken>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Consume a token.
    ///
    /// The row is deleted whether or not it has expired. A live token marks
    /// the user `not_attending`, recorded as marked by the user themselves.
    pub async fn redeem(
        pool: &PgPool,
        id: Uuid,
        now: Timestamp,
    ) -> Result<RedeemOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let token: Option<(DbId, DbId, Timestamp)> = sqlx::query_as(
            "DELETE FROM not_attending_tokens WHERE id = $1
             RETURNING user_id, event_id, expires_at",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((user_id, event_id, expires_at)) = token else {
            return Ok(RedeemOutcome::NotFound);
        };

        if is_expired(expires_at, now) {
            tx.commit().await?;
            return Ok(RedeemOutcome::Expired);
        }

        let attendance = sqlx::query_as::<_, Attendance>(&upsert_query())
            .bind(user_id)
            .bind(event_id)
            .bind(ATTENDANCE_NOT_ATTENDING)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(RedeemOutcome::Redeemed(attendance))
    }

    /// Delete tokens past their expiry. Returns the number removed.
    pub async fn delete_expired(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM not_attending_tokens WHERE expires_at < $1")
            .bind(now)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
