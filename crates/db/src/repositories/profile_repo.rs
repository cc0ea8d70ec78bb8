//! Repository for the `profiles` and `user_status_history` tables.

use sqlx::PgPool;
use tutorhub_core::customer_status::STATUS_PENDING_CUSTOMER;
use tutorhub_core::types::{DbId, Timestamp};

use crate::models::profile::{CreateProfile, Profile, UserStatusHistory};

const COLUMNS: &str = "id, email, full_name, timezone, role, status, created_at, updated_at";

const HISTORY_COLUMNS: &str = "id, user_id, old_status, new_status, changed_by, reason, changed_at";

pub struct ProfileRepo;

impl ProfileRepo {
    pub async fn create(pool: &PgPool, input: &CreateProfile) -> Result<Profile, sqlx::Error> {
        let query = format!(
            "INSERT INTO profiles (email, full_name, timezone, role, status)
             VALUES ($1, $2, COALESCE($3, 'UTC'), $4, COALESCE($5, '{STATUS_PENDING_CUSTOMER}'))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(&input.email)
            .bind(&input.full_name)
            .bind(&input.timezone)
            .bind(&input.role)
            .bind(&input.status)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Profile>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM profiles WHERE id = $1");
        sqlx::query_as::<_, Profile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List profiles, optionally filtered by role and/or status.
    pub async fn list(
        pool: &PgPool,
        role: Option<&str>,
        status: Option<&str>,
    ) -> Result<Vec<Profile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM profiles
             WHERE ($1::TEXT IS NULL OR role = $1)
               AND ($2::TEXT IS NULL OR status = $2)
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(role)
            .bind(status)
            .fetch_all(pool)
            .await
    }

    /// Set the status of every listed profile and append one history row each.
    ///
    /// Runs in a single transaction. Returns the number of profiles updated;
    /// `0` means none of the ids exist and nothing was written.
    pub async fn bulk_update_status(
        pool: &PgPool,
        user_ids: &[DbId],
        new_status: &str,
        reason: Option<&str>,
        changed_by: DbId,
    ) -> Result<u64, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let current: Vec<(DbId, String)> = sqlx::query_as(
            "SELECT id, status FROM profiles WHERE id = ANY($1) ORDER BY id FOR UPDATE",
        )
        .bind(user_ids)
        .fetch_all(&mut *tx)
        .await?;

        if current.is_empty() {
            tx.rollback().await?;
            return Ok(0);
        }

        let ids: Vec<DbId> = current.iter().map(|(id, _)| *id).collect();
        let old_statuses: Vec<String> = current.into_iter().map(|(_, s)| s).collect();

        sqlx::query("UPDATE profiles SET status = $2 WHERE id = ANY($1)")
            .bind(&ids)
            .bind(new_status)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO user_status_history (user_id, old_status, new_status, changed_by, reason)
             SELECT u.id, u.old_status, $3, $4, $5
             FROM UNNEST($1::BIGINT[], $2::TEXT[]) AS u(id, old_status)",
        )
        .bind(&ids)
        .bind(&old_statuses)
        .bind(new_status)
        .bind(changed_by)
        .bind(reason)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(ids.len() as u64)
    }

    /// Pending customers created before `cutoff`, oldest first.
    pub async fn list_expired_pending(
        pool: &PgPool,
        cutoff: Timestamp,
    ) -> Result<Vec<Profile>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM profiles
             WHERE status = '{STATUS_PENDING_CUSTOMER}' AND created_at < $1
             ORDER BY created_at ASC"
        );
        sqlx::query_as::<_, Profile>(&query)
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }

    /// Status history, most recent first, optionally for one user.
    pub async fn list_status_history(
        pool: &PgPool,
        user_id: Option<DbId>,
        limit: i64,
    ) -> Result<Vec<UserStatusHistory>, sqlx::Error> {
        let query = format!(
            "SELECT {HISTORY_COLUMNS} FROM user_status_history
             WHERE ($1::BIGINT IS NULL OR user_id = $1)
             ORDER BY changed_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, UserStatusHistory>(&query)
            .bind(user_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
