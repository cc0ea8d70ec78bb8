//! Repository for the `cohort_waitlist` table.

use sqlx::PgPool;
use tutorhub_core::customer_status::STATUS_CUSTOMER;
use tutorhub_core::types::DbId;

use crate::models::cohort::CohortStudent;
use crate::models::waitlist::{PlacementOutcome, WaitlistEntry, WaitlistEntryDetail};

const COLUMNS: &str = "id, user_id, program_id, notes, waitlisted_at";

/// Reason recorded in status history when a placement promotes a student.
pub const PLACEMENT_REASON: &str = "Placed from waitlist";

pub struct WaitlistRepo;

impl WaitlistRepo {
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        program_id: Option<DbId>,
        notes: Option<&str>,
    ) -> Result<WaitlistEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO cohort_waitlist (user_id, program_id, notes)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WaitlistEntry>(&query)
            .bind(user_id)
            .bind(program_id)
            .bind(notes)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WaitlistEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cohort_waitlist WHERE id = $1");
        sqlx::query_as::<_, WaitlistEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the waitlist, oldest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<WaitlistEntryDetail>, sqlx::Error> {
        sqlx::query_as::<_, WaitlistEntryDetail>(
            "SELECT w.id, w.user_id, p.email, p.full_name, p.status,
                    w.program_id, pr.name AS program_name, w.notes, w.waitlisted_at
             FROM cohort_waitlist w
             JOIN profiles p ON p.id = w.user_id
             LEFT JOIN programs pr ON pr.id = w.program_id
             ORDER BY w.waitlisted_at ASC, w.id ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Remove an entry with no other side effects.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cohort_waitlist WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Place a waitlisted student into a cohort.
    ///
    /// In one transaction: enroll the student (capacity is not checked),
    /// delete the waitlist entry, and promote the student to `customer`,
    /// recording a history row when the status actually changes.
    pub async fn place(
        pool: &PgPool,
        waitlist_id: DbId,
        student_id: DbId,
        cohort_id: DbId,
        changed_by: DbId,
    ) -> Result<PlacementOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let entry: Option<(DbId,)> =
            sqlx::query_as("SELECT user_id FROM cohort_waitlist WHERE id = $1 FOR UPDATE")
                .bind(waitlist_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((entry_user_id,)) = entry else {
            return Ok(PlacementOutcome::EntryNotFound);
        };
        if entry_user_id != student_id {
            return Ok(PlacementOutcome::StudentMismatch);
        }

        let (cohort_exists, already_enrolled): (bool, bool) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM cohorts WHERE id = $1),
                    EXISTS(SELECT 1 FROM cohort_students WHERE cohort_id = $1 AND student_id = $2)",
        )
        .bind(cohort_id)
        .bind(student_id)
        .fetch_one(&mut *tx)
        .await?;

        if !cohort_exists {
            return Ok(PlacementOutcome::CohortNotFound);
        }
        if already_enrolled {
            return Ok(PlacementOutcome::AlreadyEnrolled);
        }

        let enrollment = sqlx::query_as::<_, CohortStudent>(
            "INSERT INTO cohort_students (cohort_id, student_id)
             VALUES ($1, $2)
             RETURNING cohort_id, student_id, enrolled_at",
        )
        .bind(cohort_id)
        .bind(student_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM cohort_waitlist WHERE id = $1")
            .bind(waitlist_id)
            .execute(&mut *tx)
            .await?;

        let (old_status,): (String,) =
            sqlx::query_as("SELECT status FROM profiles WHERE id = $1 FOR UPDATE")
                .bind(student_id)
                .fetch_one(&mut *tx)
                .await?;

        let status_changed = old_status != STATUS_CUSTOMER;
        if status_changed {
            sqlx::query("UPDATE profiles SET status = $2 WHERE id = $1")
                .bind(student_id)
                .bind(STATUS_CUSTOMER)
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                "INSERT INTO user_status_history
                     (user_id, old_status, new_status, changed_by, reason)
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(student_id)
            .bind(&old_status)
            .bind(STATUS_CUSTOMER)
            .bind(changed_by)
            .bind(PLACEMENT_REASON)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(PlacementOutcome::Placed {
            enrollment,
            status_changed,
        })
    }
}
