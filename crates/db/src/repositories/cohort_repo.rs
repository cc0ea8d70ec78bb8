//! Repository for `cohorts`, `cohort_tutors`, and `cohort_students`.

use sqlx::PgPool;
use tutorhub_core::cohort::{color_for_index, DEFAULT_COHORT_CAPACITY};
use tutorhub_core::types::DbId;

use crate::models::cohort::{
    Cohort, CohortStudent, CohortTutor, CohortWithCounts, CreateCohort, EnrolledStudent,
    UpdateCohort,
};

const COLUMNS: &str =
    "id, program_id, name, color, capacity, stable_meet_link, created_at, updated_at";

pub struct CohortRepo;

impl CohortRepo {
    /// Insert a cohort, filling in the default capacity and palette colour.
    pub async fn create(pool: &PgPool, input: &CreateCohort) -> Result<Cohort, sqlx::Error> {
        let color = match &input.color {
            Some(c) => c.clone(),
            None => {
                let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM cohorts")
                    .fetch_one(pool)
                    .await?;
                color_for_index(count).to_string()
            }
        };

        let query = format!(
            "INSERT INTO cohorts (program_id, name, color, capacity, stable_meet_link)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Cohort>(&query)
            .bind(input.program_id)
            .bind(&input.name)
            .bind(color)
            .bind(input.capacity.unwrap_or(DEFAULT_COHORT_CAPACITY))
            .bind(&input.stable_meet_link)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Cohort>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cohorts WHERE id = $1");
        sqlx::query_as::<_, Cohort>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List cohorts with enrollment and tutor counts.
    pub async fn list(
        pool: &PgPool,
        program_id: Option<DbId>,
    ) -> Result<Vec<CohortWithCounts>, sqlx::Error> {
        sqlx::query_as::<_, CohortWithCounts>(
            "SELECT c.id, c.program_id, p.name AS program_name, c.name, c.color, c.capacity,
                    c.stable_meet_link,
                    (SELECT COUNT(*) FROM cohort_students cs WHERE cs.cohort_id = c.id)
                        AS enrolled_count,
                    (SELECT COUNT(*) FROM cohort_tutors ct WHERE ct.cohort_id = c.id)
                        AS tutor_count,
                    c.created_at
             FROM cohorts c
             JOIN programs p ON p.id = c.program_id
             WHERE ($1::BIGINT IS NULL OR c.program_id = $1)
             ORDER BY p.name ASC, c.name ASC",
        )
        .bind(program_id)
        .fetch_all(pool)
        .await
    }

    /// Cohorts the tutor is assigned to.
    pub async fn list_for_tutor(pool: &PgPool, tutor_id: DbId) -> Result<Vec<Cohort>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cohorts
             WHERE id IN (SELECT cohort_id FROM cohort_tutors WHERE tutor_id = $1)
             ORDER BY name ASC"
        );
        sqlx::query_as::<_, Cohort>(&query)
            .bind(tutor_id)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCohort,
    ) -> Result<Option<Cohort>, sqlx::Error> {
        let query = format!(
            "UPDATE cohorts SET
                name = COALESCE($2, name),
                color = COALESCE($3, color),
                capacity = COALESCE($4, capacity),
                stable_meet_link = COALESCE($5, stable_meet_link)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Cohort>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.color)
            .bind(input.capacity)
            .bind(&input.stable_meet_link)
            .fetch_optional(pool)
            .await
    }

    /// Store the cohort's stable meeting link.
    pub async fn set_stable_meet_link(
        pool: &PgPool,
        id: DbId,
        link: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE cohorts SET stable_meet_link = $2 WHERE id = $1")
            .bind(id)
            .bind(link)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cohorts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Tutors
    // -----------------------------------------------------------------------

    /// Assign a tutor. A duplicate assignment violates `uq_cohort_tutors`.
    pub async fn assign_tutor(
        pool: &PgPool,
        cohort_id: DbId,
        tutor_id: DbId,
    ) -> Result<CohortTutor, sqlx::Error> {
        sqlx::query_as::<_, CohortTutor>(
            "INSERT INTO cohort_tutors (cohort_id, tutor_id)
             VALUES ($1, $2)
             RETURNING cohort_id, tutor_id, created_at",
        )
        .bind(cohort_id)
        .bind(tutor_id)
        .fetch_one(pool)
        .await
    }

    pub async fn remove_tutor(
        pool: &PgPool,
        cohort_id: DbId,
        tutor_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM cohort_tutors WHERE cohort_id = $1 AND tutor_id = $2")
                .bind(cohort_id)
                .bind(tutor_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn is_tutor_assigned(
        pool: &PgPool,
        cohort_id: DbId,
        tutor_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM cohort_tutors WHERE cohort_id = $1 AND tutor_id = $2)",
        )
        .bind(cohort_id)
        .bind(tutor_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    // -----------------------------------------------------------------------
    // Students
    // -----------------------------------------------------------------------

    /// Enroll a student. Capacity is not checked.
    pub async fn enroll_student(
        pool: &PgPool,
        cohort_id: DbId,
        student_id: DbId,
    ) -> Result<CohortStudent, sqlx::Error> {
        sqlx::query_as::<_, CohortStudent>(
            "INSERT INTO cohort_students (cohort_id, student_id)
             VALUES ($1, $2)
             RETURNING cohort_id, student_id, enrolled_at",
        )
        .bind(cohort_id)
        .bind(student_id)
        .fetch_one(pool)
        .await
    }

    pub async fn unenroll_student(
        pool: &PgPool,
        cohort_id: DbId,
        student_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM cohort_students WHERE cohort_id = $1 AND student_id = $2")
                .bind(cohort_id)
                .bind(student_id)
                .execute(pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_students(
        pool: &PgPool,
        cohort_id: DbId,
    ) -> Result<Vec<EnrolledStudent>, sqlx::Error> {
        sqlx::query_as::<_, EnrolledStudent>(
            "SELECT cs.student_id, p.email, p.full_name, p.status, cs.enrolled_at
             FROM cohort_students cs
             JOIN profiles p ON p.id = cs.student_id
             WHERE cs.cohort_id = $1
             ORDER BY p.full_name ASC NULLS LAST, p.email ASC",
        )
        .bind(cohort_id)
        .fetch_all(pool)
        .await
    }

    pub async fn count_students(pool: &PgPool, cohort_id: DbId) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM cohort_students WHERE cohort_id = $1")
                .bind(cohort_id)
                .fetch_one(pool)
                .await?;
        Ok(count)
    }
}
