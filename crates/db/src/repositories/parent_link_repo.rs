//! Repository for the `parent_student_links` table.

use sqlx::{PgPool, Postgres, Transaction};
use tutorhub_core::customer_status::STATUS_CUSTOMER;
use tutorhub_core::roles::{ROLE_PARENT, ROLE_STUDENT};
use tutorhub_core::types::DbId;

use crate::models::parent_link::{
    CreateFamily, Family, FamilyMember, LinkedStudent, ParentStudentLink,
};
use crate::models::profile::Profile;

const COLUMNS: &str = "id, parent_id, student_id, created_at";

const PROFILE_COLUMNS: &str =
    "id, email, full_name, timezone, role, status, created_at, updated_at";

pub struct ParentLinkRepo;

impl ParentLinkRepo {
    /// Link a student to a parent. A duplicate link violates
    /// `uq_parent_student_links`.
    pub async fn create(
        pool: &PgPool,
        parent_id: DbId,
        student_id: DbId,
    ) -> Result<ParentStudentLink, sqlx::Error> {
        let query = format!(
            "INSERT INTO parent_student_links (parent_id, student_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ParentStudentLink>(&query)
            .bind(parent_id)
            .bind(student_id)
            .fetch_one(pool)
            .await
    }

    pub async fn delete(
        pool: &PgPool,
        parent_id: DbId,
        student_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM parent_student_links WHERE parent_id = $1 AND student_id = $2",
        )
        .bind(parent_id)
        .bind(student_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn list_students(
        pool: &PgPool,
        parent_id: DbId,
    ) -> Result<Vec<LinkedStudent>, sqlx::Error> {
        Self::list_students_for_parents(pool, &[parent_id]).await
    }

    /// Linked students for a batch of parents, ordered by parent then link age.
    pub async fn list_students_for_parents(
        pool: &PgPool,
        parent_ids: &[DbId],
    ) -> Result<Vec<LinkedStudent>, sqlx::Error> {
        sqlx::query_as::<_, LinkedStudent>(
            "SELECT l.parent_id, l.student_id, p.email, p.full_name, p.status,
                    l.created_at AS linked_at
             FROM parent_student_links l
             JOIN profiles p ON p.id = l.student_id
             WHERE l.parent_id = ANY($1)
             ORDER BY l.parent_id, l.created_at, l.id",
        )
        .bind(parent_ids)
        .fetch_all(pool)
        .await
    }

    /// Create a parent profile, a student profile and the link between them
    /// in one transaction.
    pub async fn create_family(pool: &PgPool, input: &CreateFamily) -> Result<Family, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let status = input.status.as_deref().unwrap_or(STATUS_CUSTOMER);
        let timezone = input.timezone.as_deref();
        let parent = insert_member(&mut tx, &input.parent, ROLE_PARENT, timezone, status).await?;
        let student = insert_member(&mut tx, &input.student, ROLE_STUDENT, timezone, status).await?;

        let query = format!(
            "INSERT INTO parent_student_links (parent_id, student_id)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        let link = sqlx::query_as::<_, ParentStudentLink>(&query)
            .bind(parent.id)
            .bind(student.id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Family {
            parent,
            student,
            link,
        })
    }
}

async fn insert_member(
    tx: &mut Transaction<'_, Postgres>,
    member: &FamilyMember,
    role: &str,
    timezone: Option<&str>,
    status: &str,
) -> Result<Profile, sqlx::Error> {
    let query = format!(
        "INSERT INTO profiles (email, full_name, timezone, role, status)
         VALUES ($1, $2, COALESCE($3, 'UTC'), $4, $5)
         RETURNING {PROFILE_COLUMNS}"
    );
    sqlx::query_as::<_, Profile>(&query)
        .bind(&member.email)
        .bind(&member.full_name)
        .bind(timezone)
        .bind(role)
        .bind(status)
        .fetch_one(&mut **tx)
        .await
}
