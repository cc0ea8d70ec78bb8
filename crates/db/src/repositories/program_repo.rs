//! Repository for the `programs` table.

use sqlx::PgPool;
use tutorhub_core::types::DbId;

use crate::models::program::{CreateProgram, Program, UpdateProgram};

const COLUMNS: &str = "id, name, description, created_at, updated_at";

pub struct ProgramRepo;

impl ProgramRepo {
    pub async fn create(pool: &PgPool, input: &CreateProgram) -> Result<Program, sqlx::Error> {
        let query = format!(
            "INSERT INTO programs (name, description)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Program>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Program>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM programs WHERE id = $1");
        sqlx::query_as::<_, Program>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all programs ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Program>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM programs ORDER BY name ASC");
        sqlx::query_as::<_, Program>(&query).fetch_all(pool).await
    }

    /// Update a program. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProgram,
    ) -> Result<Option<Program>, sqlx::Error> {
        let query = format!(
            "UPDATE programs SET
                name = COALESCE($2, name),
                description = COALESCE($3, description)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Program>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(pool)
            .await
    }

    /// Delete a program. Cohorts, events, bookings and attendance cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM programs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
