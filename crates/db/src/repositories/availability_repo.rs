//! Repository for the `user_availability` table.

use sqlx::types::Json;
use sqlx::PgPool;
use tutorhub_core::availability::AvailabilityGrid;
use tutorhub_core::types::DbId;

use crate::models::availability::UserAvailability;

pub struct AvailabilityRepo;

impl AvailabilityRepo {
    pub async fn find_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<UserAvailability>, sqlx::Error> {
        sqlx::query_as::<_, UserAvailability>(
            "SELECT user_id, availability, updated_at FROM user_availability WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// Replace the user's availability document.
    pub async fn upsert(
        pool: &PgPool,
        user_id: DbId,
        availability: &AvailabilityGrid,
    ) -> Result<UserAvailability, sqlx::Error> {
        sqlx::query_as::<_, UserAvailability>(
            "INSERT INTO user_availability (user_id, availability, updated_at)
             VALUES ($1, $2, NOW())
             ON CONFLICT (user_id) DO UPDATE SET
                availability = EXCLUDED.availability,
                updated_at = NOW()
             RETURNING user_id, availability, updated_at",
        )
        .bind(user_id)
        .bind(Json(availability))
        .fetch_one(pool)
        .await
    }
}
