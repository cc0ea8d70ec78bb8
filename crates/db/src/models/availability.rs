use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;
use tutorhub_core::availability::AvailabilityGrid;
use tutorhub_core::types::{DbId, Timestamp};

/// A row from the `user_availability` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserAvailability {
    pub user_id: DbId,
    pub availability: Json<AvailabilityGrid>,
    pub updated_at: Timestamp,
}
