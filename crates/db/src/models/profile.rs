//! Profile and status history models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tutorhub_core::types::{DbId, Timestamp};

/// A row from the `profiles` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Profile {
    pub id: DbId,
    pub email: String,
    pub full_name: Option<String>,
    pub timezone: String,
    pub role: String,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a profile.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProfile {
    pub email: String,
    pub full_name: Option<String>,
    pub timezone: Option<String>,
    pub role: String,
    pub status: Option<String>,
}

/// Request body for the bulk status endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkStatusUpdate {
    pub user_ids: Vec<DbId>,
    pub status: String,
    pub reason: Option<String>,
}

/// A row from the `user_status_history` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct UserStatusHistory {
    pub id: DbId,
    pub user_id: DbId,
    pub old_status: Option<String>,
    pub new_status: String,
    pub changed_by: Option<DbId>,
    pub reason: Option<String>,
    pub changed_at: Timestamp,
}
