use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tutorhub_core::types::{DbId, Timestamp};

/// A row from the `programs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Program {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProgram {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProgram {
    pub name: Option<String>,
    pub description: Option<String>,
}
