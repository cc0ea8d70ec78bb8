//! Shared query parameter types for API handlers.

use serde::Deserialize;
use tutorhub_core::types::DbId;

/// `?user_id=` for endpoints where staff may act on behalf of someone else.
#[derive(Debug, Default, Deserialize)]
pub struct OnBehalfParams {
    pub user_id: Option<DbId>,
}

/// `?days=` for the pending-customer expiry endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ExpiryParams {
    pub days: Option<i64>,
}

/// `?user_id=&limit=` for status history.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    pub user_id: Option<DbId>,
    pub limit: Option<i64>,
}

/// `?role=&status=` for listing profiles.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileFilterParams {
    pub role: Option<String>,
    pub status: Option<String>,
}

/// `?program_id=` for listing cohorts.
#[derive(Debug, Default, Deserialize)]
pub struct ProgramFilterParams {
    pub program_id: Option<DbId>,
}

/// `?token=` on the not-attending link.
#[derive(Debug, Default, Deserialize)]
pub struct TokenParams {
    pub token: Option<String>,
}
