use serde::Serialize;
use sqlx::FromRow;
use tutorhub_core::types::{DbId, Timestamp};
use uuid::Uuid;

use super::attendance::Attendance;

/// A row from the `not_attending_tokens` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct NotAttendingToken {
    pub id: Uuid,
    pub user_id: DbId,
    pub event_id: DbId,
    pub expires_at: Timestamp,
    pub created_at: Timestamp,
}

/// Outcome of redeeming a token. The token is consumed in every case
/// except `NotFound`.
#[derive(Debug)]
pub enum RedeemOutcome {
    Redeemed(Attendance),
    NotFound,
    Expired,
}
