//! Reschedule request models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tutorhub_core::types::{DbId, Timestamp};

/// A row from the `reschedule_requests` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RescheduleRequest {
    pub id: DbId,
    pub user_id: DbId,
    pub event_id: DbId,
    pub notes: Option<String>,
    pub status: String,
    pub requested_at: Timestamp,
    pub handled_by: Option<DbId>,
    pub handled_at: Option<Timestamp>,
    pub admin_notes: Option<String>,
}

/// A request joined with the requester and event, for staff review.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RescheduleRequestDetail {
    pub id: DbId,
    pub user_id: DbId,
    pub user_name: Option<String>,
    pub user_email: String,
    pub event_id: DbId,
    pub event_title: String,
    pub event_start_time: Timestamp,
    pub notes: Option<String>,
    pub status: String,
    pub requested_at: Timestamp,
    pub handled_by: Option<DbId>,
    pub handled_at: Option<Timestamp>,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRescheduleRequest {
    pub event_id: DbId,
    pub notes: Option<String>,
}

/// Request body for approving or denying a request.
#[derive(Debug, Clone, Deserialize)]
pub struct RescheduleDecision {
    pub status: String,
    pub admin_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RescheduleListParams {
    pub status: Option<String>,
}

/// Outcome of submitting a request.
#[derive(Debug)]
pub enum SubmitOutcome {
    Created(RescheduleRequest),
    EventNotFound,
    NotBooked,
    DuplicatePending,
}
