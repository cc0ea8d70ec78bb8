//! Manual calendar operations for admins.
//!
//! Routine syncing happens in the background from the event bus; these
//! endpoints exist for repair and setup.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tutorhub_core::types::DbId;
use tutorhub_events::CalendarSync;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CohortMeetLink {
    pub cohort_id: DbId,
    pub meet_link: String,
}

#[derive(Debug, Serialize)]
pub struct ReconcileResult {
    pub reconciled: Vec<DbId>,
}

fn calendar(state: &AppState) -> AppResult<&CalendarSync> {
    state
        .calendar
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("Calendar sync is not configured".into()))
}

/// POST /api/v1/cohorts/{id}/meet-link
///
/// Returns the cohort's stable meeting link, creating it on first call.
pub async fn ensure_cohort_meet_link(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(cohort_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let meet_link = calendar(&state)?
        .ensure_cohort_meet_link(cohort_id)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or(AppError::not_found("Cohort", cohort_id))?;

    tracing::info!(cohort_id, user_id = admin.user_id, "Cohort meeting link ensured");

    Ok(Json(DataResponse {
        data: CohortMeetLink {
            cohort_id,
            meet_link,
        },
    }))
}

/// POST /api/v1/calendar/reconcile
///
/// Re-creates upcoming calendar entries that no longer exist externally.
pub async fn reconcile(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let reconciled = calendar(&state)?
        .reconcile(Utc::now())
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?;

    tracing::info!(
        count = reconciled.len(),
        user_id = admin.user_id,
        "Calendar reconcile requested",
    );

    Ok(Json(DataResponse {
        data: ReconcileResult { reconciled },
    }))
}
