//! Tutor-facing views.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use tutorhub_db::repositories::{ConsultSlotRepo, EventRepo};

use crate::error::AppResult;
use crate::middleware::rbac::RequireStaff;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/tutor/events
///
/// Upcoming events of every cohort the caller is assigned to, plus their
/// booked consults.
pub async fn my_events(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let events = EventRepo::list_for_tutor(&state.pool, user.user_id, Some(Utc::now())).await?;
    Ok(Json(DataResponse { data: events }))
}

/// GET /api/v1/tutor/consult-slots
pub async fn my_consult_slots(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let slots = ConsultSlotRepo::list_for_tutor(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: slots }))
}
