//! Self-service views for the authenticated principal.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use tutorhub_core::availability::AvailabilityGrid;
use tutorhub_core::error::CoreError;
use tutorhub_db::models::attendance::UserAttendance;
use tutorhub_db::models::notification_preference::UpdateNotificationPreference;
use tutorhub_db::repositories::{
    AttendanceRepo, AvailabilityRepo, BookingRepo, NotificationPreferenceRepo, RescheduleRepo,
};

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// Availability document plus the number of selected weekly slots.
#[derive(Debug, Serialize)]
pub struct AvailabilityView {
    #[serde(flatten)]
    pub availability: AvailabilityGrid,
    pub weekly_slot_count: usize,
}

impl From<AvailabilityGrid> for AvailabilityView {
    fn from(availability: AvailabilityGrid) -> Self {
        let weekly_slot_count = availability.weekly_slot_count();
        Self {
            availability,
            weekly_slot_count,
        }
    }
}

/// GET /api/v1/me/bookings
///
/// Upcoming bookings only.
pub async fn my_bookings(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let bookings = BookingRepo::list_for_user(&state.pool, user.user_id, Utc::now()).await?;
    Ok(Json(DataResponse { data: bookings }))
}

/// GET /api/v1/me/attendance
pub async fn my_attendance(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let rows = AttendanceRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse {
        data: UserAttendance::new(user.user_id, rows),
    }))
}

/// GET /api/v1/me/reschedule-requests
pub async fn my_reschedule_requests(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let requests = RescheduleRepo::list_for_user(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// GET /api/v1/me/availability
///
/// An empty grid when nothing has been saved yet.
pub async fn get_availability(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let grid = AvailabilityRepo::find_for_user(&state.pool, user.user_id)
        .await?
        .map(|row| row.availability.0)
        .unwrap_or_default();
    Ok(Json(DataResponse {
        data: AvailabilityView::from(grid),
    }))
}

/// PUT /api/v1/me/availability
pub async fn put_availability(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<AvailabilityGrid>,
) -> AppResult<impl IntoResponse> {
    input.validate().map_err(CoreError::Validation)?;

    let saved = AvailabilityRepo::upsert(&state.pool, user.user_id, &input).await?;

    tracing::info!(
        user_id = user.user_id,
        weekly_slots = input.weekly_slot_count(),
        overrides = input.date_overrides.len(),
        "Availability saved",
    );

    Ok(Json(DataResponse {
        data: AvailabilityView::from(saved.availability.0),
    }))
}

/// GET /api/v1/me/notification-preferences
pub async fn get_notification_preferences(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let prefs = NotificationPreferenceRepo::get_or_default(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: prefs }))
}

/// PUT /api/v1/me/notification-preferences
///
/// Omitted fields keep their current value.
pub async fn put_notification_preferences(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<UpdateNotificationPreference>,
) -> AppResult<impl IntoResponse> {
    let prefs = NotificationPreferenceRepo::upsert(&state.pool, user.user_id, &input).await?;
    tracing::info!(user_id = user.user_id, "Notification preferences updated");
    Ok(Json(DataResponse { data: prefs }))
}
