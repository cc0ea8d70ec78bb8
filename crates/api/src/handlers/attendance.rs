//! Handlers for the attendance tracker.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tutorhub_core::attendance::{validate_attendance_status, AttendanceStats};
use tutorhub_core::error::CoreError;
use tutorhub_core::types::DbId;
use tutorhub_db::models::attendance::{EventAttendance, MarkAttendance, UpdateAttendanceStatus};
use tutorhub_db::repositories::{AttendanceRepo, EventRepo};
use tutorhub_events::bus::ATTENDANCE_MARKED;
use tutorhub_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAuth, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

fn publish_marked(
    state: &AppState,
    actor: &AuthUser,
    event_id: DbId,
    user_id: DbId,
    status: Option<&str>,
) {
    state.event_bus.publish(
        DomainEvent::new(ATTENDANCE_MARKED)
            .with_source("event", event_id)
            .with_actor(actor.user_id)
            .with_subject(user_id)
            .with_payload(json!({ "status": status })),
    );
}

/// GET /api/v1/events/{id}/attendance
pub async fn get_event_attendance(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    EventRepo::find_by_id(&state.pool, event_id)
        .await?
        .ok_or(AppError::not_found("Event", event_id))?;

    let rows = AttendanceRepo::list_for_event(&state.pool, event_id).await?;
    let stats = AttendanceStats::from_statuses(rows.iter().map(|r| r.status.as_deref()));

    Ok(Json(DataResponse {
        data: EventAttendance {
            event_id,
            stats,
            rows,
        },
    }))
}

/// PUT /api/v1/events/{id}/attendance
///
/// Creates the row when none exists. Staff may mark anyone; everyone else
/// only themselves.
pub async fn mark_attendance(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Json(input): Json<MarkAttendance>,
) -> AppResult<impl IntoResponse> {
    let target = user.principal().acting_for(input.user_id)?;
    validate_attendance_status(input.status.as_deref()).map_err(CoreError::Validation)?;

    EventRepo::find_by_id(&state.pool, event_id)
        .await?
        .ok_or(AppError::not_found("Event", event_id))?;

    let attendance = AttendanceRepo::upsert(
        &state.pool,
        target,
        event_id,
        input.status.as_deref(),
        user.user_id,
    )
    .await?;

    tracing::info!(
        attendance_id = attendance.id,
        event_id,
        attendee_id = target,
        status = ?attendance.status,
        user_id = user.user_id,
        "Attendance marked",
    );
    publish_marked(&state, &user, event_id, target, attendance.status.as_deref());

    Ok(Json(DataResponse { data: attendance }))
}

/// PUT /api/v1/attendance/{id}
pub async fn update_attendance(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateAttendanceStatus>,
) -> AppResult<impl IntoResponse> {
    validate_attendance_status(input.status.as_deref()).map_err(CoreError::Validation)?;

    let existing = AttendanceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Attendance", id))?;
    user.principal().acting_for(Some(existing.user_id))?;

    let status = input.status.as_deref();
    let attendance = AttendanceRepo::update_status(&state.pool, id, status, user.user_id)
        .await?
        .ok_or(AppError::not_found("Attendance", id))?;

    tracing::info!(
        attendance_id = id,
        status = ?attendance.status,
        user_id = user.user_id,
        "Attendance updated",
    );
    publish_marked(
        &state,
        &user,
        attendance.event_id,
        attendance.user_id,
        attendance.status.as_deref(),
    );

    Ok(Json(DataResponse { data: attendance }))
}
