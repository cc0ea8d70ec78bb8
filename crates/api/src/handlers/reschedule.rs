//! Handlers for the reschedule workflow.
//!
//! A decision is only recorded here. Moving the event is a separate call to
//! `PUT /events/{id}/time`.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tutorhub_core::error::CoreError;
use tutorhub_core::reschedule::{
    can_cancel, can_transition, validate_decision, validate_notes, validate_status,
    RESCHEDULE_PENDING,
};
use tutorhub_core::types::DbId;
use tutorhub_db::models::reschedule::{
    CreateRescheduleRequest, RescheduleDecision, RescheduleListParams, SubmitOutcome,
};
use tutorhub_db::repositories::RescheduleRepo;
use tutorhub_events::bus::RESCHEDULE_HANDLED;
use tutorhub_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/reschedule-requests?status=
pub async fn list_requests(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Query(params): Query<RescheduleListParams>,
) -> AppResult<impl IntoResponse> {
    if let Some(status) = &params.status {
        validate_status(status).map_err(CoreError::Validation)?;
    }
    let requests = RescheduleRepo::list(&state.pool, params.status.as_deref()).await?;
    Ok(Json(DataResponse { data: requests }))
}

/// POST /api/v1/reschedule-requests
///
/// The caller must hold a booking for the event.
pub async fn submit_request(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateRescheduleRequest>,
) -> AppResult<impl IntoResponse> {
    validate_notes(input.notes.as_deref()).map_err(CoreError::Validation)?;

    let request = match RescheduleRepo::submit(&state.pool, user.user_id, &input).await? {
        SubmitOutcome::Created(request) => request,
        SubmitOutcome::EventNotFound => {
            let message = format!("Event {} does not exist", input.event_id);
            return Err(CoreError::Validation(message).into());
        }
        SubmitOutcome::NotBooked => {
            return Err(CoreError::validation(
                "You can only request a reschedule for an event you are booked on",
            )
            .into())
        }
        SubmitOutcome::DuplicatePending => {
            return Err(CoreError::Conflict(
                "A pending reschedule request already exists for this event".into(),
            )
            .into())
        }
    };

    tracing::info!(
        request_id = request.id,
        event_id = request.event_id,
        user_id = user.user_id,
        "Reschedule request submitted",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: request })))
}

/// DELETE /api/v1/reschedule-requests/{id}
///
/// Only the requester, and only while pending.
pub async fn cancel_request(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let request = RescheduleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("RescheduleRequest", id))?;

    if request.user_id != user.user_id {
        return Err(CoreError::Forbidden(
            "Only the requester can cancel a reschedule request".into(),
        )
        .into());
    }
    if !can_cancel(&request.status) || !RescheduleRepo::delete_pending(&state.pool, id).await? {
        return Err(CoreError::Conflict(format!(
            "Reschedule request {id} is no longer {RESCHEDULE_PENDING}"
        ))
        .into());
    }

    tracing::info!(request_id = id, user_id = user.user_id, "Reschedule request cancelled");

    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/reschedule-requests/{id}/decision
pub async fn decide_request(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<RescheduleDecision>,
) -> AppResult<impl IntoResponse> {
    validate_decision(&input.status).map_err(CoreError::Validation)?;
    validate_notes(input.admin_notes.as_deref()).map_err(CoreError::Validation)?;

    let existing = RescheduleRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("RescheduleRequest", id))?;

    let conflict = || {
        AppError::Core(CoreError::Conflict(format!(
            "Reschedule request {id} has already been handled"
        )))
    };
    if !can_transition(&existing.status, &input.status) {
        return Err(conflict());
    }

    let request = RescheduleRepo::decide(
        &state.pool,
        id,
        &input.status,
        user.user_id,
        input.admin_notes.as_deref(),
    )
    .await?
    .ok_or_else(conflict)?;

    tracing::info!(
        request_id = id,
        status = %request.status,
        user_id = user.user_id,
        "Reschedule request handled",
    );

    state.event_bus.publish(
        DomainEvent::new(RESCHEDULE_HANDLED)
            .with_source("reschedule_request", id)
            .with_actor(user.user_id)
            .with_subject(request.user_id)
            .with_payload(json!({
                "event_id": request.event_id,
                "status": request.status,
                "admin_notes": request.admin_notes,
            })),
    );

    Ok(Json(DataResponse { data: request }))
}
