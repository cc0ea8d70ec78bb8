//! Handlers for the event generator: creation, listing, time changes,
//! deletion, and on-demand calendar sync.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tutorhub_core::error::CoreError;
use tutorhub_core::event_types::{normalize_event, validate_time_range, EventDraft};
use tutorhub_core::types::DbId;
use tutorhub_db::models::event::{CreateEvent, EventFilter, UpdateEventTime};
use tutorhub_db::repositories::{CohortRepo, EventRepo, ProgramRepo};
use tutorhub_events::bus::{EVENT_CREATED, EVENT_RESCHEDULED};
use tutorhub_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/events?cohort_id=&program_id=&event_type=&from=&to=
pub async fn list_events(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>,
) -> AppResult<impl IntoResponse> {
    let events = EventRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse { data: events }))
}

/// GET /api/v1/events/{id}
pub async fn get_event(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let event = EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Event", id))?;
    Ok(Json(DataResponse { data: event }))
}

/// POST /api/v1/events
///
/// Drop-in events book every student of the program in the same transaction;
/// the response carries `enrolled_count`.
pub async fn create_event(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(mut input): Json<CreateEvent>,
) -> AppResult<impl IntoResponse> {
    let normalized = normalize_event(&EventDraft {
        event_type: &input.event_type,
        cohort_id: input.cohort_id,
        program_id: input.program_id,
        title: &input.title,
        start_time: input.start_time,
        end_time: input.end_time,
        is_required: input.is_required,
        capacity: input.capacity,
        recurrence_pattern: input.recurrence_pattern.as_ref(),
    })?;

    if let Some(cohort_id) = normalized.cohort_id {
        CohortRepo::find_by_id(&state.pool, cohort_id)
            .await?
            .ok_or(AppError::not_found("Cohort", cohort_id))?;
    }
    if let Some(program_id) = normalized.program_id {
        ProgramRepo::find_by_id(&state.pool, program_id)
            .await?
            .ok_or(AppError::not_found("Program", program_id))?;
    }

    input.title = input.title.trim().to_string();
    input.cohort_id = normalized.cohort_id;
    input.program_id = normalized.program_id;
    input.is_required = Some(normalized.is_required);
    input.capacity = normalized.capacity;

    let created = EventRepo::create(&state.pool, &input, admin.user_id).await?;

    tracing::info!(
        event_id = created.event.id,
        event_type = %created.event.event_type,
        enrolled_count = created.enrolled_count,
        user_id = admin.user_id,
        "Event created",
    );

    state.event_bus.publish(
        DomainEvent::new(EVENT_CREATED)
            .with_source("event", created.event.id)
            .with_actor(admin.user_id),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// PUT /api/v1/events/{id}/time
///
/// Admins may move any event; tutors only events of cohorts they are
/// assigned to. Bookings and attendance are left untouched.
pub async fn update_event_time(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEventTime>,
) -> AppResult<impl IntoResponse> {
    validate_time_range(input.start_time, input.end_time)?;

    let existing = EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Event", id))?;

    let principal = user.principal();
    if !principal.is_admin()
        && !EventRepo::is_tutor_for_event(&state.pool, id, user.user_id).await?
    {
        return Err(CoreError::Forbidden(
            "Only an admin or a tutor assigned to this cohort can reschedule the event".into(),
        )
        .into());
    }

    let event = EventRepo::update_time(&state.pool, id, input.start_time, input.end_time)
        .await?
        .ok_or(AppError::not_found("Event", id))?;

    tracing::info!(
        event_id = id,
        old_start = %existing.start_time,
        new_start = %event.start_time,
        user_id = user.user_id,
        "Event time updated",
    );

    state.event_bus.publish(
        DomainEvent::new(EVENT_RESCHEDULED)
            .with_source("event", id)
            .with_actor(user.user_id)
            .with_payload(json!({
                "old_start_time": existing.start_time,
                "old_end_time": existing.end_time,
                "start_time": event.start_time,
                "end_time": event.end_time,
            })),
    );

    Ok(Json(DataResponse { data: event }))
}

/// DELETE /api/v1/events/{id}
///
/// Bookings and attendance cascade. A consult slot bound to the event is
/// freed.
pub async fn delete_event(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !EventRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Event", id));
    }

    tracing::info!(event_id = id, user_id = admin.user_id, "Event deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/events/{id}/calendar-sync
///
/// Pushes the event to the external calendar now instead of waiting for the
/// bus listener.
pub async fn sync_event_calendar(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let calendar = state
        .calendar
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("Calendar sync is not configured".into()))?;

    let synced = calendar
        .sync_event(id)
        .await
        .map_err(|e| AppError::InternalError(e.to_string()))?
        .ok_or(AppError::not_found("Event", id))?;

    tracing::info!(
        event_id = id,
        external_id = %synced.external_id,
        user_id = admin.user_id,
        "Event synced to calendar",
    );

    Ok(Json(DataResponse { data: synced }))
}
