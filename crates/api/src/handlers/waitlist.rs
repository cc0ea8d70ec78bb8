//! Handlers for the cohort waitlist and placement.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use tutorhub_core::error::CoreError;
use tutorhub_core::types::DbId;
use tutorhub_db::models::waitlist::{CreateWaitlistEntry, PlaceStudent, PlacementOutcome};
use tutorhub_db::repositories::{ProfileRepo, WaitlistRepo};
use tutorhub_events::bus::WAITLIST_PLACED;
use tutorhub_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/waitlist
///
/// Oldest entries first.
pub async fn list_waitlist(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let entries = WaitlistRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: entries }))
}

/// POST /api/v1/waitlist
///
/// Admins may add anyone; everyone else only themselves.
pub async fn add_to_waitlist(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Json(input): Json<CreateWaitlistEntry>,
) -> AppResult<impl IntoResponse> {
    let target = user.principal().acting_for_as_admin(input.user_id)?;
    ProfileRepo::find_by_id(&state.pool, target)
        .await?
        .ok_or(AppError::not_found("Profile", target))?;

    let entry =
        WaitlistRepo::create(&state.pool, target, input.program_id, input.notes.as_deref()).await?;

    tracing::info!(
        waitlist_id = entry.id,
        waitlisted_user = target,
        program_id = ?entry.program_id,
        user_id = user.user_id,
        "Added to waitlist",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: entry })))
}

/// DELETE /api/v1/waitlist/{id}
///
/// Leaves enrollment and customer status alone.
pub async fn remove_from_waitlist(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !WaitlistRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("WaitlistEntry", id));
    }

    tracing::info!(waitlist_id = id, user_id = admin.user_id, "Removed from waitlist");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/waitlist/{id}/place
///
/// Enrolls the student, removes the entry and promotes the student to
/// `customer` in one transaction. Cohort capacity is not checked.
pub async fn place_student(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<PlaceStudent>,
) -> AppResult<impl IntoResponse> {
    let outcome = WaitlistRepo::place(
        &state.pool,
        id,
        input.student_id,
        input.cohort_id,
        admin.user_id,
    )
    .await?;

    let (enrollment, status_changed) = match outcome {
        PlacementOutcome::Placed {
            enrollment,
            status_changed,
        } => (enrollment, status_changed),
        PlacementOutcome::EntryNotFound => return Err(AppError::not_found("WaitlistEntry", id)),
        PlacementOutcome::StudentMismatch => {
            return Err(CoreError::Validation(format!(
                "Waitlist entry {id} does not belong to student {}",
                input.student_id
            ))
            .into())
        }
        PlacementOutcome::CohortNotFound => {
            return Err(AppError::not_found("Cohort", input.cohort_id))
        }
        PlacementOutcome::AlreadyEnrolled => {
            return Err(CoreError::Conflict(format!(
                "Student {} is already enrolled in cohort {}",
                input.student_id, input.cohort_id
            ))
            .into())
        }
    };

    tracing::info!(
        waitlist_id = id,
        student_id = input.student_id,
        cohort_id = input.cohort_id,
        status_changed,
        user_id = admin.user_id,
        "Student placed from waitlist",
    );

    state.event_bus.publish(
        DomainEvent::new(WAITLIST_PLACED)
            .with_source("cohort", input.cohort_id)
            .with_actor(admin.user_id)
            .with_subject(input.student_id),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: enrollment })))
}
