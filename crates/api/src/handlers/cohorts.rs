//! Handlers for cohorts, tutor assignment and student enrollment.
//!
//! Enrollment never checks cohort capacity: admins may place students past
//! it. Capacity is only enforced for event bookings.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tutorhub_core::cohort::{is_at_capacity, validate_capacity, validate_color};
use tutorhub_core::error::CoreError;
use tutorhub_core::roles::ROLE_TUTOR;
use tutorhub_core::types::DbId;
use tutorhub_db::models::cohort::{AssignTutor, CreateCohort, EnrollStudent, UpdateCohort};
use tutorhub_db::repositories::{CohortRepo, ProfileRepo, ProgramRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth, RequireStaff};
use crate::query::ProgramFilterParams;
use crate::response::DataResponse;
use crate::state::AppState;

fn validate_cohort_fields(
    name: Option<&str>,
    color: Option<&str>,
    capacity: Option<i32>,
) -> Result<(), CoreError> {
    if let Some(name) = name {
        if name.trim().is_empty() {
            return Err(CoreError::validation("name is required"));
        }
    }
    if let Some(color) = color {
        validate_color(color).map_err(CoreError::Validation)?;
    }
    if let Some(capacity) = capacity {
        validate_capacity(capacity).map_err(CoreError::Validation)?;
    }
    Ok(())
}

async fn ensure_cohort_exists(state: &AppState, id: DbId) -> AppResult<()> {
    CohortRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Cohort", id))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Cohort CRUD
// ---------------------------------------------------------------------------

/// GET /api/v1/cohorts?program_id=
pub async fn list_cohorts(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Query(params): Query<ProgramFilterParams>,
) -> AppResult<impl IntoResponse> {
    let cohorts = CohortRepo::list(&state.pool, params.program_id).await?;
    Ok(Json(DataResponse { data: cohorts }))
}

/// GET /api/v1/cohorts/{id}
pub async fn get_cohort(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let cohort = CohortRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Cohort", id))?;
    Ok(Json(DataResponse { data: cohort }))
}

/// POST /api/v1/cohorts
pub async fn create_cohort(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateCohort>,
) -> AppResult<impl IntoResponse> {
    validate_cohort_fields(Some(&input.name), input.color.as_deref(), input.capacity)?;
    ProgramRepo::find_by_id(&state.pool, input.program_id)
        .await?
        .ok_or(AppError::not_found("Program", input.program_id))?;

    let cohort = CohortRepo::create(&state.pool, &input).await?;

    tracing::info!(
        cohort_id = cohort.id,
        program_id = cohort.program_id,
        color = %cohort.color,
        user_id = admin.user_id,
        "Cohort created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: cohort })))
}

/// PUT /api/v1/cohorts/{id}
pub async fn update_cohort(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateCohort>,
) -> AppResult<impl IntoResponse> {
    validate_cohort_fields(input.name.as_deref(), input.color.as_deref(), input.capacity)?;
    let cohort = CohortRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Cohort", id))?;

    tracing::info!(cohort_id = id, user_id = admin.user_id, "Cohort updated");

    Ok(Json(DataResponse { data: cohort }))
}

/// DELETE /api/v1/cohorts/{id}
pub async fn delete_cohort(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !CohortRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Cohort", id));
    }

    tracing::info!(cohort_id = id, user_id = admin.user_id, "Cohort deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Tutors
// ---------------------------------------------------------------------------

/// POST /api/v1/cohorts/{id}/tutors
pub async fn assign_tutor(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(cohort_id): Path<DbId>,
    Json(input): Json<AssignTutor>,
) -> AppResult<impl IntoResponse> {
    ensure_cohort_exists(&state, cohort_id).await?;
    let tutor = ProfileRepo::find_by_id(&state.pool, input.tutor_id)
        .await?
        .ok_or(AppError::not_found("Profile", input.tutor_id))?;
    if tutor.role != ROLE_TUTOR {
        return Err(CoreError::validation(format!(
            "Profile {} is not a tutor",
            input.tutor_id
        ))
        .into());
    }

    let assignment = CohortRepo::assign_tutor(&state.pool, cohort_id, input.tutor_id).await?;

    tracing::info!(
        cohort_id,
        tutor_id = input.tutor_id,
        user_id = admin.user_id,
        "Tutor assigned to cohort",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: assignment })))
}

/// DELETE /api/v1/cohorts/{id}/tutors/{tutor_id}
pub async fn remove_tutor(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((cohort_id, tutor_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    if !CohortRepo::remove_tutor(&state.pool, cohort_id, tutor_id).await? {
        return Err(AppError::not_found("CohortTutor", tutor_id));
    }

    tracing::info!(cohort_id, tutor_id, user_id = admin.user_id, "Tutor removed from cohort");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Students
// ---------------------------------------------------------------------------

/// GET /api/v1/cohorts/{id}/students
pub async fn list_students(
    RequireStaff(_user): RequireStaff,
    State(state): State<AppState>,
    Path(cohort_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_cohort_exists(&state, cohort_id).await?;
    let students = CohortRepo::list_students(&state.pool, cohort_id).await?;
    Ok(Json(DataResponse { data: students }))
}

/// POST /api/v1/cohorts/{id}/students
///
/// Succeeds even when the cohort is full.
pub async fn enroll_student(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(cohort_id): Path<DbId>,
    Json(input): Json<EnrollStudent>,
) -> AppResult<impl IntoResponse> {
    let cohort = CohortRepo::find_by_id(&state.pool, cohort_id)
        .await?
        .ok_or(AppError::not_found("Cohort", cohort_id))?;
    ProfileRepo::find_by_id(&state.pool, input.student_id)
        .await?
        .ok_or(AppError::not_found("Profile", input.student_id))?;

    let enrolled = CohortRepo::count_students(&state.pool, cohort_id).await?;
    if is_at_capacity(cohort.capacity, enrolled) {
        tracing::warn!(
            cohort_id,
            capacity = cohort.capacity,
            enrolled,
            "Enrolling past cohort capacity",
        );
    }

    let enrollment = CohortRepo::enroll_student(&state.pool, cohort_id, input.student_id).await?;

    tracing::info!(
        cohort_id,
        student_id = input.student_id,
        user_id = admin.user_id,
        "Student enrolled",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: enrollment })))
}

/// DELETE /api/v1/cohorts/{id}/students/{student_id}
pub async fn unenroll_student(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((cohort_id, student_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    if !CohortRepo::unenroll_student(&state.pool, cohort_id, student_id).await? {
        return Err(AppError::not_found("CohortStudent", student_id));
    }

    tracing::info!(cohort_id, student_id, user_id = admin.user_id, "Student unenrolled");

    Ok(StatusCode::NO_CONTENT)
}
