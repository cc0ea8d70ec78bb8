//! Handlers for programs, the top level of the catalog.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tutorhub_core::error::CoreError;
use tutorhub_core::types::DbId;
use tutorhub_db::models::program::{CreateProgram, UpdateProgram};
use tutorhub_db::repositories::ProgramRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::response::DataResponse;
use crate::state::AppState;

fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::validation("name is required"));
    }
    Ok(())
}

/// GET /api/v1/programs
pub async fn list_programs(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let programs = ProgramRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: programs }))
}

/// GET /api/v1/programs/{id}
pub async fn get_program(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let program = ProgramRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Program", id))?;
    Ok(Json(DataResponse { data: program }))
}

/// POST /api/v1/programs
pub async fn create_program(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateProgram>,
) -> AppResult<impl IntoResponse> {
    validate_name(&input.name)?;
    let program = ProgramRepo::create(&state.pool, &input).await?;

    tracing::info!(program_id = program.id, user_id = admin.user_id, "Program created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: program })))
}

/// PUT /api/v1/programs/{id}
pub async fn update_program(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateProgram>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = &input.name {
        validate_name(name)?;
    }
    let program = ProgramRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::not_found("Program", id))?;

    tracing::info!(program_id = id, user_id = admin.user_id, "Program updated");

    Ok(Json(DataResponse { data: program }))
}

/// DELETE /api/v1/programs/{id}
///
/// Cohorts, events, bookings and attendance go with it.
pub async fn delete_program(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    if !ProgramRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Program", id));
    }

    tracing::info!(program_id = id, user_id = admin.user_id, "Program deleted");

    Ok(StatusCode::NO_CONTENT)
}
