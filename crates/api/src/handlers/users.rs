//! Handlers for profiles and the customer status lifecycle.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tutorhub_core::customer_status::{
    deactivation_reason, expired_pending_cutoff, payment_days_remaining, validate_customer_status,
    validate_expiry_days, DEFAULT_HISTORY_LIMIT, DEFAULT_PENDING_EXPIRY_DAYS,
    STATUS_INACTIVE_CUSTOMER, STATUS_PENDING_CUSTOMER,
};
use tutorhub_core::error::CoreError;
use tutorhub_core::roles::{validate_role, ROLE_PARENT, ROLE_STUDENT};
use tutorhub_core::types::DbId;
use tutorhub_db::models::parent_link::{CreateFamily, LinkStudent, ProfileWithStudents};
use tutorhub_db::models::profile::{BulkStatusUpdate, CreateProfile, Profile};
use tutorhub_db::repositories::{ParentLinkRepo, ProfileRepo};
use tutorhub_events::bus::PAYMENT_REMINDER;
use tutorhub_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth};
use crate::query::{ExpiryParams, HistoryParams, ProfileFilterParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Result of a bulk status change.
#[derive(Debug, Serialize)]
pub struct StatusUpdateResult {
    pub updated: u64,
    pub status: String,
}

/// Result of queueing payment reminders.
#[derive(Debug, Serialize)]
pub struct PaymentReminderResult {
    pub queued: usize,
}

fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.trim().is_empty() || !email.contains('@') {
        return Err(CoreError::validation("A valid email is required"));
    }
    Ok(())
}

async fn find_profile(state: &AppState, id: DbId) -> AppResult<Profile> {
    ProfileRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("Profile", id))
}

fn expiry_days(params: &ExpiryParams) -> Result<i64, CoreError> {
    let days = params.days.unwrap_or(DEFAULT_PENDING_EXPIRY_DAYS);
    validate_expiry_days(days).map_err(CoreError::Validation)?;
    Ok(days)
}

/// Apply one status to a batch of users, recording history for each.
async fn apply_bulk_status(
    state: &AppState,
    user_ids: &[DbId],
    status: &str,
    reason: Option<&str>,
    changed_by: DbId,
) -> AppResult<u64> {
    let Some(&first) = user_ids.first() else {
        return Err(CoreError::validation("user_ids must not be empty").into());
    };
    validate_customer_status(status).map_err(CoreError::Validation)?;

    let updated =
        ProfileRepo::bulk_update_status(&state.pool, user_ids, status, reason, changed_by)
            .await?;
    if updated == 0 {
        return Err(AppError::not_found("Profile", first));
    }

    tracing::info!(
        requested = user_ids.len(),
        updated,
        status,
        user_id = changed_by,
        "Bulk status update applied",
    );

    Ok(updated)
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

/// GET /api/v1/users?role=&status=
pub async fn list_users(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ProfileFilterParams>,
) -> AppResult<impl IntoResponse> {
    let profiles =
        ProfileRepo::list(&state.pool, params.role.as_deref(), params.status.as_deref()).await?;
    let parent_ids: Vec<DbId> = profiles
        .iter()
        .filter(|p| p.role == ROLE_PARENT)
        .map(|p| p.id)
        .collect();
    let links = if parent_ids.is_empty() {
        Vec::new()
    } else {
        ParentLinkRepo::list_students_for_parents(&state.pool, &parent_ids).await?
    };
    Ok(Json(DataResponse {
        data: ProfileWithStudents::attach(profiles, links),
    }))
}

/// POST /api/v1/users
pub async fn create_user(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateProfile>,
) -> AppResult<impl IntoResponse> {
    validate_email(&input.email)?;
    validate_role(&input.role).map_err(CoreError::Validation)?;
    if let Some(status) = &input.status {
        validate_customer_status(status).map_err(CoreError::Validation)?;
    }

    let profile = ProfileRepo::create(&state.pool, &input).await?;

    tracing::info!(
        profile_id = profile.id,
        role = %profile.role,
        user_id = admin.user_id,
        "Profile created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: profile })))
}

/// GET /api/v1/users/{id}
///
/// Admins may read any profile, everyone else only their own.
pub async fn get_user(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    user.principal().acting_for_as_admin(Some(id))?;
    let profile = find_profile(&state, id).await?;
    let links = if profile.role == ROLE_PARENT {
        ParentLinkRepo::list_students(&state.pool, id).await?
    } else {
        Vec::new()
    };
    let data = ProfileWithStudents::attach(vec![profile], links)
        .pop()
        .ok_or(AppError::not_found("Profile", id))?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// Parent to student links
// ---------------------------------------------------------------------------

/// POST /api/v1/users/families
///
/// Creates a parent, a student and the link between them in one go.
pub async fn create_family(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<CreateFamily>,
) -> AppResult<impl IntoResponse> {
    validate_email(&input.parent.email)?;
    validate_email(&input.student.email)?;
    if let Some(status) = &input.status {
        validate_customer_status(status).map_err(CoreError::Validation)?;
    }

    let family = ParentLinkRepo::create_family(&state.pool, &input).await?;

    tracing::info!(
        parent_id = family.parent.id,
        student_id = family.student.id,
        user_id = admin.user_id,
        "Family created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: family })))
}

/// GET /api/v1/users/{id}/students
///
/// Admins may read any parent's links, a parent only their own.
pub async fn list_linked_students(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(parent_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    user.principal().acting_for_as_admin(Some(parent_id))?;
    find_profile(&state, parent_id).await?;
    let students = ParentLinkRepo::list_students(&state.pool, parent_id).await?;
    Ok(Json(DataResponse { data: students }))
}

/// POST /api/v1/users/{id}/students
pub async fn link_student(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(parent_id): Path<DbId>,
    Json(input): Json<LinkStudent>,
) -> AppResult<impl IntoResponse> {
    let parent = find_profile(&state, parent_id).await?;
    if parent.role != ROLE_PARENT {
        return Err(CoreError::Validation(format!(
            "Profile {parent_id} is not a parent (role '{}')",
            parent.role
        ))
        .into());
    }
    let student = find_profile(&state, input.student_id).await?;
    if student.role != ROLE_STUDENT {
        return Err(CoreError::Validation(format!(
            "Profile {} is not a student (role '{}')",
            student.id, student.role
        ))
        .into());
    }

    let link = ParentLinkRepo::create(&state.pool, parent_id, student.id).await?;

    tracing::info!(
        parent_id,
        student_id = student.id,
        user_id = admin.user_id,
        "Student linked to parent",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: link })))
}

/// DELETE /api/v1/users/{id}/students/{student_id}
pub async fn unlink_student(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path((parent_id, student_id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    if !ParentLinkRepo::delete(&state.pool, parent_id, student_id).await? {
        return Err(AppError::not_found("ParentStudentLink", student_id));
    }

    tracing::info!(
        parent_id,
        student_id,
        user_id = admin.user_id,
        "Student unlinked from parent",
    );

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Status lifecycle
// ---------------------------------------------------------------------------

/// PUT /api/v1/users/status
pub async fn bulk_update_status(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Json(input): Json<BulkStatusUpdate>,
) -> AppResult<impl IntoResponse> {
    let updated = apply_bulk_status(
        &state,
        &input.user_ids,
        &input.status,
        input.reason.as_deref(),
        admin.user_id,
    )
    .await?;

    Ok(Json(DataResponse {
        data: StatusUpdateResult {
            updated,
            status: input.status,
        },
    }))
}

/// GET /api/v1/users/status/expired-pending?days=
pub async fn list_expired_pending(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ExpiryParams>,
) -> AppResult<impl IntoResponse> {
    let days = expiry_days(&params)?;
    let cutoff = expired_pending_cutoff(Utc::now(), days);
    let profiles = ProfileRepo::list_expired_pending(&state.pool, cutoff).await?;
    Ok(Json(DataResponse { data: profiles }))
}

/// POST /api/v1/users/status/deactivate-expired?days=
///
/// Moves every expired pending customer to `inactive_customer`. Nothing to
/// deactivate is not an error.
pub async fn deactivate_expired(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<ExpiryParams>,
) -> AppResult<impl IntoResponse> {
    let days = expiry_days(&params)?;
    let cutoff = expired_pending_cutoff(Utc::now(), days);
    let ids: Vec<DbId> = ProfileRepo::list_expired_pending(&state.pool, cutoff)
        .await?
        .into_iter()
        .map(|p| p.id)
        .collect();

    let updated = if ids.is_empty() {
        0
    } else {
        apply_bulk_status(
            &state,
            &ids,
            STATUS_INACTIVE_CUSTOMER,
            Some(&deactivation_reason(days)),
            admin.user_id,
        )
        .await?
    };

    Ok(Json(DataResponse {
        data: StatusUpdateResult {
            updated,
            status: STATUS_INACTIVE_CUSTOMER.to_string(),
        },
    }))
}

/// GET /api/v1/users/status/history?user_id=&limit=
pub async fn list_status_history(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> AppResult<impl IntoResponse> {
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT).clamp(1, 500);
    let history = ProfileRepo::list_status_history(&state.pool, params.user_id, limit).await?;
    Ok(Json(DataResponse { data: history }))
}

/// POST /api/v1/users/status/payment-reminders
///
/// Queues a payment reminder email for every pending customer. The whole
/// batch travels as one bus event so its size never competes with the
/// channel capacity.
pub async fn send_payment_reminders(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let pending = ProfileRepo::list(&state.pool, None, Some(STATUS_PENDING_CUSTOMER)).await?;

    if !pending.is_empty() {
        let reminders: Vec<_> = pending
            .iter()
            .map(|profile| {
                let days_remaining =
                    payment_days_remaining(profile.created_at, now, DEFAULT_PENDING_EXPIRY_DAYS);
                json!({ "user_id": profile.id, "days_remaining": days_remaining })
            })
            .collect();
        state.event_bus.publish(
            DomainEvent::new(PAYMENT_REMINDER)
                .with_actor(admin.user_id)
                .with_payload(json!({ "reminders": reminders })),
        );
    }

    tracing::info!(queued = pending.len(), user_id = admin.user_id, "Payment reminders queued");

    Ok(Json(DataResponse {
        data: PaymentReminderResult {
            queued: pending.len(),
        },
    }))
}
