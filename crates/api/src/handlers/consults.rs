//! Handlers for consult slots and consult booking.
//!
//! Mounted only when `ENABLE_CONSULTS` is on.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tutorhub_core::booking::consult_horizon;
use tutorhub_core::error::CoreError;
use tutorhub_core::event_types::validate_time_range;
use tutorhub_core::types::DbId;
use tutorhub_db::models::booking::EventBooking;
use tutorhub_db::models::consult_slot::{
    ConsultBookingOutcome, CreateConsultSlot, DeleteSlotOutcome,
};
use tutorhub_db::models::event::Event;
use tutorhub_db::repositories::ConsultSlotRepo;
use tutorhub_events::bus::BOOKING_CREATED;
use tutorhub_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireStaff};
use crate::query::OnBehalfParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// The consult event created for a booked slot, with its booking.
#[derive(Debug, Serialize)]
pub struct ConsultBooking {
    pub event: Event,
    pub booking: EventBooking,
}

/// GET /api/v1/consult-slots
///
/// Unbooked slots starting within the booking horizon.
pub async fn list_available_slots(
    RequireAuth(_user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let now = Utc::now();
    let slots = ConsultSlotRepo::list_available(&state.pool, now, consult_horizon(now)).await?;
    Ok(Json(DataResponse { data: slots }))
}

/// POST /api/v1/consult-slots
pub async fn create_slot(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Json(input): Json<CreateConsultSlot>,
) -> AppResult<impl IntoResponse> {
    validate_time_range(input.start_time, input.end_time)?;
    let tutor_id = user.principal().acting_for_as_admin(input.tutor_id)?;

    let slot =
        ConsultSlotRepo::create(&state.pool, tutor_id, input.start_time, input.end_time).await?;

    tracing::info!(
        slot_id = slot.id,
        tutor_id,
        start_time = %slot.start_time,
        user_id = user.user_id,
        "Consult slot created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: slot })))
}

/// DELETE /api/v1/consult-slots/{id}
///
/// Tutors may delete their own slots, admins any. Booked slots stay.
pub async fn delete_slot(
    RequireStaff(user): RequireStaff,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let slot = ConsultSlotRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::not_found("ConsultSlot", id))?;
    user.principal().acting_for_as_admin(Some(slot.tutor_id))?;

    match ConsultSlotRepo::delete_unbooked(&state.pool, id).await? {
        DeleteSlotOutcome::Deleted => {}
        DeleteSlotOutcome::NotFound => return Err(AppError::not_found("ConsultSlot", id)),
        DeleteSlotOutcome::Booked => {
            return Err(CoreError::Conflict("Cannot delete a booked consult slot".into()).into())
        }
    }

    tracing::info!(slot_id = id, user_id = user.user_id, "Consult slot deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/consult-slots/{id}/book?user_id=
///
/// Creates a one-seat consult event for the slot and books it.
pub async fn book_slot(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(slot_id): Path<DbId>,
    Query(params): Query<OnBehalfParams>,
) -> AppResult<impl IntoResponse> {
    let target = user.principal().acting_for(params.user_id)?;

    let outcome = ConsultSlotRepo::book(&state.pool, slot_id, target, Utc::now()).await?;
    let (event, booking) = match outcome {
        ConsultBookingOutcome::Booked { event, booking } => (event, booking),
        ConsultBookingOutcome::SlotNotFound => {
            return Err(AppError::not_found("ConsultSlot", slot_id))
        }
        ConsultBookingOutcome::AlreadyBooked => {
            return Err(CoreError::Conflict("Consult slot is already booked".into()).into())
        }
        ConsultBookingOutcome::SlotInPast => {
            return Err(CoreError::validation("Cannot book a consult slot in the past").into())
        }
    };

    tracing::info!(
        slot_id,
        event_id = event.id,
        booked_for = target,
        user_id = user.user_id,
        "Consult booked",
    );

    state.event_bus.publish(
        DomainEvent::new(BOOKING_CREATED)
            .with_source("event", event.id)
            .with_actor(user.user_id)
            .with_subject(target)
            .with_payload(json!({ "booking_id": booking.id, "slot_id": slot_id })),
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ConsultBooking { event, booking },
        }),
    ))
}
