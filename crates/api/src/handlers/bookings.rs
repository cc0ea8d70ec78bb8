//! Handlers for the booking ledger.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;
use tutorhub_core::error::CoreError;
use tutorhub_core::types::DbId;
use tutorhub_db::models::booking::{BookingOutcome, CancelOutcome};
use tutorhub_db::repositories::BookingRepo;
use tutorhub_events::bus::{BOOKING_CANCELLED, BOOKING_CREATED};
use tutorhub_events::DomainEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::RequireAuth;
use crate::query::OnBehalfParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/events/{id}/bookings?user_id=
///
/// Staff may book on behalf of another user with `?user_id=`.
pub async fn book_event(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Query(params): Query<OnBehalfParams>,
) -> AppResult<impl IntoResponse> {
    let target = user.principal().acting_for(params.user_id)?;

    let booking = match BookingRepo::book(&state.pool, event_id, target, Utc::now()).await? {
        BookingOutcome::Booked(booking) => booking,
        BookingOutcome::EventNotFound => return Err(AppError::not_found("Event", event_id)),
        BookingOutcome::AlreadyStarted => {
            return Err(
                CoreError::validation("Cannot book an event that has already started").into(),
            )
        }
        BookingOutcome::AlreadyBooked => {
            return Err(CoreError::Conflict("Already booked for this event".into()).into())
        }
        BookingOutcome::Full { capacity } => {
            return Err(CoreError::CapacityExceeded(format!(
                "Event is full (capacity {capacity})"
            ))
            .into())
        }
    };

    tracing::info!(
        event_id,
        booking_id = booking.id,
        booked_for = target,
        user_id = user.user_id,
        "Event booked",
    );

    state.event_bus.publish(
        DomainEvent::new(BOOKING_CREATED)
            .with_source("event", event_id)
            .with_actor(user.user_id)
            .with_subject(target)
            .with_payload(json!({ "booking_id": booking.id })),
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: booking })))
}

/// DELETE /api/v1/events/{id}/bookings?user_id=
///
/// Owner or admin. Rejected inside 24 hours of the event start.
pub async fn cancel_booking(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path(event_id): Path<DbId>,
    Query(params): Query<OnBehalfParams>,
) -> AppResult<impl IntoResponse> {
    let target = user.principal().acting_for_as_admin(params.user_id)?;

    let event_type = match BookingRepo::cancel(&state.pool, event_id, target, Utc::now()).await? {
        CancelOutcome::Cancelled { event_type } => event_type,
        CancelOutcome::EventNotFound => return Err(AppError::not_found("Event", event_id)),
        CancelOutcome::NotBooked => return Err(AppError::not_found("EventBooking", event_id)),
        CancelOutcome::TooLate => {
            return Err(CoreError::PolicyViolation(
                "Bookings cannot be cancelled within 24 hours of the event start".into(),
            )
            .into())
        }
    };

    tracing::info!(
        event_id,
        event_type = %event_type,
        cancelled_for = target,
        user_id = user.user_id,
        "Booking cancelled",
    );

    state.event_bus.publish(
        DomainEvent::new(BOOKING_CANCELLED)
            .with_source("event", event_id)
            .with_actor(user.user_id)
            .with_subject(target)
            .with_payload(json!({ "event_type": event_type })),
    );

    Ok(StatusCode::NO_CONTENT)
}
