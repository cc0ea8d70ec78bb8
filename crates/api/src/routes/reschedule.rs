use axum::routing::{delete, get, put};
use axum::Router;

use crate::handlers::reschedule;
use crate::state::AppState;

/// Routes mounted at `/reschedule-requests`.
///
/// ```text
/// GET    /?status=                                -> list_requests (staff)
/// POST   /                                        -> submit_request
/// DELETE /{id}                                    -> cancel_request (requester)
/// PUT    /{id}/decision                           -> decide_request (staff)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(reschedule::list_requests).post(reschedule::submit_request),
        )
        .route("/{id}", delete(reschedule::cancel_request))
        .route("/{id}/decision", put(reschedule::decide_request))
}
