use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::waitlist;
use crate::state::AppState;

/// Routes mounted at `/waitlist`.
///
/// ```text
/// GET    /                                        -> list_waitlist (admin)
/// POST   /                                        -> add_to_waitlist
/// DELETE /{id}                                    -> remove_from_waitlist (admin)
/// POST   /{id}/place                              -> place_student (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(waitlist::list_waitlist).post(waitlist::add_to_waitlist),
        )
        .route("/{id}", delete(waitlist::remove_from_waitlist))
        .route("/{id}/place", post(waitlist::place_student))
}
