use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::consults;
use crate::state::AppState;

/// Routes mounted at `/consult-slots`.
///
/// ```text
/// GET    /                                        -> list_available_slots
/// POST   /                                        -> create_slot (staff)
/// DELETE /{id}                                    -> delete_slot (staff)
/// POST   /{id}/book?user_id=                      -> book_slot
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(consults::list_available_slots).post(consults::create_slot),
        )
        .route("/{id}", delete(consults::delete_slot))
        .route("/{id}/book", post(consults::book_slot))
}
