use axum::routing::get;
use axum::Router;

use crate::handlers::programs;
use crate::state::AppState;

/// Routes mounted at `/programs`.
///
/// ```text
/// GET    /                                        -> list_programs
/// POST   /                                        -> create_program (admin)
/// GET    /{id}                                    -> get_program
/// PUT    /{id}                                    -> update_program (admin)
/// DELETE /{id}                                    -> delete_program (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(programs::list_programs).post(programs::create_program),
        )
        .route(
            "/{id}",
            get(programs::get_program)
                .put(programs::update_program)
                .delete(programs::delete_program),
        )
}
