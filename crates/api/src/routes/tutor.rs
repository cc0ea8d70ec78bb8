use axum::routing::get;
use axum::Router;

use crate::handlers::tutor;
use crate::state::AppState;

/// Routes mounted at `/tutor`.
///
/// ```text
/// GET    /events                                  -> my_events (staff)
/// GET    /consult-slots                           -> my_consult_slots (staff)
/// ```
pub fn router(consults_enabled: bool) -> Router<AppState> {
    let router = Router::new().route("/events", get(tutor::my_events));

    if consults_enabled {
        router.route("/consult-slots", get(tutor::my_consult_slots))
    } else {
        router
    }
}
