use axum::routing::get;
use axum::Router;

use crate::handlers::me;
use crate::state::AppState;

/// Routes mounted at `/me`. All scoped to the caller.
///
/// ```text
/// GET    /bookings                                -> my_bookings
/// GET    /attendance                              -> my_attendance
/// GET    /reschedule-requests                     -> my_reschedule_requests
/// GET    /availability                            -> get_availability
/// PUT    /availability                            -> put_availability
/// GET    /notification-preferences                -> get_notification_preferences
/// PUT    /notification-preferences                -> put_notification_preferences
/// ```
pub fn router(reschedule_enabled: bool) -> Router<AppState> {
    let router = Router::new()
        .route("/bookings", get(me::my_bookings))
        .route("/attendance", get(me::my_attendance))
        .route(
            "/availability",
            get(me::get_availability).put(me::put_availability),
        )
        .route(
            "/notification-preferences",
            get(me::get_notification_preferences).put(me::put_notification_preferences),
        );

    if reschedule_enabled {
        router.route("/reschedule-requests", get(me::my_reschedule_requests))
    } else {
        router
    }
}
