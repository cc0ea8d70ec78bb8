use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{attendance, bookings, events};
use crate::state::AppState;

/// Routes mounted at `/events`.
///
/// ```text
/// GET    /?cohort_id=&program_id=&event_type=&from=&to=  -> list_events (staff)
/// POST   /                                        -> create_event (admin)
/// GET    /{id}                                    -> get_event
/// DELETE /{id}                                    -> delete_event (admin)
/// PUT    /{id}/time                               -> update_event_time (admin or assigned tutor)
/// POST   /{id}/calendar-sync                      -> sync_event_calendar (admin)
///
/// POST   /{id}/bookings?user_id=                  -> book_event
/// DELETE /{id}/bookings?user_id=                  -> cancel_booking
///
/// GET    /{id}/attendance                         -> get_event_attendance (staff)
/// PUT    /{id}/attendance                         -> mark_attendance
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(events::list_events).post(events::create_event))
        .route(
            "/{id}",
            get(events::get_event).delete(events::delete_event),
        )
        .route("/{id}/time", put(events::update_event_time))
        .route("/{id}/calendar-sync", post(events::sync_event_calendar))
        .route(
            "/{id}/bookings",
            post(bookings::book_event).delete(bookings::cancel_booking),
        )
        .route(
            "/{id}/attendance",
            get(attendance::get_event_attendance).put(attendance::mark_attendance),
        )
}
