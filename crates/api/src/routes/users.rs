use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET    /?role=&status=                          -> list_users (admin)
/// POST   /                                        -> create_user (admin)
/// GET    /{id}                                    -> get_user (admin or self)
/// POST   /families                                -> create_family (admin)
///
/// GET    /{id}/students                           -> list_linked_students (admin or self)
/// POST   /{id}/students                           -> link_student (admin)
/// DELETE /{id}/students/{student_id}              -> unlink_student (admin)
///
/// PUT    /status                                  -> bulk_update_status (admin)
/// GET    /status/expired-pending?days=            -> list_expired_pending (admin)
/// POST   /status/deactivate-expired?days=         -> deactivate_expired (admin)
/// GET    /status/history?user_id=&limit=          -> list_status_history (admin)
/// POST   /status/payment-reminders                -> send_payment_reminders (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route("/{id}", get(users::get_user))
        .route("/families", post(users::create_family))
        .route(
            "/{id}/students",
            get(users::list_linked_students).post(users::link_student),
        )
        .route("/{id}/students/{student_id}", delete(users::unlink_student))
        .route("/status", put(users::bulk_update_status))
        .route("/status/expired-pending", get(users::list_expired_pending))
        .route("/status/deactivate-expired", post(users::deactivate_expired))
        .route("/status/history", get(users::list_status_history))
        .route(
            "/status/payment-reminders",
            post(users::send_payment_reminders),
        )
}
