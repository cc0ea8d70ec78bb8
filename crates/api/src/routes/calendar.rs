use axum::routing::post;
use axum::Router;

use crate::handlers::calendar;
use crate::state::AppState;

/// Routes mounted at `/calendar`.
///
/// ```text
/// POST   /reconcile                               -> reconcile (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/reconcile", post(calendar::reconcile))
}
