use axum::routing::get;
use axum::Router;

use crate::handlers::not_attending;
use crate::state::AppState;

/// Root-level route for the link embedded in reminder emails.
///
/// ```text
/// GET    /not-attending?token=                    -> redeem (public)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/not-attending", get(not_attending::redeem))
}
