use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone: everything is behind `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub pool: tutorhub_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Handlers publish domain events here after a mutation commits.
    pub event_bus: Arc<tutorhub_events::EventBus>,
    /// Present when `CALENDAR_SYNC_URL` is configured.
    pub calendar: Option<tutorhub_events::CalendarSync>,
}
