pub mod attendance;
pub mod calendar;
pub mod cohorts;
pub mod consults;
pub mod events;
pub mod health;
pub mod me;
pub mod not_attending;
pub mod programs;
pub mod reports;
pub mod reschedule;
pub mod tutor;
pub mod users;
pub mod waitlist;

use axum::Router;

use crate::config::FeatureFlags;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /programs                                        catalog: programs
/// /cohorts                                         catalog: cohorts, tutors, enrollment
///
/// /events                                          event generator
/// /events/{id}/bookings                            booking ledger
/// /events/{id}/attendance                          attendance tracker
/// /attendance/{id}                                 mark attendance by row id
///
/// /consult-slots                                   consult slots (ENABLE_CONSULTS)
/// /reschedule-requests                             reschedule workflow (ENABLE_RESCHEDULE)
/// /waitlist                                        cohort waitlist
///
/// /users                                           profiles and status lifecycle
/// /me                                              self-service views
/// /tutor                                           tutor views
/// /reports                                         admin reports
/// /calendar                                        calendar repair
/// ```
///
/// Disabled features are not mounted at all.
pub fn api_routes(features: &FeatureFlags) -> Router<AppState> {
    let mut router = Router::new()
        .nest("/programs", programs::router())
        .nest("/cohorts", cohorts::router())
        .nest("/events", events::router())
        .nest("/attendance", attendance::router())
        .nest("/waitlist", waitlist::router())
        .nest("/users", users::router())
        .nest("/me", me::router(features.reschedule))
        .nest("/tutor", tutor::router(features.consults))
        .nest("/reports", reports::router())
        .nest("/calendar", calendar::router());

    if features.consults {
        router = router.nest("/consult-slots", consults::router());
    }
    if features.reschedule {
        router = router.nest("/reschedule-requests", reschedule::router());
    }

    router
}
