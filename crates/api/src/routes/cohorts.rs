use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::{calendar, cohorts};
use crate::state::AppState;

/// Routes mounted at `/cohorts`.
///
/// ```text
/// GET    /?program_id=                            -> list_cohorts
/// POST   /                                        -> create_cohort (admin)
/// GET    /{id}                                    -> get_cohort
/// PUT    /{id}                                    -> update_cohort (admin)
/// DELETE /{id}                                    -> delete_cohort (admin)
///
/// POST   /{id}/tutors                             -> assign_tutor (admin)
/// DELETE /{id}/tutors/{tutor_id}                  -> remove_tutor (admin)
///
/// GET    /{id}/students                           -> list_students (staff)
/// POST   /{id}/students                           -> enroll_student (admin)
/// DELETE /{id}/students/{student_id}              -> unenroll_student (admin)
///
/// POST   /{id}/meet-link                          -> ensure_cohort_meet_link (admin)
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cohorts::list_cohorts).post(cohorts::create_cohort))
        .route(
            "/{id}",
            get(cohorts::get_cohort)
                .put(cohorts::update_cohort)
                .delete(cohorts::delete_cohort),
        )
        .route("/{id}/tutors", post(cohorts::assign_tutor))
        .route("/{id}/tutors/{tutor_id}", delete(cohorts::remove_tutor))
        .route(
            "/{id}/students",
            get(cohorts::list_students).post(cohorts::enroll_student),
        )
        .route(
            "/{id}/students/{student_id}",
            delete(cohorts::unenroll_student),
        )
        .route("/{id}/meet-link", post(calendar::ensure_cohort_meet_link))
}
