//! Aggregate queries for the admin summary.

use sqlx::PgPool;

use crate::models::report::{CohortSummary, StatusCount};

pub struct ReportRepo;

impl ReportRepo {
    pub async fn status_counts(pool: &PgPool) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM profiles GROUP BY status ORDER BY status ASC",
        )
        .fetch_all(pool)
        .await
    }

    /// Enrollment and attendance totals per cohort.
    ///
    /// Attendance counts cover the cohort's own events only; program-wide
    /// drop-ins are not attributed to a single cohort.
    pub async fn cohort_summaries(pool: &PgPool) -> Result<Vec<CohortSummary>, sqlx::Error> {
        sqlx::query_as::<_, CohortSummary>(
            "SELECT c.id AS cohort_id, c.name AS cohort_name, p.name AS program_name, c.capacity,
                    (SELECT COUNT(*) FROM cohort_students cs WHERE cs.cohort_id = c.id) AS enrolled,
                    COUNT(a.id) FILTER (WHERE a.status = 'attending') AS attending,
                    COUNT(a.id) FILTER (WHERE a.status = 'not_attending') AS not_attending,
                    COUNT(a.id) FILTER (WHERE a.status IS NULL) AS unmarked
             FROM cohorts c
             JOIN programs p ON p.id = c.program_id
             LEFT JOIN events e ON e.cohort_id = c.id
             LEFT JOIN attendance a ON a.event_id = e.id
             GROUP BY c.id, c.name, p.name, c.capacity
             ORDER BY p.name ASC, c.name ASC",
        )
        .fetch_all(pool)
        .await
    }
}
