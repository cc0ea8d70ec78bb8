use serde::Serialize;
use sqlx::FromRow;
use tutorhub_core::types::DbId;

/// Profile count for one customer status.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

/// Enrollment and attendance totals for one cohort.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CohortSummary {
    pub cohort_id: DbId,
    pub cohort_name: String,
    pub program_name: String,
    pub capacity: i32,
    pub enrolled: i64,
    pub attending: i64,
    pub not_attending: i64,
    pub unmarked: i64,
}

/// The admin summary report.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    pub statuses: Vec<StatusCount>,
    pub cohorts: Vec<CohortSummary>,
}
