//! Admin reporting.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use tutorhub_db::models::report::SummaryReport;
use tutorhub_db::repositories::ReportRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/reports/summary
pub async fn summary(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let (statuses, cohorts) = tokio::try_join!(
        ReportRepo::status_counts(&state.pool),
        ReportRepo::cohort_summaries(&state.pool),
    )?;
    Ok(Json(DataResponse {
        data: SummaryReport { statuses, cohorts },
    }))
}
