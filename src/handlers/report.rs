use axum::extract::{Query, State};
use axum::response::Response;

use crate::reporting::{ReportFilter, Roster};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

/// `GET /attendance/report?search=&status=&event_id=`
pub async fn attendance_report(
    State(state): State<AppState>,
    Query(filter): Query<ReportFilter>,
) -> Result<Response, AppError> {
    let roster = Roster::load(state.store.as_ref()).await?;
    let report = roster.report(&filter);

    tracing::debug!(
        total = report.total_approved,
        checked_in = report.checked_in,
        matching = report.matching,
        "Attendance report computed"
    );

    let message = format!("{}% checked in", report.rate);
    Ok(success(report, message))
}
