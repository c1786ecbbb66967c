//! Machine list and dashboard view endpoints

use std::path::PathBuf;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Response;
use serde::Serialize;
use tracing::debug;

use super::{filter_error_response, DashboardState};
use crate::api::envelope::{error_response, ApiResponse, ErrorCode};
use crate::dashboard::{build_view, DashboardView};
use crate::filter::{FilterQuery, FilterSelection};
use crate::sensors::MachineSummary;

// ============================================================================
// Machines
// ============================================================================

#[derive(Debug, Serialize)]
pub struct MachinesResponse {
    pub source: PathBuf,
    pub machines: Vec<MachineSummary>,
    /// Rows dropped while parsing the CSV
    pub skipped_rows: usize,
}

/// GET /api/v1/machines - Machine ids with their observed date bounds
pub async fn get_machines(State(state): State<DashboardState>) -> Response {
    let log = match state.log().await {
        Ok(log) => log,
        Err(response) => return response,
    };
    ApiResponse::ok(MachinesResponse {
        source: log.source().to_path_buf(),
        machines: log.machine_summaries(),
        skipped_rows: log.skipped_rows(),
    })
}

// ============================================================================
// Dashboard view
// ============================================================================

/// Resolve `query` against the cached log and build the view.
pub(crate) async fn resolve_view(
    state: &DashboardState,
    query: &FilterQuery,
) -> Result<DashboardView, Response> {
    let log = state.log().await?;
    let selection =
        FilterSelection::resolve(&log, query).map_err(|e| filter_error_response(&e))?;
    debug!(
        machine = %selection.machine_id,
        dates = %selection.date_label(),
        times = %selection.time_label(),
        "Building dashboard view"
    );
    Ok(build_view(&log, &selection, &state.config.gauge))
}

/// GET /api/v1/dashboard - KPI cards and chart data for a filter selection
///
/// Query: `machine`, `start_date`, `end_date` (YYYY-MM-DD), `start_time`,
/// `end_time` (HH:MM). Every parameter is optional.
pub async fn get_dashboard(
    State(state): State<DashboardState>,
    query: Result<Query<FilterQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return error_response(ErrorCode::BadRequest, rejection.body_text()),
    };
    match resolve_view(&state, &query).await {
        Ok(view) => ApiResponse::ok(view),
        Err(response) => response,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::test_support::test_state;

    #[tokio::test]
    async fn test_resolve_view_defaults_to_first_machine() {
        let (state, _dir) = test_state();
        let view = resolve_view(&state, &FilterQuery::default()).await.unwrap();
        assert_eq!(view.banner.machine, "M1");
        assert_eq!(view.banner.date, "2025-05-01 ~ 2025-05-01");
        assert_eq!(view.row_count, 3);
    }

    #[tokio::test]
    async fn test_resolve_view_narrows_time() {
        let (state, _dir) = test_state();
        let query = FilterQuery {
            machine: Some("M1".into()),
            start_time: Some("09:05".into()),
            end_time: Some("09:20".into()),
            ..FilterQuery::default()
        };
        let view = resolve_view(&state, &query).await.unwrap();
        assert_eq!(view.row_count, 1);
    }
}
