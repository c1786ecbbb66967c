//! Report generation, download, and cache control

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::dashboard::resolve_view;
use super::{report_error_response, DashboardState};
use crate::api::envelope::{error_response, ApiResponse, ErrorCode};
use crate::filter::FilterQuery;
use crate::report::{GeneratedReport, ReportError};

// ============================================================================
// Generate
// ============================================================================

/// POST body: the chat API key plus the same selection as the dashboard query.
#[derive(Debug, Default, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(flatten)]
    pub filter: FilterQuery,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    #[serde(flatten)]
    pub report: GeneratedReport,
    pub download_url: String,
}

/// POST /api/v1/report - Render charts, ask the LLM, and store the report
pub async fn create_report(
    State(state): State<DashboardState>,
    request: Result<Json<ReportRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(body) => body,
        Err(rejection) => return error_response(ErrorCode::BadRequest, rejection.body_text()),
    };

    // A missing key is reported before the CSV is touched
    let api_key = match request.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => key.to_string(),
        _ => return report_error_response(&ReportError::MissingCredential),
    };

    let view = match resolve_view(&state, &request.filter).await {
        Ok(view) => view,
        Err(response) => return response,
    };

    match state.reports.generate(&api_key, &view).await {
        Ok(report) => {
            let download_url = format!("/api/v1/reports/{}", report.file_name);
            ApiResponse::ok(ReportResponse {
                report,
                download_url,
            })
        }
        Err(e) => report_error_response(&e),
    }
}

// ============================================================================
// Download
// ============================================================================

/// GET /api/v1/reports/:file_name - Serve a generated report as a markdown attachment
pub async fn download_report(
    State(state): State<DashboardState>,
    Path(file_name): Path<String>,
) -> Response {
    match state.reports.read(&file_name).await {
        Ok(Some(text)) => {
            let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{file_name}\""))
                .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
            (
                StatusCode::OK,
                [
                    (
                        header::CONTENT_TYPE,
                        HeaderValue::from_static("text/markdown; charset=utf-8"),
                    ),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                text,
            )
                .into_response()
        }
        Ok(None) => error_response(ErrorCode::NotFound, format!("no report named '{file_name}'")),
        Err(e) => report_error_response(&e),
    }
}

// ============================================================================
// Cache
// ============================================================================

#[derive(Debug, Serialize)]
pub struct CacheClearResponse {
    pub cleared: bool,
}

/// POST /api/v1/cache/clear - Drop the parsed log so the next request re-reads the CSV
pub async fn clear_cache(State(state): State<DashboardState>) -> Response {
    let cleared = state.cache.is_loaded();
    state.cache.invalidate();
    info!(path = %state.cache.path().display(), "Cache cleared via API");
    ApiResponse::ok(CacheClearResponse { cleared })
}
