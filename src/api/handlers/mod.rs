//! API route handlers
//!
//! Request handling logic for all API endpoints:
//! - Liveness
//! - Machine list and dashboard view for a filter selection
//! - Report generation, download and cache control

mod dashboard;
mod reports;
mod status;

pub use dashboard::*;
pub use reports::*;
pub use status::*;

use std::sync::Arc;
use std::time::Instant;

use axum::response::Response;

use super::envelope::{error_response, ErrorCode};
use crate::cache::LoadCache;
use crate::config::DashboardConfig;
use crate::filter::FilterError;
use crate::llm::ChatCompletion;
use crate::report::{ReportError, ReportService};
use crate::sensors::{LoadError, SensorLog};

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct DashboardState {
    /// Parsed sensor log, loaded on first use
    pub cache: Arc<LoadCache>,
    pub config: Arc<DashboardConfig>,
    pub reports: ReportService,
    pub started_at: Instant,
}

impl DashboardState {
    /// State reading the configured CSV lazily.
    pub fn new(config: DashboardConfig, chat: Arc<dyn ChatCompletion>) -> Self {
        let cache = Arc::new(LoadCache::new(config.data.csv_path.clone()));
        Self::with_cache(config, cache, chat)
    }

    pub fn with_cache(
        config: DashboardConfig,
        cache: Arc<LoadCache>,
        chat: Arc<dyn ChatCompletion>,
    ) -> Self {
        let reports = ReportService::new(&config, chat);
        Self {
            cache,
            config: Arc::new(config),
            reports,
            started_at: Instant::now(),
        }
    }

    /// Cached log; a cold cache parses the CSV on a blocking worker.
    pub async fn log(&self) -> Result<Arc<SensorLog>, Response> {
        if self.cache.is_loaded() {
            if let Ok(log) = self.cache.get() {
                return Ok(log);
            }
        }
        let cache = Arc::clone(&self.cache);
        match tokio::task::spawn_blocking(move || cache.get()).await {
            Ok(Ok(log)) => Ok(log),
            Ok(Err(e)) => Err(load_error_response(&e)),
            Err(e) => {
                tracing::error!(error = %e, "Sensor log loader task failed");
                Err(error_response(ErrorCode::Internal, "sensor log loader failed"))
            }
        }
    }
}

// ============================================================================
// Error mapping
// ============================================================================

pub(crate) fn load_error_response(e: &LoadError) -> Response {
    tracing::error!(error = %e, "Failed to load sensor log");
    error_response(ErrorCode::Internal, e.to_string())
}

pub(crate) fn filter_error_response(e: &FilterError) -> Response {
    match e {
        FilterError::EmptyLog | FilterError::UnknownMachine(_) => {
            error_response(ErrorCode::NotFound, e.to_string())
        }
        FilterError::BadTime(_) | FilterError::InvertedRange { .. } => {
            error_response(ErrorCode::BadRequest, e.to_string())
        }
    }
}

pub(crate) fn report_error_response(e: &ReportError) -> Response {
    match e {
        ReportError::MissingCredential => error_response(ErrorCode::MissingCredential, e.to_string()),
        ReportError::Render(_) | ReportError::Api(_) => {
            tracing::warn!(error = %e, "Report generation failed");
            error_response(ErrorCode::ReportFailed, e.to_string())
        }
        ReportError::Io { .. } | ReportError::Serialize(_) | ReportError::Worker(_) => {
            tracing::error!(error = %e, "Report generation failed");
            error_response(ErrorCode::Internal, e.to_string())
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::llm::ApiError;
    use async_trait::async_trait;

    pub const FIXTURE_CSV: &str = "\
timestamp,machine_id,temperature,vibration,humidity,pressure,energy_consumption,predicted_remaining_life,maintenance_required,failure_type
2025-05-01 09:00:00,M1,70.1,0.5,40,101.2,3.2,320,0,Normal
2025-05-01 09:10:00,M1,75.4,0.9,41,101.0,3.6,140,1,Bearing
2025-05-01 09:25:00,M1,71.0,0.6,40,101.1,3.3,95,0,Normal
2025-05-01 09:05:00,M2,66.0,0.4,39,100.9,2.8,410,0,
";

    pub struct CannedChat;

    #[async_trait]
    impl ChatCompletion for CannedChat {
        async fn complete(&self, _api_key: &str, _prompt: &str) -> Result<String, ApiError> {
            Ok("# Canned report\n".to_string())
        }

        fn backend_name(&self) -> &'static str {
            "canned"
        }
    }

    /// State over a temp CSV and temp report directory. Keep the returned
    /// guard alive for the duration of the test.
    pub fn test_state() -> (DashboardState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("sensors.csv");
        std::fs::write(&csv, FIXTURE_CSV).unwrap();

        let mut config = DashboardConfig::default();
        config.data.csv_path = csv;
        config.report.output_dir = dir.path().join("reports");
        (DashboardState::new(config, Arc::new(CannedChat)), dir)
    }

    pub async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_log_loads_once() {
        let (state, _dir) = test_state();
        assert!(!state.cache.is_loaded());
        let first = state.log().await.unwrap();
        let second = state.log().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(state.cache.load_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_csv_is_500() {
        let (state, dir) = test_state();
        std::fs::remove_file(dir.path().join("sensors.csv")).unwrap();
        let response = state.log().await.unwrap_err();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_filter_error_status_codes() {
        assert_eq!(
            filter_error_response(&FilterError::UnknownMachine("X".into())).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            filter_error_response(&FilterError::BadTime("25:99".into())).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_report_error_status_codes() {
        assert_eq!(
            report_error_response(&ReportError::MissingCredential).status(),
            StatusCode::BAD_REQUEST
        );
        let api = ReportError::Api(crate::llm::ApiError::EmptyContent);
        assert_eq!(report_error_response(&api).status(), StatusCode::BAD_GATEWAY);
    }
}
