//! Liveness endpoint

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::DashboardState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    /// Whether the sensor log is currently cached
    pub data_loaded: bool,
}

/// GET /health - Liveness probe. Never touches the CSV.
pub async fn health_check(State(state): State<DashboardState>) -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        data_loaded: state.cache.is_loaded(),
    })
}
