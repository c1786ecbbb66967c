//! API Regression Tests
//!
//! In-process tests that build the Axum app via `create_app()` and exercise
//! the /api/v1/* endpoints using `tower::ServiceExt::oneshot()`.
//! No binary spawn, no network port.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use smart_factory::api::{create_app, DashboardState};
use smart_factory::llm::{ApiError, ChatCompletion};
use smart_factory::DashboardConfig;

const SENSORS: &str = "\
timestamp,machine_id,temperature,vibration,humidity,pressure,energy_consumption,predicted_remaining_life,maintenance_required,failure_type
2025-02-01 08:00:00,B-2,60.0,0.30,35.0,100.0,2.0,450,0,Normal
2025-02-02 08:00:00,A-1,70.0,0.50,40.0,101.0,3.0,300,0,Normal
2025-02-02 08:20:00,A-1,82.0,1.10,43.0,101.9,3.9,90,1,Overheat
";

struct UnusedChat;

#[async_trait]
impl ChatCompletion for UnusedChat {
    async fn complete(&self, _api_key: &str, _prompt: &str) -> Result<String, ApiError> {
        Err(ApiError::EmptyContent)
    }

    fn backend_name(&self) -> &'static str {
        "unused"
    }
}

fn create_test_app() -> (axum::Router, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("sensors.csv");
    std::fs::write(&csv, SENSORS).unwrap();

    let mut config = DashboardConfig::default();
    config.data.csv_path = csv;
    config.report.output_dir = dir.path().join("reports");
    (create_app(DashboardState::new(config, Arc::new(UnusedChat))), dir)
}

async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

/// All GET endpoints should return 200 with the envelope.
#[tokio::test]
async fn test_get_endpoints_return_200() {
    let (app, _dir) = create_test_app();

    for endpoint in ["/api/v1/machines", "/api/v1/dashboard"] {
        let (status, body) = get_json(&app, endpoint).await;
        assert_eq!(status, StatusCode::OK, "{endpoint} returned {status}");
        assert_eq!(body["meta"]["version"], "1", "{endpoint} missing meta");
        assert!(body.get("data").is_some(), "{endpoint} missing data");
    }

    let (status, body) = get_json(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_machines_are_sorted_with_bounds() {
    let (app, _dir) = create_test_app();
    let (_, body) = get_json(&app, "/api/v1/machines").await;

    let machines = body["data"]["machines"].as_array().unwrap();
    assert_eq!(machines[0]["machine_id"], "A-1");
    assert_eq!(machines[0]["readings"], 2);
    assert_eq!(machines[1]["machine_id"], "B-2");
    assert_eq!(machines[1]["first_date"], "2025-02-01");
    assert_eq!(body["data"]["skipped_rows"], 0);
}

#[tokio::test]
async fn test_dashboard_shape() {
    let (app, _dir) = create_test_app();
    let (status, body) = get_json(&app, "/api/v1/dashboard?machine=A-1").await;
    assert_eq!(status, StatusCode::OK);

    let data = &body["data"];
    assert_eq!(data["banner"]["date"], "2025-02-02 ~ 2025-02-02");
    assert_eq!(data["row_count"], 2);
    assert_eq!(data["kpis"].as_array().unwrap().len(), 5);
    assert_eq!(data["gauge"]["level"], "critical");
    assert_eq!(
        data["scatter_summary"]["failure_type_distribution"]["Overheat"],
        1
    );
}

#[tokio::test]
async fn test_dates_outside_bounds_are_clamped() {
    let (app, _dir) = create_test_app();
    let (status, body) = get_json(
        &app,
        "/api/v1/dashboard?machine=A-1&start_date=2024-01-01&end_date=2030-01-01",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["banner"]["date"], "2025-02-02 ~ 2025-02-02");
}

#[tokio::test]
async fn test_malformed_query_is_400() {
    let (app, _dir) = create_test_app();
    let (status, body) = get_json(&app, "/api/v1/dashboard?start_date=not-a-date").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, _) = get_json(&app, "/api/v1/dashboard?start_time=25:99").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_download_rejects_traversal() {
    let (app, _dir) = create_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/reports/..%2Fsensors.md")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_report_body_is_400_envelope() {
    let (app, _dir) = create_test_app();
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/report")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"api_key": "sk-test", "machine": "#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}
