//! API route definitions

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{self, DashboardState};

/// Routes nested under `/api/v1`
pub fn api_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/machines", get(handlers::get_machines))
        .route("/dashboard", get(handlers::get_dashboard))
        .route("/report", post(handlers::create_report))
        .route("/reports/:file_name", get(handlers::download_report))
        .route("/cache/clear", post(handlers::clear_cache))
        .with_state(state)
}

/// Liveness endpoint at root level
pub fn health_routes(state: DashboardState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::handlers::test_support::{body_json, test_state};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_health_route() {
        let (state, _dir) = test_state();
        let response = health_routes(state)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let v = body_json(response).await;
        assert_eq!(v["status"], "ok");
    }

    #[tokio::test]
    async fn test_machines_route() {
        let (state, _dir) = test_state();
        let response = api_routes(state)
            .oneshot(Request::builder().uri("/machines").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let v = body_json(response).await;
        let ids: Vec<&str> = v["data"]["machines"]
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["machine_id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["M1", "M2"]);
    }

    #[tokio::test]
    async fn test_dashboard_route_with_query() {
        let (state, _dir) = test_state();
        let response = api_routes(state)
            .oneshot(
                Request::builder()
                    .uri("/dashboard?machine=M1&start_time=09:00&end_time=09:30")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let v = body_json(response).await;
        assert_eq!(v["data"]["banner"]["machine"], "M1");
        assert_eq!(v["data"]["banner"]["time"], "09:00 ~ 09:30");
        assert_eq!(v["data"]["row_count"], 3);
    }

    #[tokio::test]
    async fn test_dashboard_unknown_machine_is_404() {
        let (state, _dir) = test_state();
        let response = api_routes(state)
            .oneshot(
                Request::builder()
                    .uri("/dashboard?machine=NOPE")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let v = body_json(response).await;
        assert_eq!(v["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_dashboard_inverted_time_is_400() {
        let (state, _dir) = test_state();
        let response = api_routes(state)
            .oneshot(
                Request::builder()
                    .uri("/dashboard?start_time=10:00&end_time=09:00")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_report_without_key_is_400() {
        let (state, _dir) = test_state();
        let response = api_routes(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/report")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"machine":"M1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let v = body_json(response).await;
        assert_eq!(v["error"]["code"], "MISSING_CREDENTIAL");
    }

    #[tokio::test]
    async fn test_report_then_download() {
        let (state, _dir) = test_state();
        let app = api_routes(state);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/report")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"api_key":"sk-test","machine":"M1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let v = body_json(response).await;
        let file_name = v["data"]["file_name"].as_str().unwrap().to_string();
        assert_eq!(file_name, "smart_factory_report_M1_2025-05-01_2025-05-01.md");
        assert_eq!(
            v["data"]["download_url"],
            format!("/api/v1/reports/{file_name}")
        );

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("/reports/{file_name}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response
            .headers()
            .get("content-disposition")
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.starts_with("attachment"));
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"# Canned report\n");
    }

    #[tokio::test]
    async fn test_download_missing_report_is_404() {
        let (state, _dir) = test_state();
        let response = api_routes(state)
            .oneshot(
                Request::builder()
                    .uri("/reports/absent.md")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_cache_clear_forces_reload() {
        let (state, _dir) = test_state();
        let cache = std::sync::Arc::clone(&state.cache);
        let app = api_routes(state);

        let get_machines = || Request::builder().uri("/machines").body(Body::empty()).unwrap();
        app.clone().oneshot(get_machines()).await.unwrap();
        assert_eq!(cache.load_count(), 1);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/cache/clear")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(!cache.is_loaded());

        app.oneshot(get_machines()).await.unwrap();
        assert_eq!(cache.load_count(), 2);
    }
}
