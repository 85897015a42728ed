//! Trialscope REST API
//!
//! HTTP API layer for Trialscope, built with Axum. Every data endpoint is a
//! thin proxy: validate the request, fetch from the upstream, reshape the
//! JSON, respond.
//!
//! # Endpoints
//!
//! ## Trials
//! - `GET /api/v1/trials/search` - Search studies by condition
//! - `GET /api/v1/trials/:id` - Full study detail
//!
//! ## Vaccines
//! - `GET /api/v1/coverage` - Coverage GeoJSON for one vaccine and year
//! - `GET /api/v1/vaccine-data` - Indicator catalogue or per-indicator GeoJSON
//!
//! ## Outbreaks
//! - `GET /api/v1/outbreaks` - Outbreak GeoJSON for one disease
//!
//! ## AI Analysis
//! - `POST /api/v1/genetics/analyze` - Free-text genetic analysis
//! - `POST /api/v1/genetics/report` - Structured genetic report
//! - `POST /api/v1/healthbench` - Rank trials for a patient profile
//!
//! ## Health
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use trialscope::api::{build_router, serve, ApiConfig, AppState};
//! use trialscope::upstream::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let state = AppState::new(
//!         Arc::new(ClinicalTrialsClient::new(ClinicalTrialsConfig::default())),
//!         Arc::new(WhoGhoClient::new(WhoGhoConfig::default())),
//!         Arc::new(SnpediaClient::new(SnpediaConfig::default())),
//!         None,
//!         Arc::new(RateLimiter::new(RateLimitConfig::default())),
//!         ApiConfig::default(),
//!     );
//!     serve(state, &ApiConfig::default()).await?;
//!     Ok(())
//! }
//! ```

pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the API router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let max_body_size = state.config.max_body_size;

    let api_routes = Router::new()
        // Trial routes
        .route("/trials/search", get(routes::trials::search_trials))
        .route("/trials/:id", get(routes::trials::get_trial))
        // Vaccine routes
        .route("/coverage", get(routes::coverage::vaccine_coverage))
        .route("/vaccine-data", get(routes::vaccine_data::vaccine_data))
        // Outbreak routes
        .route("/outbreaks", get(routes::outbreaks::outbreaks))
        // AI analysis routes
        .route("/genetics/analyze", post(routes::genetics::analyze_genetics))
        .route("/genetics/report", post(routes::genetics::genetic_report))
        .route("/healthbench", post(routes::healthbench::evaluate_trials))
        .layer(DefaultBodyLimit::max(max_body_size));

    let health_routes = Router::new()
        .route("/live", get(routes::health::liveness))
        .route("/ready", get(routes::health::readiness))
        .route("/", get(routes::health::full_health));

    // Create shared state
    let shared_state = Arc::new(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .nest("/health", health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()) // Configure properly in production
        .with_state(shared_state)
}

/// Start the API server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Trialscope API listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Trialscope API shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::{
        ClinicalTrialsClient, ClinicalTrialsConfig, RateLimitConfig, RateLimiter, SnpediaClient,
        SnpediaConfig, WhoGhoClient, WhoGhoConfig,
    };
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    // Validation tests only: requests below are rejected before any
    // upstream call is made, so the default client URLs are never hit.
    fn create_test_app() -> Router {
        let state = AppState::new(
            Arc::new(ClinicalTrialsClient::new(ClinicalTrialsConfig::default())),
            Arc::new(WhoGhoClient::new(WhoGhoConfig::default())),
            Arc::new(SnpediaClient::new(SnpediaConfig::default())),
            None,
            Arc::new(RateLimiter::new(RateLimitConfig::default())),
            ApiConfig::default(),
        );
        build_router(state)
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_live() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/live")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_ready() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health/ready")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_health_full() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["ai_analysis"], "disabled");
    }

    #[tokio::test]
    async fn test_search_requires_condition() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/trials/search")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn test_coverage_requires_vaccine_and_year() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/coverage?vaccine=measles")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_coverage_rejects_unknown_vaccine() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/coverage?vaccine=smallpox&year=2022")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("invalid vaccine"));
    }

    #[tokio::test]
    async fn test_outbreaks_requires_disease() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/outbreaks")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_outbreaks_rejects_unknown_disease() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/outbreaks?disease=dragonpox")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("measles"));
    }

    #[tokio::test]
    async fn test_outbreaks_rejects_unknown_severity() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/outbreaks?disease=measles&severity=apocalyptic")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_requires_fields() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/genetics/analyze")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"symptoms": []}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_analyze_without_completions_configured() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/genetics/analyze")
                    .header("Content-Type", "application/json")
                    .body(Body::from(
                        r#"{"symptoms": ["fatigue"], "genetic_data": {"rs53576": "AA"}}"#,
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("not configured"));
    }

    #[tokio::test]
    async fn test_report_requires_symptoms() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/genetics/report")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"family_history": "diabetes"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_healthbench_requires_profile_and_trials() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/healthbench")
                    .header("Content-Type", "application/json")
                    .body(Body::from(r#"{"trials": []}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_invalid_json_body() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/healthbench")
                    .header("Content-Type", "application/json")
                    .body(Body::from("not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_wrong_method_is_rejected() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/healthbench")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_rate_limiter_rejects_after_quota() {
        let state = AppState::new(
            Arc::new(ClinicalTrialsClient::new(ClinicalTrialsConfig::default())),
            Arc::new(WhoGhoClient::new(WhoGhoConfig::default())),
            Arc::new(SnpediaClient::new(SnpediaConfig::default())),
            None,
            Arc::new(RateLimiter::new(RateLimitConfig {
                max_requests: 1,
                window: std::time::Duration::from_secs(60),
            })),
            ApiConfig::default(),
        );
        let app = build_router(state);

        let request = || {
            Request::builder()
                .method("POST")
                .uri("/api/v1/genetics/analyze")
                .header("Content-Type", "application/json")
                .body(Body::from(
                    r#"{"symptoms": ["fatigue"], "genetic_data": {"rs53576": "AA"}}"#,
                ))
                .unwrap()
        };

        // first request passes the limiter (then fails on missing completions)
        let first = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(first.status(), StatusCode::BAD_REQUEST);

        let second = app.oneshot(request()).await.unwrap();
        assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = body_json(second).await;
        assert_eq!(body["error"]["code"], "RATE_LIMITED");
    }
}
