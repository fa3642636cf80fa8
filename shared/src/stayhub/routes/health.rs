// ============================================================================
// Health and Metrics Routes
// ============================================================================
//
// Endpoints:
// - GET /health - Liveness
// - GET /health/ready - Readiness (database round-trip when configured)
// - GET /metrics - Prometheus metrics
//
// ============================================================================

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

use crate::context::AppContext;

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

/// GET /health/ready
pub async fn readiness(State(app_context): State<Arc<AppContext>>) -> impl IntoResponse {
    let Some(pool) = app_context.db_pool.as_ref() else {
        return (StatusCode::OK, "OK");
    };

    match stayhub_db::ping(pool).await {
        Ok(()) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::error!("Readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "Service Unavailable")
        }
    }
}

/// GET /metrics
pub async fn metrics() -> impl IntoResponse {
    match stayhub_metrics::gather_metrics() {
        Ok(metrics_data) => (
            StatusCode::OK,
            [("Content-Type", "text/plain; version=0.0.4")],
            metrics_data,
        ),
        Err(e) => {
            tracing::error!("Failed to gather metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [("Content-Type", "text/plain")],
                "Internal Server Error".to_string(),
            )
        }
    }
}
