//! Health check endpoints for load balancers and monitoring.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// "ok" when the process is serving requests, "unavailable" otherwise.
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Liveness check. Succeeds whenever the process can answer.
#[tracing::instrument(name = "health.check")]
pub async fn health_check() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        timestamp: Utc::now(),
    })
}

/// Readiness check. Fails with 503 while the database is unreachable.
#[tracing::instrument(name = "health.readiness", skip(state))]
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let (code, status) = match state.db.health_check().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(err) => {
            tracing::warn!(error = %err, "Database health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    (
        code,
        Json(HealthStatus {
            status,
            timestamp: Utc::now(),
        }),
    )
}
