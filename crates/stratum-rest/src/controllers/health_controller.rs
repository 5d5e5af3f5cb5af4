//! Health check controller.

use crate::state::AppState;
use axum::{
    extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router,
};
use serde::Serialize;
use stratum_core::HealthStatus;
use utoipa::ToSchema;

/// Health of one dependency.
#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentHealth {
    pub name: String,
    /// `healthy`, `degraded` or `unhealthy`.
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Worst status across all components.
    pub status: String,
    /// Application version.
    pub version: String,
    pub components: Vec<ComponentHealth>,
}

/// Creates the health router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/live", get(liveness_check))
}

async fn run_checks(state: &AppState) -> Vec<(String, HealthStatus)> {
    let mut results = Vec::with_capacity(state.health_checks.len());
    for check in &state.health_checks {
        results.push((check.name().to_string(), check.check().await));
    }
    results
}

fn status_label(status: &HealthStatus) -> &'static str {
    match status {
        HealthStatus::Healthy => "healthy",
        HealthStatus::Degraded(_) => "degraded",
        HealthStatus::Unhealthy(_) => "unhealthy",
    }
}

/// Health check endpoint.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Component health report", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let results = run_checks(&state).await;

    let overall = if results.iter().any(|(_, s)| s.is_unhealthy()) {
        "unhealthy"
    } else if results.iter().all(|(_, s)| s.is_healthy()) {
        "healthy"
    } else {
        "degraded"
    };

    let components = results
        .into_iter()
        .map(|(name, status)| ComponentHealth {
            status: status_label(&status).to_string(),
            message: match status {
                HealthStatus::Healthy => None,
                HealthStatus::Degraded(m) | HealthStatus::Unhealthy(m) => Some(m),
            },
            name,
        })
        .collect();

    Json(HealthResponse {
        status: overall.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        components,
    })
}

/// Readiness check endpoint. Degraded components do not block readiness.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready"),
        (status = 503, description = "A dependency is unhealthy")
    )
)]
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let results = run_checks(&state).await;
    if results.iter().any(|(_, s)| s.is_unhealthy()) {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    }
}

/// Liveness check endpoint.
#[utoipa::path(
    get,
    path = "/live",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive")
    )
)]
pub async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}
