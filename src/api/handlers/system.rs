//! System endpoints: service info and health check.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;

use crate::api::dto::{HealthResponse, ServiceInfoResponse};
use crate::app_state::AppState;

/// `GET /` — Service banner.
#[utoipa::path(
    get,
    path = "/",
    tag = "System",
    summary = "Service info",
    description = "Confirms the API is running and whether real-time notifications are enabled.",
    responses(
        (status = 200, description = "Service is running", body = ServiceInfoResponse),
    )
)]
pub async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(ServiceInfoResponse {
        success: true,
        message: "Job portal API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        realtime: state.event_bus.is_some(),
    })
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health, version, current timestamp and the number of live real-time connections.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let connections = match &state.event_bus {
        Some(bus) => bus.connection_count().await,
        None => 0,
    };
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            realtime: state.event_bus.is_some(),
            connections,
        }),
    )
}

/// System routes mounted at the root level.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
}
