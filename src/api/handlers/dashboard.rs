//! HR dashboard handler.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::DashboardResponse;
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::error::{ErrorResponse, PortalError};

/// `GET /api/dashboard` — Job and application counters for the caller.
///
/// Also served at `/api/dashboard/stats` and `/api/stats`.
///
/// # Errors
///
/// Returns [`PortalError`] for a non-HR caller.
#[utoipa::path(
    get,
    path = "/api/dashboard",
    tag = "Dashboard",
    summary = "HR dashboard",
    responses(
        (status = 200, description = "Counters", body = DashboardResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not HR", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn dashboard(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<impl IntoResponse, PortalError> {
    let stats = state.application_service.dashboard(principal).await?;
    Ok(Json(DashboardResponse {
        success: true,
        message: "Dashboard analytics retrieved successfully".to_string(),
        data: stats.into(),
    }))
}

/// Dashboard routes, mounted under both `/api/dashboard` and `/api/stats`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard))
        .route("/stats", get(dashboard))
}
