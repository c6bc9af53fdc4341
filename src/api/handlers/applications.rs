//! Application listing handlers.

use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::ApplicationListResponse;
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::domain::JobId;
use crate::error::{ErrorResponse, PortalError};

const RETRIEVED: &str = "Applications retrieved successfully";

/// `GET /api/applications` — Received (HR) or submitted (USER) applications.
///
/// # Errors
///
/// Returns [`PortalError`] on store failure.
#[utoipa::path(
    get,
    path = "/api/applications",
    tag = "Applications",
    summary = "List my applications by role",
    description = "HR callers get applications received across their jobs; job seekers get the applications they submitted.",
    responses(
        (status = 200, description = "Applications", body = ApplicationListResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_for_caller(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<impl IntoResponse, PortalError> {
    let views = state.application_service.for_principal(principal).await?;
    Ok(Json(ApplicationListResponse::new(views, RETRIEVED)))
}

/// `GET /api/applications/hr/all` — Applications across the caller's jobs.
///
/// # Errors
///
/// Returns [`PortalError`] for a non-HR caller.
#[utoipa::path(
    get,
    path = "/api/applications/hr/all",
    tag = "Applications",
    summary = "List received applications",
    responses(
        (status = 200, description = "Applications", body = ApplicationListResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not HR", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_received(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<impl IntoResponse, PortalError> {
    let views = state.application_service.for_owner(principal).await?;
    Ok(Json(ApplicationListResponse::new(views, RETRIEVED)))
}

/// `GET /api/applications/job/{jobId}` — Applications for one of the
/// caller's jobs.
///
/// # Errors
///
/// Returns [`PortalError`] if the job is missing or not the caller's.
#[utoipa::path(
    get,
    path = "/api/applications/job/{jobId}",
    tag = "Applications",
    summary = "List applications for a job",
    params(("jobId" = i64, Path, description = "Job id")),
    responses(
        (status = 200, description = "Applications", body = ApplicationListResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not HR or not the owner", body = ErrorResponse),
        (status = 404, description = "Job not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_for_job(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    job_id: Result<Path<JobId>, PathRejection>,
) -> Result<impl IntoResponse, PortalError> {
    let Path(job_id) = job_id?;
    let views = state.application_service.for_job(principal, job_id).await?;
    Ok(Json(ApplicationListResponse::new(views, RETRIEVED)))
}

/// `GET /api/applications/my-applications` — Applications the caller
/// submitted.
///
/// # Errors
///
/// Returns [`PortalError`] for a non-USER caller.
#[utoipa::path(
    get,
    path = "/api/applications/my-applications",
    tag = "Applications",
    summary = "List submitted applications",
    responses(
        (status = 200, description = "Applications", body = ApplicationListResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not a job seeker", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_submitted(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<impl IntoResponse, PortalError> {
    let views = state.application_service.for_user(principal).await?;
    Ok(Json(ApplicationListResponse::new(
        views,
        "Your applications retrieved successfully",
    )))
}

/// Application routes, mounted under `/api/applications`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_for_caller))
        .route("/hr/all", get(list_received))
        .route("/job/{job_id}", get(list_for_job))
        .route("/my-applications", get(list_submitted))
}
