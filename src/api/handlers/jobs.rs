//! Job handlers: board, posting, expiry and applying.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};

use crate::api::dto::{
    ApplyResponse, CreateJobRequest, JobBoardResponse, JobResponse, OwnedJobsResponse,
};
use crate::app_state::AppState;
use crate::auth::{AuthUser, MaybeAuthUser};
use crate::domain::JobId;
use crate::error::{ErrorResponse, PortalError};

/// `GET /api/jobs` — Every job, active first.
///
/// # Errors
///
/// Returns [`PortalError`] on store failure.
#[utoipa::path(
    get,
    path = "/api/jobs",
    tag = "Jobs",
    summary = "List jobs",
    description = "Lists active and expired jobs. With a valid bearer token each job also carries the caller's `hasApplied` and `applicationStatus`.",
    responses(
        (status = 200, description = "Job board", body = JobBoardResponse),
    ),
    security((), ("bearer_auth" = []))
)]
pub async fn list_jobs(
    State(state): State<AppState>,
    MaybeAuthUser(viewer): MaybeAuthUser,
) -> Result<impl IntoResponse, PortalError> {
    let board = state.job_service.list_jobs(viewer).await?;
    let data: Vec<_> = board.jobs.into_iter().map(Into::into).collect();
    Ok(Json(JobBoardResponse {
        success: true,
        message: "Jobs retrieved successfully".to_string(),
        count: data.len(),
        active_count: board.active_count,
        expired_count: board.expired_count,
        data,
    }))
}

/// `GET /api/jobs/active` — Alias of `GET /api/jobs`.
///
/// # Errors
///
/// Returns [`PortalError`] on store failure.
#[utoipa::path(
    get,
    path = "/api/jobs/active",
    tag = "Jobs",
    summary = "List jobs (alias)",
    responses(
        (status = 200, description = "Job board", body = JobBoardResponse),
    ),
    security((), ("bearer_auth" = []))
)]
pub async fn list_active_jobs(
    state: State<AppState>,
    viewer: MaybeAuthUser,
) -> Result<impl IntoResponse, PortalError> {
    list_jobs(state, viewer).await
}

/// `POST /api/jobs` — Post a job.
///
/// # Errors
///
/// Returns [`PortalError`] for a non-HR caller or a blank field.
#[utoipa::path(
    post,
    path = "/api/jobs",
    tag = "Jobs",
    summary = "Create job",
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Job created", body = JobResponse),
        (status = 400, description = "Missing field", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not HR", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_job(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    payload: Result<Json<CreateJobRequest>, JsonRejection>,
) -> Result<impl IntoResponse, PortalError> {
    let Json(req) = payload?;
    let job = state.job_service.create_job(principal, req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(JobResponse {
            success: true,
            message: "Job created successfully".to_string(),
            data: job.into(),
        }),
    ))
}

/// `GET /api/jobs/hr/my-jobs` — The caller's postings.
///
/// # Errors
///
/// Returns [`PortalError`] for a non-HR caller.
#[utoipa::path(
    get,
    path = "/api/jobs/hr/my-jobs",
    tag = "Jobs",
    summary = "List my jobs",
    responses(
        (status = 200, description = "Jobs posted by the caller", body = OwnedJobsResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not HR", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn my_jobs(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<impl IntoResponse, PortalError> {
    let jobs = state.job_service.jobs_for_owner(principal).await?;
    let data: Vec<_> = jobs.into_iter().map(Into::into).collect();
    Ok(Json(OwnedJobsResponse {
        success: true,
        message: "Jobs retrieved successfully".to_string(),
        count: data.len(),
        data,
    }))
}

/// `PATCH /api/jobs/{id}/expire` — Mark one of the caller's jobs expired.
///
/// # Errors
///
/// Returns [`PortalError`] if the job is missing or not the caller's.
#[utoipa::path(
    patch,
    path = "/api/jobs/{id}/expire",
    tag = "Jobs",
    summary = "Expire job",
    description = "Marks the job expired and broadcasts `job-expired` to connected listeners. Repeating the call succeeds without a second event.",
    params(("id" = i64, Path, description = "Job id")),
    responses(
        (status = 200, description = "Job expired", body = JobResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not HR or not the owner", body = ErrorResponse),
        (status = 404, description = "Job not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn expire_job(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    id: Result<Path<JobId>, PathRejection>,
) -> Result<impl IntoResponse, PortalError> {
    let Path(id) = id?;
    let job = state.job_service.expire_job(principal, id).await?;
    Ok(Json(JobResponse {
        success: true,
        message: "Job marked as expired".to_string(),
        data: job.into(),
    }))
}

/// `POST /api/jobs/{id}/apply` — Apply to a job.
///
/// # Errors
///
/// Returns [`PortalError`] if the job is missing or expired, or the caller
/// already applied (`hasApplied: true` in the body).
#[utoipa::path(
    post,
    path = "/api/jobs/{id}/apply",
    tag = "Jobs",
    summary = "Apply to job",
    description = "Creates a pending application and broadcasts `new-application` to connected listeners.",
    params(("id" = i64, Path, description = "Job id")),
    responses(
        (status = 201, description = "Application submitted", body = ApplyResponse),
        (status = 400, description = "Job is expired", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not a job seeker", body = ErrorResponse),
        (status = 404, description = "Job not found", body = ErrorResponse),
        (status = 409, description = "Already applied", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn apply(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    id: Result<Path<JobId>, PathRejection>,
) -> Result<impl IntoResponse, PortalError> {
    let Path(id) = id?;
    let application = state.job_service.apply(principal, id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApplyResponse {
            success: true,
            message: "Application submitted successfully".to_string(),
            data: application.into(),
            has_applied: true,
        }),
    ))
}

/// Job routes, mounted under `/api/jobs`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_jobs).post(create_job))
        .route("/active", get(list_active_jobs))
        .route("/hr/my-jobs", get(my_jobs))
        .route("/{id}/expire", patch(expire_job))
        .route("/{id}/apply", post(apply))
}
