//! Portal error types with HTTP status code mapping.
//!
//! [`PortalError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{JobId, ResumeId, UserId};

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "success": false,
///   "error": {
///     "code": 2101,
///     "message": "you have already applied for this job"
///   },
///   "hasApplied": true
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Always `false` for errors.
    pub success: bool,
    /// Structured error payload.
    pub error: ErrorBody,
    /// Present only for duplicate applications so clients can tell
    /// "already applied" apart from other failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_applied: Option<bool>,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges on [`PortalError`]).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category          | HTTP Status                  |
/// |-----------|-------------------|------------------------------|
/// | 1000–1999 | Validation        | 400 Bad Request              |
/// | 2000–2999 | Not Found/Conflict| 404 Not Found / 409 Conflict |
/// | 3000–3999 | Server            | 500 / 503                    |
/// | 4000–4999 | Auth              | 401 Unauthorized / 403 Forbidden |
#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Application attempted against a job that is no longer active.
    #[error("cannot apply to an expired job")]
    JobNotActive(JobId),

    /// Job with the given ID was not found.
    #[error("job not found: {0}")]
    JobNotFound(JobId),

    /// Resume with the given ID was not found.
    #[error("resume not found: {0}")]
    ResumeNotFound(ResumeId),

    /// The resume record exists but its file is gone from storage.
    #[error("resume file not found: {0}")]
    ResumeFileMissing(ResumeId),

    /// The applicant already has an application for this job.
    #[error("you have already applied for this job")]
    AlreadyApplied {
        /// Target job.
        job_id: JobId,
        /// Applicant.
        user_id: UserId,
    },

    /// Registration with an email that is already in use.
    #[error("a user with this email already exists")]
    EmailTaken,

    /// Missing, malformed, or expired credential.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Valid credential, but wrong role or not the resource owner.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Resume file storage failure.
    #[error("storage error: {0}")]
    StorageError(String),

    /// The real-time bus is disabled on this instance.
    #[error("real-time notifications are not available")]
    RealtimeUnavailable,

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PortalError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::JobNotActive(_) => 1002,
            Self::JobNotFound(_) => 2001,
            Self::ResumeNotFound(_) => 2002,
            Self::ResumeFileMissing(_) => 2003,
            Self::AlreadyApplied { .. } => 2101,
            Self::EmailTaken => 2102,
            Self::Internal(_) => 3000,
            Self::PersistenceError(_) => 3001,
            Self::RealtimeUnavailable => 3002,
            Self::StorageError(_) => 3003,
            Self::Unauthorized(_) => 4001,
            Self::Forbidden(_) => 4003,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::JobNotActive(_) => StatusCode::BAD_REQUEST,
            Self::JobNotFound(_) | Self::ResumeNotFound(_) | Self::ResumeFileMissing(_) => {
                StatusCode::NOT_FOUND
            }
            Self::AlreadyApplied { .. } | Self::EmailTaken => StatusCode::CONFLICT,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::PersistenceError(_) | Self::StorageError(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::RealtimeUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    /// Returns `Some(true)` for duplicate applications, `None` otherwise.
    #[must_use]
    pub const fn has_applied(&self) -> Option<bool> {
        match self {
            Self::AlreadyApplied { .. } => Some(true),
            _ => None,
        }
    }
}

impl From<JsonRejection> for PortalError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for PortalError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<MultipartRejection> for PortalError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorResponse {
            success: false,
            has_applied: self.has_applied(),
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}
