//! Resume handlers: upload, listing, links, download and delete. HR only.

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::PathRejection;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};

use crate::api::dto::{
    DeleteResumeResponse, DeletedResumeDto, ResumeListResponse, ResumeUploadForm,
    ResumeUrlResponse, UploadResponse,
};
use crate::app_state::AppState;
use crate::auth::AuthUser;
use crate::config::MAX_RESUME_BYTES;
use crate::domain::{JobId, ResumeId};
use crate::error::{ErrorResponse, PortalError};
use crate::service::ResumeFile;
use crate::storage::sanitize_filename;

/// Multipart field names that carry resume files.
const FILE_FIELDS: [&str; 2] = ["resume", "resumes"];

fn multipart_error(e: &MultipartError) -> PortalError {
    PortalError::InvalidRequest(e.body_text())
}

async fn read_text(field: Field<'_>) -> Result<String, PortalError> {
    field.text().await.map_err(|e| multipart_error(&e))
}

/// Parsed upload form.
#[derive(Debug, Default)]
struct UploadForm {
    job: Option<JobId>,
    files: Vec<ResumeFile>,
    unexpected: Vec<String>,
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, PortalError> {
    let mut form = UploadForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "jobId" {
            let raw = read_text(field).await?;
            let raw = raw.trim();
            if !raw.is_empty() {
                let id = raw.parse::<JobId>().map_err(|_| {
                    PortalError::InvalidRequest(format!("jobId must be a number, got: {raw}"))
                })?;
                form.job = Some(id);
            }
            continue;
        }
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        if !FILE_FIELDS.contains(&name.as_str()) {
            form.unexpected.push(name);
            continue;
        }
        let contents = field.bytes().await.map_err(|e| multipart_error(&e))?;
        form.files.push(ResumeFile {
            filename,
            contents: contents.to_vec(),
        });
    }
    Ok(form)
}

/// `POST /api/resumes/upload` — Upload one or more resume files.
///
/// # Errors
///
/// Returns [`PortalError`] for a non-HR caller, a request without resume
/// files, or an unknown `jobId`.
#[utoipa::path(
    post,
    path = "/api/resumes/upload",
    tag = "Resumes",
    summary = "Upload resumes",
    description = "Multipart form with files under `resume` or `resumes` and an optional `jobId`. Accepts pdf, doc, docx, jpg, jpeg and png. Answers 207 when some files failed.",
    request_body(content = ResumeUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Every file stored", body = UploadResponse),
        (status = 207, description = "Some files failed", body = UploadResponse),
        (status = 400, description = "No files or wrong field name", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not HR", body = ErrorResponse),
        (status = 404, description = "Job not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn upload(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<impl IntoResponse, PortalError> {
    let form = read_form(multipart?).await?;
    if form.files.is_empty() && !form.unexpected.is_empty() {
        return Err(PortalError::InvalidRequest(format!(
            "Invalid field name. Expected 'resume' or 'resumes', but got: {}",
            form.unexpected.join(", ")
        )));
    }
    let outcome = state
        .resume_service
        .upload(principal, form.job, form.files)
        .await?;
    let status = if outcome.failed.is_empty() {
        StatusCode::OK
    } else {
        StatusCode::MULTI_STATUS
    };
    Ok((status, Json(UploadResponse::from(outcome))))
}

/// `GET /api/resumes` — The caller's resumes, newest first.
///
/// # Errors
///
/// Returns [`PortalError`] for a non-HR caller.
#[utoipa::path(
    get,
    path = "/api/resumes",
    tag = "Resumes",
    summary = "List my resumes",
    responses(
        (status = 200, description = "Resumes uploaded by the caller", body = ResumeListResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Caller is not HR", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn list(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
) -> Result<impl IntoResponse, PortalError> {
    let views = state.resume_service.list(principal).await?;
    let data: Vec<_> = views.into_iter().map(Into::into).collect();
    Ok(Json(ResumeListResponse {
        success: true,
        message: "Resumes retrieved successfully".to_string(),
        count: data.len(),
        data,
    }))
}

/// `GET /api/resumes/{id}/url` — Links to one of the caller's resumes.
///
/// # Errors
///
/// Returns [`PortalError`] if the resume is missing or not the caller's.
#[utoipa::path(
    get,
    path = "/api/resumes/{id}/url",
    tag = "Resumes",
    summary = "Resume links",
    params(("id" = i64, Path, description = "Resume id")),
    responses(
        (status = 200, description = "Links", body = ResumeUrlResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not HR or not the uploader", body = ErrorResponse),
        (status = 404, description = "Resume not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn url(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    id: Result<Path<ResumeId>, PathRejection>,
) -> Result<impl IntoResponse, PortalError> {
    let Path(id) = id?;
    let resume = state.resume_service.locate(principal, id).await?;
    Ok(Json(ResumeUrlResponse {
        success: true,
        data: resume.into(),
    }))
}

/// `GET /api/resumes/{id}/download` — The file contents as an attachment.
///
/// # Errors
///
/// Returns [`PortalError`] if the resume or its file is missing, or it is
/// not the caller's.
#[utoipa::path(
    get,
    path = "/api/resumes/{id}/download",
    tag = "Resumes",
    summary = "Download resume",
    params(("id" = i64, Path, description = "Resume id")),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not HR or not the uploader", body = ErrorResponse),
        (status = 404, description = "Resume or file not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn download(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    id: Result<Path<ResumeId>, PathRejection>,
) -> Result<impl IntoResponse, PortalError> {
    let Path(id) = id?;
    let download = state.resume_service.download(principal, id).await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        sanitize_filename(&download.resume.filename)
    );
    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.contents,
    ))
}

/// `DELETE /api/resumes/{id}` — Delete one of the caller's resumes.
///
/// # Errors
///
/// Returns [`PortalError`] if the resume is missing or not the caller's.
#[utoipa::path(
    delete,
    path = "/api/resumes/{id}",
    tag = "Resumes",
    summary = "Delete resume",
    params(("id" = i64, Path, description = "Resume id")),
    responses(
        (status = 200, description = "Resume deleted", body = DeleteResumeResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 403, description = "Not HR or not the uploader", body = ErrorResponse),
        (status = 404, description = "Resume not found", body = ErrorResponse),
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(principal): AuthUser,
    id: Result<Path<ResumeId>, PathRejection>,
) -> Result<impl IntoResponse, PortalError> {
    let Path(id) = id?;
    let resume = state.resume_service.delete(principal, id).await?;
    Ok(Json(DeleteResumeResponse {
        success: true,
        message: "Resume deleted successfully".to_string(),
        data: DeletedResumeDto {
            id: resume.id,
            filename: resume.filename,
        },
    }))
}

/// Resume routes, mounted under `/api/resumes`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            post(upload).layer(DefaultBodyLimit::max(MAX_RESUME_BYTES)),
        )
        .route("/", get(list))
        .route("/{id}", delete(remove))
        .route("/{id}/url", get(url))
        .route("/{id}/download", get(download))
}
