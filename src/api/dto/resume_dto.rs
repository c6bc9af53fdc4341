//! Resume upload, listing and link DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{JobId, Resume, ResumeId, ResumeStatus, ResumeView};
use crate::service::{FailedUpload, UploadOutcome};

/// Relative download link of a resume.
#[must_use]
pub fn download_url(id: ResumeId) -> String {
    format!("/api/resumes/{id}/download")
}

/// Relative link of the resume's URL endpoint.
#[must_use]
pub fn view_url(id: ResumeId) -> String {
    format!("/api/resumes/{id}/url")
}

/// Multipart form accepted by `POST /api/resumes/upload`. Documentation
/// only; the handler reads the form field by field.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumeUploadForm {
    /// A resume file. Repeat the field to upload several; `resume` is
    /// accepted as well.
    #[schema(value_type = String, format = Binary)]
    pub resumes: Vec<u8>,
    /// Job the resumes belong to.
    pub job_id: Option<i64>,
}

/// A stored resume as returned after upload.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedResumeDto {
    /// Resume id.
    pub id: ResumeId,
    /// Client file name.
    pub filename: String,
    /// Linked job.
    pub job_id: Option<JobId>,
    /// Storage key.
    pub file_path: String,
    /// Public file URL. Always `null` for local storage; use `downloadUrl`.
    pub file_url: Option<String>,
    /// Always `uploaded` here.
    pub status: ResumeStatus,
    /// Upload timestamp.
    pub created_at: DateTime<Utc>,
    /// Where to fetch the contents.
    pub download_url: String,
    /// Where to fetch the links.
    pub view_url: String,
}

impl From<Resume> for UploadedResumeDto {
    fn from(resume: Resume) -> Self {
        Self {
            download_url: download_url(resume.id),
            view_url: view_url(resume.id),
            id: resume.id,
            filename: resume.filename,
            job_id: resume.job_id,
            file_path: resume.file_path,
            file_url: None,
            status: resume.status,
            created_at: resume.created_at,
        }
    }
}

/// A file that was not stored.
#[derive(Debug, Serialize, ToSchema)]
pub struct FailedResumeDto {
    /// Client file name.
    pub filename: String,
    /// Reason.
    pub error: String,
}

impl From<FailedUpload> for FailedResumeDto {
    fn from(failed: FailedUpload) -> Self {
        Self {
            filename: failed.filename,
            error: failed.error,
        }
    }
}

/// Per-file results.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResultDto {
    /// Stored files.
    pub uploaded: Vec<UploadedResumeDto>,
    /// Rejected or failed files.
    pub failed: Vec<FailedResumeDto>,
}

/// Response body for `POST /api/resumes/upload`.
#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Always `true`; check `data.failed` for per-file failures.
    pub success: bool,
    /// Outcome summary.
    pub message: String,
    /// Per-file results.
    pub data: UploadResultDto,
}

impl From<UploadOutcome> for UploadResponse {
    fn from(outcome: UploadOutcome) -> Self {
        Self {
            success: true,
            message: format!("Processed {} file(s)", outcome.processed()),
            data: UploadResultDto {
                uploaded: outcome.uploaded.into_iter().map(Into::into).collect(),
                failed: outcome.failed.into_iter().map(Into::into).collect(),
            },
        }
    }
}

/// A resume in the owner's listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumeDto {
    /// Resume id.
    pub id: ResumeId,
    /// Client file name.
    pub filename: String,
    /// Linked job.
    pub job_id: Option<JobId>,
    /// Title of the linked job.
    pub job_title: Option<String>,
    /// `uploaded` or `failed`.
    pub status: ResumeStatus,
    /// Upload timestamp.
    pub created_at: DateTime<Utc>,
    /// Where to fetch the contents.
    pub download_url: String,
    /// Where to fetch the links.
    pub view_url: String,
    /// Storage key, empty for failed uploads.
    pub file_path: String,
}

impl From<ResumeView> for ResumeDto {
    fn from(view: ResumeView) -> Self {
        let resume = view.resume;
        Self {
            download_url: download_url(resume.id),
            view_url: view_url(resume.id),
            id: resume.id,
            filename: resume.filename,
            job_id: resume.job_id,
            job_title: view.job_title,
            status: resume.status,
            created_at: resume.created_at,
            file_path: resume.file_path,
        }
    }
}

/// Response body for `GET /api/resumes`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResumeListResponse {
    /// Always `true`.
    pub success: bool,
    /// Outcome summary.
    pub message: String,
    /// Resumes, newest first.
    pub data: Vec<ResumeDto>,
    /// Number of resumes.
    pub count: usize,
}

/// Links to one resume.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResumeUrlDto {
    /// Resume id.
    pub id: ResumeId,
    /// Client file name.
    pub filename: String,
    /// URL that serves the file.
    pub url: String,
    /// Same as `url`.
    pub download_url: String,
}

impl From<Resume> for ResumeUrlDto {
    fn from(resume: Resume) -> Self {
        let url = download_url(resume.id);
        Self {
            id: resume.id,
            filename: resume.filename,
            download_url: url.clone(),
            url,
        }
    }
}

/// Response body for `GET /api/resumes/{id}/url`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ResumeUrlResponse {
    /// Always `true`.
    pub success: bool,
    /// Links.
    pub data: ResumeUrlDto,
}

/// Identity of a deleted resume.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeletedResumeDto {
    /// Resume id.
    pub id: ResumeId,
    /// Client file name.
    pub filename: String,
}

/// Response body for `DELETE /api/resumes/{id}`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DeleteResumeResponse {
    /// Always `true`.
    pub success: bool,
    /// Outcome summary.
    pub message: String,
    /// The deleted resume.
    pub data: DeletedResumeDto,
}
