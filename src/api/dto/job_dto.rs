//! Job and application-submission DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Application, ApplicationId, ApplicationStatus, Job, JobId, JobListing, JobStatus, OwnedJob,
    UserId,
};
use crate::service::JobDraft;

/// Request body for `POST /api/jobs`. All fields are required and
/// non-blank.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateJobRequest {
    /// Listing title.
    #[serde(default)]
    pub title: String,
    /// Description.
    #[serde(default)]
    pub description: String,
    /// Salary text.
    #[serde(default)]
    pub salary: String,
    /// Location text.
    #[serde(default)]
    pub location: String,
}

impl From<CreateJobRequest> for JobDraft {
    fn from(req: CreateJobRequest) -> Self {
        Self {
            title: req.title,
            description: req.description,
            salary: req.salary,
            location: req.location,
        }
    }
}

/// A job as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobDto {
    /// Job id.
    pub id: JobId,
    /// Listing title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Salary text.
    pub salary: String,
    /// Location text.
    pub location: String,
    /// `active` or `expired`.
    pub expiry_status: JobStatus,
    /// Posting HR user.
    pub posted_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Job> for JobDto {
    fn from(job: Job) -> Self {
        Self {
            id: job.id,
            title: job.title,
            description: job.description,
            salary: job.salary,
            location: job.location,
            expiry_status: job.status,
            posted_by: job.posted_by,
            created_at: job.created_at,
        }
    }
}

/// A job on the public board.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobListingDto {
    /// Job fields.
    #[serde(flatten)]
    pub job: JobDto,
    /// Poster display name.
    pub posted_by_name: Option<String>,
    /// Whether the caller has applied.
    pub has_applied: bool,
    /// Status of the caller's application.
    pub application_status: Option<ApplicationStatus>,
}

impl From<JobListing> for JobListingDto {
    fn from(listing: JobListing) -> Self {
        Self {
            job: listing.job.into(),
            posted_by_name: listing.posted_by_name,
            has_applied: listing.has_applied,
            application_status: listing.application_status,
        }
    }
}

/// A job in its owner's list.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnedJobDto {
    /// Job fields.
    #[serde(flatten)]
    pub job: JobDto,
    /// Applications received.
    pub application_count: u64,
}

impl From<OwnedJob> for OwnedJobDto {
    fn from(owned: OwnedJob) -> Self {
        Self {
            job: owned.job.into(),
            application_count: owned.application_count,
        }
    }
}

/// An application record.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationDto {
    /// Application id.
    pub id: ApplicationId,
    /// Target job.
    pub job_id: JobId,
    /// Applicant.
    pub user_id: UserId,
    /// Review status.
    pub status: ApplicationStatus,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<Application> for ApplicationDto {
    fn from(a: Application) -> Self {
        Self {
            id: a.id,
            job_id: a.job_id,
            user_id: a.user_id,
            status: a.status,
            created_at: a.created_at,
        }
    }
}

/// Response body for job create (201) and expire (200).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    /// Always `true`.
    pub success: bool,
    /// Outcome summary.
    pub message: String,
    /// The job after the change.
    pub data: JobDto,
}

/// Response body for `GET /api/jobs`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobBoardResponse {
    /// Always `true`.
    pub success: bool,
    /// Outcome summary.
    pub message: String,
    /// Jobs, active first.
    pub data: Vec<JobListingDto>,
    /// Total jobs.
    pub count: usize,
    /// Active jobs.
    pub active_count: usize,
    /// Expired jobs.
    pub expired_count: usize,
}

/// Response body for `GET /api/jobs/hr/my-jobs`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OwnedJobsResponse {
    /// Always `true`.
    pub success: bool,
    /// Outcome summary.
    pub message: String,
    /// The caller's jobs, newest first.
    pub data: Vec<OwnedJobDto>,
    /// Number of jobs.
    pub count: usize,
}

/// Response body for `POST /api/jobs/{id}/apply` (201).
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyResponse {
    /// Always `true`.
    pub success: bool,
    /// Outcome summary.
    pub message: String,
    /// The new application.
    pub data: ApplicationDto,
    /// Always `true` after a successful application.
    pub has_applied: bool,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn listing_flattens_job_fields() {
        let listing = JobListing {
            job: Job {
                id: JobId::new(3),
                title: "Ops".to_string(),
                description: "Pager".to_string(),
                salary: "70k".to_string(),
                location: "Madrid".to_string(),
                status: JobStatus::Active,
                posted_by: UserId::new(1),
                created_at: Utc::now(),
            },
            posted_by_name: Some("Rosa".to_string()),
            has_applied: true,
            application_status: Some(ApplicationStatus::Pending),
        };
        let Ok(json) = serde_json::to_value(JobListingDto::from(listing)) else {
            panic!("listing should serialize");
        };
        assert_eq!(json.get("id"), Some(&serde_json::json!(3)));
        assert_eq!(json.get("expiryStatus"), Some(&serde_json::json!("active")));
        assert_eq!(json.get("hasApplied"), Some(&serde_json::json!(true)));
        assert_eq!(
            json.get("applicationStatus"),
            Some(&serde_json::json!("pending"))
        );
    }
}
