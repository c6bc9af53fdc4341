//! Application listing and dashboard DTOs.

use serde::Serialize;
use utoipa::ToSchema;

use super::job_dto::ApplicationDto;
use crate::domain::{ApplicationView, OwnerStats};

/// An application with job and applicant details.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationViewDto {
    /// Application fields.
    #[serde(flatten)]
    pub application: ApplicationDto,
    /// Title of the target job.
    pub job_title: String,
    /// Location of the target job.
    pub job_location: String,
    /// Applicant display name.
    pub applicant_name: String,
    /// Applicant email.
    pub applicant_email: String,
}

impl From<ApplicationView> for ApplicationViewDto {
    fn from(view: ApplicationView) -> Self {
        Self {
            application: view.application.into(),
            job_title: view.job_title,
            job_location: view.job_location,
            applicant_name: view.applicant_name,
            applicant_email: view.applicant_email,
        }
    }
}

/// Response body for every application listing.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationListResponse {
    /// Always `true`.
    pub success: bool,
    /// Outcome summary.
    pub message: String,
    /// Applications, newest first.
    pub data: Vec<ApplicationViewDto>,
    /// Number of applications.
    pub count: usize,
}

impl ApplicationListResponse {
    /// Wraps `views` with a count and the standard message.
    #[must_use]
    pub fn new(views: Vec<ApplicationView>, message: &str) -> Self {
        let data: Vec<ApplicationViewDto> = views.into_iter().map(Into::into).collect();
        let message = if data.is_empty() {
            "No applications found"
        } else {
            message
        };
        Self {
            success: true,
            message: message.to_string(),
            count: data.len(),
            data,
        }
    }
}

/// HR dashboard counters.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStatsDto {
    /// All jobs, active or expired.
    pub total_jobs: u64,
    /// Active jobs.
    pub total_active_jobs: u64,
    /// Expired jobs.
    pub total_expired: u64,
    /// Applications received.
    pub total_applications: u64,
    /// Resume records, stored or failed.
    pub total_resumes_uploaded: u64,
    /// Resumes whose file was stored.
    pub uploaded_resumes: u64,
    /// Resumes whose file could not be stored.
    pub failed_resumes: u64,
}

impl From<OwnerStats> for DashboardStatsDto {
    fn from(stats: OwnerStats) -> Self {
        Self {
            total_jobs: stats.total_jobs,
            total_active_jobs: stats.active_jobs,
            total_expired: stats.expired_jobs,
            total_applications: stats.total_applications,
            total_resumes_uploaded: stats.total_resumes,
            uploaded_resumes: stats.uploaded_resumes,
            failed_resumes: stats.failed_resumes,
        }
    }
}

/// Response body for the dashboard endpoints.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    /// Always `true`.
    pub success: bool,
    /// Outcome summary.
    pub message: String,
    /// Counters.
    pub data: DashboardStatsDto,
}
