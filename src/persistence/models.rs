//! Database row shapes and their normalization into domain records.
//!
//! Every query result is decoded into one of these rows and converted
//! exactly once, here, into the strict domain types. Nothing above the
//! persistence layer ever sees a raw row.

use chrono::{DateTime, Utc};

use crate::domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationView, Job, JobId, JobListing,
    JobStatus, OwnedJob, OwnerStats, Resume, ResumeId, ResumeStatus, ResumeView, Role, User,
    UserId,
};
use crate::error::PortalError;

fn corrupt(what: &str, detail: impl std::fmt::Display) -> PortalError {
    PortalError::PersistenceError(format!("corrupt {what} row: {detail}"))
}

fn count(raw: i64) -> u64 {
    u64::try_from(raw).unwrap_or(0)
}

/// A row from the `users` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    /// Primary key.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Unique login email.
    pub email: String,
    /// Argon2id PHC string.
    pub password_hash: String,
    /// `HR` or `USER`.
    pub role: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = PortalError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: UserId::new(row.id),
            role: row.role.parse::<Role>().map_err(|e| corrupt("user", e))?,
            name: row.name,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

/// A row from the `jobs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JobRow {
    /// Primary key.
    pub id: i64,
    /// Listing title.
    pub title: String,
    /// Description.
    pub description: String,
    /// Salary text.
    pub salary: String,
    /// Location text.
    pub location: String,
    /// `active` or `expired`.
    pub expiry_status: String,
    /// Posting user.
    pub posted_by: i64,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<JobRow> for Job {
    type Error = PortalError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: JobId::new(row.id),
            status: row
                .expiry_status
                .parse::<JobStatus>()
                .map_err(|e| corrupt("job", e))?,
            title: row.title,
            description: row.description,
            salary: row.salary,
            location: row.location,
            posted_by: UserId::new(row.posted_by),
            created_at: row.created_at,
        })
    }
}

/// A job joined with poster name and the viewer's application, if any.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct JobListingRow {
    /// Job columns.
    #[sqlx(flatten)]
    pub job: JobRow,
    /// Poster display name.
    pub posted_by_name: Option<String>,
    /// Whether the viewer has an application for this job.
    pub has_applied: bool,
    /// Status of the viewer's application.
    pub application_status: Option<String>,
}

impl TryFrom<JobListingRow> for JobListing {
    type Error = PortalError;

    fn try_from(row: JobListingRow) -> Result<Self, Self::Error> {
        let application_status = row
            .application_status
            .map(|s| s.parse::<ApplicationStatus>())
            .transpose()
            .map_err(|e| corrupt("application", e))?;
        Ok(Self {
            job: row.job.try_into()?,
            posted_by_name: row.posted_by_name,
            has_applied: row.has_applied,
            application_status,
        })
    }
}

/// A job with its application count.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OwnedJobRow {
    /// Job columns.
    #[sqlx(flatten)]
    pub job: JobRow,
    /// `COUNT(*)` of applications.
    pub application_count: i64,
}

impl TryFrom<OwnedJobRow> for OwnedJob {
    type Error = PortalError;

    fn try_from(row: OwnedJobRow) -> Result<Self, Self::Error> {
        Ok(Self {
            job: row.job.try_into()?,
            application_count: count(row.application_count),
        })
    }
}

/// A row from the `applications` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApplicationRow {
    /// Primary key.
    pub id: i64,
    /// Target job.
    pub job_id: i64,
    /// Applicant.
    pub user_id: i64,
    /// `pending`, `accepted` or `rejected`.
    pub status: String,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ApplicationRow> for Application {
    type Error = PortalError;

    fn try_from(row: ApplicationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ApplicationId::new(row.id),
            job_id: JobId::new(row.job_id),
            user_id: UserId::new(row.user_id),
            status: row
                .status
                .parse::<ApplicationStatus>()
                .map_err(|e| corrupt("application", e))?,
            created_at: row.created_at,
        })
    }
}

/// An application joined with job and applicant columns.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApplicationViewRow {
    /// Application columns.
    #[sqlx(flatten)]
    pub application: ApplicationRow,
    /// Job title.
    pub job_title: String,
    /// Job location.
    pub job_location: String,
    /// Applicant name.
    pub applicant_name: String,
    /// Applicant email.
    pub applicant_email: String,
}

impl TryFrom<ApplicationViewRow> for ApplicationView {
    type Error = PortalError;

    fn try_from(row: ApplicationViewRow) -> Result<Self, Self::Error> {
        Ok(Self {
            application: row.application.try_into()?,
            job_title: row.job_title,
            job_location: row.job_location,
            applicant_name: row.applicant_name,
            applicant_email: row.applicant_email,
        })
    }
}

/// Dashboard counters.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct OwnerStatsRow {
    /// All jobs.
    pub total_jobs: i64,
    /// Active jobs.
    pub active_jobs: i64,
    /// Expired jobs.
    pub expired_jobs: i64,
    /// Applications across all jobs.
    pub total_applications: i64,
    /// Resume records.
    pub total_resumes: i64,
    /// Stored resumes.
    pub uploaded_resumes: i64,
    /// Failed resumes.
    pub failed_resumes: i64,
}

impl From<OwnerStatsRow> for OwnerStats {
    fn from(row: OwnerStatsRow) -> Self {
        Self {
            total_jobs: count(row.total_jobs),
            active_jobs: count(row.active_jobs),
            expired_jobs: count(row.expired_jobs),
            total_applications: count(row.total_applications),
            total_resumes: count(row.total_resumes),
            uploaded_resumes: count(row.uploaded_resumes),
            failed_resumes: count(row.failed_resumes),
        }
    }
}

/// A row from the `resumes` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResumeRow {
    /// Primary key.
    pub id: i64,
    /// Linked job, if any.
    pub job_id: Option<i64>,
    /// Uploading HR user.
    pub hr_id: i64,
    /// Client file name.
    pub filename: String,
    /// Storage key.
    pub file_path: String,
    /// `uploaded` or `failed`.
    pub status: String,
    /// Upload timestamp.
    pub created_at: DateTime<Utc>,
}

impl TryFrom<ResumeRow> for Resume {
    type Error = PortalError;

    fn try_from(row: ResumeRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: ResumeId::new(row.id),
            job_id: row.job_id.map(JobId::new),
            hr_id: UserId::new(row.hr_id),
            status: row
                .status
                .parse::<ResumeStatus>()
                .map_err(|e| corrupt("resume", e))?,
            filename: row.filename,
            file_path: row.file_path,
            created_at: row.created_at,
        })
    }
}

/// A resume joined with its job title.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ResumeViewRow {
    /// Resume columns.
    #[sqlx(flatten)]
    pub resume: ResumeRow,
    /// Job title, `NULL` when unlinked.
    pub job_title: Option<String>,
}

impl TryFrom<ResumeViewRow> for ResumeView {
    type Error = PortalError;

    fn try_from(row: ResumeViewRow) -> Result<Self, Self::Error> {
        Ok(Self {
            resume: row.resume.try_into()?,
            job_title: row.job_title,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job_row(status: &str) -> JobRow {
        JobRow {
            id: 4,
            title: "SRE".to_string(),
            description: "On-call".to_string(),
            salary: "120k".to_string(),
            location: "Lisbon".to_string(),
            expiry_status: status.to_string(),
            posted_by: 2,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn job_row_normalizes() {
        let job = Job::try_from(job_row("expired"));
        assert!(matches!(
            job,
            Ok(ref j) if j.status == JobStatus::Expired && j.posted_by == UserId::new(2)
        ));
    }

    #[test]
    fn unknown_status_is_persistence_error() {
        let job = Job::try_from(job_row("archived"));
        assert!(matches!(job, Err(PortalError::PersistenceError(_))));
    }

    #[test]
    fn user_row_parses_role() {
        let row = UserRow {
            id: 1,
            name: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role: "HR".to_string(),
            created_at: Utc::now(),
        };
        assert!(matches!(User::try_from(row), Ok(ref u) if u.role == Role::Hr));
    }

    #[test]
    fn negative_counts_clamp_to_zero() {
        let stats = OwnerStats::from(OwnerStatsRow {
            total_jobs: 3,
            active_jobs: 2,
            expired_jobs: 1,
            total_applications: -1,
            total_resumes: 2,
            uploaded_resumes: 1,
            failed_resumes: 1,
        });
        assert_eq!(stats.total_jobs, 3);
        assert_eq!(stats.total_applications, 0);
        assert_eq!(stats.failed_resumes, 1);
    }

    #[test]
    fn unlinked_resume_row_normalizes() {
        let row = ResumeRow {
            id: 9,
            job_id: None,
            hr_id: 2,
            filename: "cv.pdf".to_string(),
            file_path: String::new(),
            status: "failed".to_string(),
            created_at: Utc::now(),
        };
        assert!(matches!(
            Resume::try_from(row),
            Ok(ref r) if r.status == ResumeStatus::Failed && r.job_id.is_none()
        ));
    }
}
