//! Job applications.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ApplicationId, JobId, UserId};

/// Review status of an application. New applications are `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    /// Awaiting review.
    Pending,
    /// Accepted by the job owner.
    Accepted,
    /// Rejected by the job owner.
    Rejected,
}

impl ApplicationStatus {
    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown application status: {other}")),
        }
    }
}

/// A stored application. At most one exists per `(job_id, user_id)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Application {
    /// Database identifier.
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

/// An application joined with the job title and applicant details, as
/// returned by the listing queries.
#[derive(Debug, Clone)]
pub struct ApplicationView {
    /// The application itself.
    pub application: Application,
    /// Title of the target job.
    pub job_title: String,
    /// Location of the target job.
    pub job_location: String,
    /// Applicant display name.
    pub applicant_name: String,
    /// Applicant email.
    pub applicant_email: String,
}

/// Aggregate counters shown on the HR dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OwnerStats {
    /// All jobs posted by the owner, active or expired.
    pub total_jobs: u64,
    /// Jobs still accepting applications.
    pub active_jobs: u64,
    /// Jobs marked expired.
    pub expired_jobs: u64,
    /// Applications received across all of the owner's jobs.
    pub total_applications: u64,
    /// Resume records created by the owner, stored or failed.
    pub total_resumes: u64,
    /// Resumes whose file was stored.
    pub uploaded_resumes: u64,
    /// Resumes whose file could not be stored.
    pub failed_resumes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_stored_values() {
        assert_eq!("pending".parse(), Ok(ApplicationStatus::Pending));
        assert_eq!("rejected".parse(), Ok(ApplicationStatus::Rejected));
        assert!("withdrawn".parse::<ApplicationStatus>().is_err());
    }
}
