//! Job listings and their lifecycle status.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{ApplicationStatus, JobId, UserId};

/// Listing status. A job starts `active`; its owner may mark it `expired`.
/// Expiring is idempotent and there is no way back to `active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepting applications.
    Active,
    /// Closed to new applications.
    Expired,
}

impl JobStatus {
    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            other => Err(format!("unknown job status: {other}")),
        }
    }
}

/// A stored job listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Database identifier.
    pub id: JobId,
    /// Listing title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Salary text as entered by the poster (e.g. `"80k-95k"`).
    pub salary: String,
    /// Location text.
    pub location: String,
    /// Lifecycle status.
    pub status: JobStatus,
    /// HR user who posted the job.
    pub posted_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Job {
    /// Returns `true` while the job accepts applications.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == JobStatus::Active
    }

    /// Returns `true` if `user` posted this job.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.posted_by == user
    }
}

/// Fields required to create a job.
#[derive(Debug, Clone)]
pub struct NewJob {
    /// Listing title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Salary text.
    pub salary: String,
    /// Location text.
    pub location: String,
    /// Posting HR user.
    pub posted_by: UserId,
}

/// Outcome of a conditional status update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusUpdate {
    /// The job was in the expected status and now has the new one.
    Changed(Job),
    /// The job was not in the expected status and was left as is.
    Unchanged(Job),
}

impl StatusUpdate {
    /// Returns `true` if this update performed the transition.
    #[must_use]
    pub const fn is_changed(&self) -> bool {
        matches!(self, Self::Changed(_))
    }

    /// Returns the job as it is after the update.
    #[must_use]
    pub fn into_job(self) -> Job {
        match self {
            Self::Changed(job) | Self::Unchanged(job) => job,
        }
    }
}

/// A job as seen in the public listing, enriched for an optional viewer.
#[derive(Debug, Clone)]
pub struct JobListing {
    /// The job itself.
    pub job: Job,
    /// Display name of the poster, if the account still exists.
    pub posted_by_name: Option<String>,
    /// Whether the viewer has applied. Always `false` without a viewer.
    pub has_applied: bool,
    /// Status of the viewer's application, if any.
    pub application_status: Option<ApplicationStatus>,
}

/// A job as seen by its owner, with the number of applications received.
#[derive(Debug, Clone)]
pub struct OwnedJob {
    /// The job itself.
    pub job: Job,
    /// Applications received so far.
    pub application_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(status: JobStatus) -> Job {
        Job {
            id: JobId::new(1),
            title: "Backend Engineer".to_string(),
            description: "Rust services".to_string(),
            salary: "100k".to_string(),
            location: "Remote".to_string(),
            status,
            posted_by: UserId::new(10),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn status_round_trips_through_storage_form() {
        for status in [JobStatus::Active, JobStatus::Expired] {
            assert_eq!(status.as_str().parse::<JobStatus>(), Ok(status));
        }
        assert!("archived".parse::<JobStatus>().is_err());
    }

    #[test]
    fn ownership_and_activity() {
        let j = job(JobStatus::Active);
        assert!(j.is_active());
        assert!(j.is_owned_by(UserId::new(10)));
        assert!(!j.is_owned_by(UserId::new(11)));
        assert!(!job(JobStatus::Expired).is_active());
    }
}
