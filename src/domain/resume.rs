//! Resume files uploaded by HR users.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{JobId, ResumeId, UserId};

/// Outcome recorded for an uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ResumeStatus {
    /// The file is in resume storage.
    Uploaded,
    /// The file could not be stored; only the record exists.
    Failed,
}

impl ResumeStatus {
    /// Returns the stored string form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Uploaded => "uploaded",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ResumeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResumeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploaded" => Ok(Self::Uploaded),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown resume status: {other}")),
        }
    }
}

/// A stored resume record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resume {
    /// Database identifier.
    pub id: ResumeId,
    /// Job the resume was uploaded against. Cleared if the job is deleted.
    pub job_id: Option<JobId>,
    /// HR user who uploaded it.
    pub hr_id: UserId,
    /// Original client file name.
    pub filename: String,
    /// Storage key of the file contents.
    pub file_path: String,
    /// Upload outcome.
    pub status: ResumeStatus,
    /// Upload timestamp.
    pub created_at: DateTime<Utc>,
}

impl Resume {
    /// Returns `true` if `user` uploaded this resume.
    #[must_use]
    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.hr_id == user
    }
}

/// Fields required to record an upload.
#[derive(Debug, Clone)]
pub struct NewResume {
    /// Optional target job.
    pub job_id: Option<JobId>,
    /// Uploading HR user.
    pub hr_id: UserId,
    /// Original client file name.
    pub filename: String,
    /// Storage key, empty when nothing was stored.
    pub file_path: String,
    /// Upload outcome.
    pub status: ResumeStatus,
}

/// A resume joined with the title of its job, as listed to its owner.
#[derive(Debug, Clone)]
pub struct ResumeView {
    /// The resume itself.
    pub resume: Resume,
    /// Title of the target job, if one is linked.
    pub job_title: Option<String>,
}
