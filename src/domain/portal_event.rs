//! Domain events emitted after committed writes.
//!
//! A [`PortalEvent`] is built once a write has been persisted, broadcast
//! through the [`super::EventBus`] to whoever is connected at that moment,
//! and then dropped. Events are never stored or replayed.

use serde::Serialize;

use super::{Application, ApplicationId, Job, JobId, UserId};

/// Payload of a `new-application` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApplicationPayload {
    /// Created application.
    pub application_id: ApplicationId,
    /// Target job.
    pub job_id: JobId,
    /// Title of the target job.
    pub job_title: String,
    /// Applicant.
    pub user_id: UserId,
    /// Human-readable summary.
    pub message: String,
}

/// Payload of a `job-expired` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobExpiredPayload {
    /// Expired job.
    pub job_id: JobId,
    /// Title of the expired job.
    pub job_title: String,
    /// Human-readable summary.
    pub message: String,
}

/// Event pushed to real-time listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortalEvent {
    /// An applicant submitted an application.
    NewApplication(NewApplicationPayload),
    /// An owner marked a job as expired.
    JobExpired(JobExpiredPayload),
}

impl PortalEvent {
    /// Builds the `new-application` event for a freshly created application.
    #[must_use]
    pub fn new_application(application: &Application, job: &Job) -> Self {
        Self::NewApplication(NewApplicationPayload {
            application_id: application.id,
            job_id: job.id,
            job_title: job.title.clone(),
            user_id: application.user_id,
            message: format!("New application received for job: {}", job.title),
        })
    }

    /// Builds the `job-expired` event for a job that was just expired.
    #[must_use]
    pub fn job_expired(job: &Job) -> Self {
        Self::JobExpired(JobExpiredPayload {
            job_id: job.id,
            job_title: job.title.clone(),
            message: format!("Job \"{}\" has been marked as expired", job.title),
        })
    }

    /// Returns the wire name of the event.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::NewApplication(_) => "new-application",
            Self::JobExpired(_) => "job-expired",
        }
    }

    /// Returns the job this event is about.
    #[must_use]
    pub const fn job_id(&self) -> JobId {
        match self {
            Self::NewApplication(p) => p.job_id,
            Self::JobExpired(p) => p.job_id,
        }
    }

    /// Serializes the payload object sent to listeners.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] if the payload cannot
    /// be represented as JSON.
    pub fn payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            Self::NewApplication(p) => serde_json::to_value(p),
            Self::JobExpired(p) => serde_json::to_value(p),
        }
    }
}
