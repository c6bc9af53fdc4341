//! Job service: job postings, expiry and applications.

use std::sync::Arc;

use crate::auth::Principal;
use crate::domain::{
    Application, Job, JobId, JobListing, JobNotifier, JobStatus, NewJob, OwnedJob, Role,
};
use crate::error::PortalError;
use crate::persistence::PortalStore;

/// Fields an HR user submits to post a job.
#[derive(Debug, Clone, Default)]
pub struct JobDraft {
    /// Listing title.
    pub title: String,
    /// Free-form description.
    pub description: String,
    /// Salary text.
    pub salary: String,
    /// Location text.
    pub location: String,
}

impl JobDraft {
    fn into_new_job(self, owner: Principal) -> Result<NewJob, PortalError> {
        let title = self.title.trim().to_string();
        let description = self.description.trim().to_string();
        let salary = self.salary.trim().to_string();
        let location = self.location.trim().to_string();
        if [&title, &description, &salary, &location]
            .iter()
            .any(|field| field.is_empty())
        {
            return Err(PortalError::InvalidRequest(
                "title, description, salary, and location are required".to_string(),
            ));
        }
        Ok(NewJob {
            title,
            description,
            salary,
            location,
            posted_by: owner.id,
        })
    }
}

/// The public job board with per-status counts.
#[derive(Debug, Clone)]
pub struct JobBoard {
    /// Every job, active first.
    pub jobs: Vec<JobListing>,
    /// Number of active jobs.
    pub active_count: usize,
    /// Number of expired jobs.
    pub expired_count: usize,
}

/// Orchestrates job writes and fires post-commit notifications.
///
/// Every write follows the same order: check role, load and check the
/// target, commit through the store, then hand the committed record to the
/// [`JobNotifier`]. The notifier cannot fail the write.
#[derive(Debug, Clone)]
pub struct JobService {
    store: Arc<dyn PortalStore>,
    notifier: Arc<dyn JobNotifier>,
}

impl JobService {
    /// Creates a new `JobService`.
    #[must_use]
    pub fn new(store: Arc<dyn PortalStore>, notifier: Arc<dyn JobNotifier>) -> Self {
        Self { store, notifier }
    }

    /// Posts a new active job owned by `owner`.
    ///
    /// # Errors
    ///
    /// [`PortalError::Forbidden`] unless `owner` is HR,
    /// [`PortalError::InvalidRequest`] if a field is blank, or a store
    /// error.
    pub async fn create_job(&self, owner: Principal, draft: JobDraft) -> Result<Job, PortalError> {
        owner.require_role(Role::Hr)?;
        let job = self.store.create_job(draft.into_new_job(owner)?).await?;
        tracing::info!(job_id = %job.id, owner = %owner.id, "job created");
        Ok(job)
    }

    /// Lists every job, personalized for `viewer` when authenticated.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn list_jobs(&self, viewer: Option<Principal>) -> Result<JobBoard, PortalError> {
        let jobs = self.store.list_jobs(viewer.map(|p| p.id)).await?;
        let active_count = jobs.iter().filter(|l| l.job.is_active()).count();
        let expired_count = jobs.len().saturating_sub(active_count);
        Ok(JobBoard {
            jobs,
            active_count,
            expired_count,
        })
    }

    /// Lists the jobs posted by `owner`.
    ///
    /// # Errors
    ///
    /// [`PortalError::Forbidden`] unless `owner` is HR, or a store error.
    pub async fn jobs_for_owner(&self, owner: Principal) -> Result<Vec<OwnedJob>, PortalError> {
        owner.require_role(Role::Hr)?;
        self.store.jobs_by_owner(owner.id).await
    }

    /// Marks `job_id` as expired on behalf of its owner.
    ///
    /// Expiring an already-expired job succeeds without a second
    /// `job-expired` notification.
    ///
    /// # Errors
    ///
    /// [`PortalError::Forbidden`] unless `actor` is HR and owns the job,
    /// [`PortalError::JobNotFound`] if it does not exist, or a store error.
    pub async fn expire_job(&self, actor: Principal, job_id: JobId) -> Result<Job, PortalError> {
        actor.require_role(Role::Hr)?;
        let job = self
            .store
            .find_job_by_id(job_id)
            .await?
            .ok_or(PortalError::JobNotFound(job_id))?;
        if !job.is_owned_by(actor.id) {
            tracing::warn!(%job_id, actor = %actor.id, "expire rejected, not the owner");
            return Err(PortalError::Forbidden(
                "you can only expire your own jobs".to_string(),
            ));
        }
        if !job.is_active() {
            tracing::debug!(%job_id, "job already expired");
            return Ok(job);
        }

        let update = self
            .store
            .update_job_status(job_id, JobStatus::Active, JobStatus::Expired)
            .await?;
        if !update.is_changed() {
            tracing::debug!(%job_id, "job expired concurrently");
            return Ok(update.into_job());
        }
        let expired = update.into_job();
        tracing::info!(%job_id, "job expired");
        self.notifier.job_expired(&expired);
        Ok(expired)
    }

    /// Submits an application from `applicant` to `job_id`.
    ///
    /// # Errors
    ///
    /// [`PortalError::Forbidden`] unless `applicant` is a job seeker,
    /// [`PortalError::JobNotFound`], [`PortalError::JobNotActive`] for an
    /// expired job, [`PortalError::AlreadyApplied`] for a repeat
    /// application, or a store error.
    pub async fn apply(
        &self,
        applicant: Principal,
        job_id: JobId,
    ) -> Result<Application, PortalError> {
        applicant.require_role(Role::User)?;
        let job = self
            .store
            .find_job_by_id(job_id)
            .await?
            .ok_or(PortalError::JobNotFound(job_id))?;
        if !job.is_active() {
            return Err(PortalError::JobNotActive(job_id));
        }
        if self.store.has_applied(job_id, applicant.id).await? {
            return Err(PortalError::AlreadyApplied {
                job_id,
                user_id: applicant.id,
            });
        }

        let application = self.store.create_application(job_id, applicant.id).await?;
        tracing::info!(
            application_id = %application.id,
            %job_id,
            user_id = %applicant.id,
            "application submitted"
        );
        self.notifier.application_created(&application, &job);
        Ok(application)
    }
}
