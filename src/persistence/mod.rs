//! Persistence layer: the store collaborator behind every REST operation.
//!
//! [`PortalStore`] is the single boundary to stored state. Two
//! implementations exist: [`MemoryStore`] for single-process deployments
//! and tests, and [`PostgresStore`] backed by `sqlx::PgPool`.

pub mod memory;
pub mod models;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;

pub use memory::MemoryStore;
pub use postgres::PostgresStore;

use crate::domain::{
    Application, ApplicationView, Job, JobId, JobListing, JobStatus, NewJob, NewResume, NewUser,
    OwnedJob, OwnerStats, Resume, ResumeId, ResumeView, StatusUpdate, User, UserId,
};
use crate::error::PortalError;

/// Stored users, jobs, applications and resume records.
///
/// All methods return strict domain records; row shapes never leak past
/// the implementation.
#[async_trait]
pub trait PortalStore: Send + Sync + fmt::Debug {
    /// Creates a user account.
    ///
    /// # Errors
    ///
    /// [`PortalError::EmailTaken`] if the email is already registered,
    /// [`PortalError::PersistenceError`] on storage failure.
    async fn create_user(&self, user: NewUser) -> Result<User, PortalError>;

    /// Looks up a user by login email.
    ///
    /// # Errors
    ///
    /// [`PortalError::PersistenceError`] on storage failure.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, PortalError>;

    /// Creates an active job.
    ///
    /// # Errors
    ///
    /// [`PortalError::PersistenceError`] on storage failure.
    async fn create_job(&self, job: NewJob) -> Result<Job, PortalError>;

    /// Looks up a job by id.
    ///
    /// # Errors
    ///
    /// [`PortalError::PersistenceError`] on storage failure.
    async fn find_job_by_id(&self, id: JobId) -> Result<Option<Job>, PortalError>;

    /// Moves a job from status `from` to `to` in one atomic step. A job
    /// that is not currently in `from` is returned unchanged.
    ///
    /// # Errors
    ///
    /// [`PortalError::JobNotFound`] if the job does not exist,
    /// [`PortalError::PersistenceError`] on storage failure.
    async fn update_job_status(
        &self,
        id: JobId,
        from: JobStatus,
        to: JobStatus,
    ) -> Result<StatusUpdate, PortalError>;

    /// Lists every job, active first then newest first, personalized for
    /// `viewer` when given.
    ///
    /// # Errors
    ///
    /// [`PortalError::PersistenceError`] on storage failure.
    async fn list_jobs(&self, viewer: Option<UserId>) -> Result<Vec<JobListing>, PortalError>;

    /// Lists the jobs posted by `owner`, newest first, with application
    /// counts.
    ///
    /// # Errors
    ///
    /// [`PortalError::PersistenceError`] on storage failure.
    async fn jobs_by_owner(&self, owner: UserId) -> Result<Vec<OwnedJob>, PortalError>;

    /// Returns whether `user` has applied to `job`. A fast path only:
    /// [`PortalStore::create_application`] is the authoritative check.
    ///
    /// # Errors
    ///
    /// [`PortalError::PersistenceError`] on storage failure.
    async fn has_applied(&self, job: JobId, user: UserId) -> Result<bool, PortalError>;

    /// Creates a pending application, enforcing one per `(job, user)`.
    ///
    /// # Errors
    ///
    /// [`PortalError::AlreadyApplied`] if one already exists,
    /// [`PortalError::PersistenceError`] on storage failure.
    async fn create_application(
        &self,
        job: JobId,
        user: UserId,
    ) -> Result<Application, PortalError>;

    /// Lists applications for one job, newest first.
    ///
    /// # Errors
    ///
    /// [`PortalError::PersistenceError`] on storage failure.
    async fn applications_for_job(&self, job: JobId)
    -> Result<Vec<ApplicationView>, PortalError>;

    /// Lists applications across every job posted by `owner`, newest first.
    ///
    /// # Errors
    ///
    /// [`PortalError::PersistenceError`] on storage failure.
    async fn applications_for_owner(
        &self,
        owner: UserId,
    ) -> Result<Vec<ApplicationView>, PortalError>;

    /// Lists applications submitted by `user`, newest first.
    ///
    /// # Errors
    ///
    /// [`PortalError::PersistenceError`] on storage failure.
    async fn applications_by_user(
        &self,
        user: UserId,
    ) -> Result<Vec<ApplicationView>, PortalError>;

    /// Dashboard counters for `owner`.
    ///
    /// # Errors
    ///
    /// [`PortalError::PersistenceError`] on storage failure.
    async fn owner_stats(&self, owner: UserId) -> Result<OwnerStats, PortalError>;

    /// Records an uploaded (or failed) resume.
    ///
    /// # Errors
    ///
    /// [`PortalError::PersistenceError`] on storage failure.
    async fn create_resume(&self, resume: NewResume) -> Result<Resume, PortalError>;

    /// Looks up a resume record by id.
    ///
    /// # Errors
    ///
    /// [`PortalError::PersistenceError`] on storage failure.
    async fn find_resume_by_id(&self, id: ResumeId) -> Result<Option<Resume>, PortalError>;

    /// Lists the resumes uploaded by `owner`, newest first, with job titles.
    ///
    /// # Errors
    ///
    /// [`PortalError::PersistenceError`] on storage failure.
    async fn resumes_by_owner(&self, owner: UserId) -> Result<Vec<ResumeView>, PortalError>;

    /// Deletes the resume `id` if `owner` uploaded it. Returns `false` when
    /// no such record belongs to `owner`.
    ///
    /// # Errors
    ///
    /// [`PortalError::PersistenceError`] on storage failure.
    async fn delete_resume(&self, owner: UserId, id: ResumeId) -> Result<bool, PortalError>;
}
