//! Read-side queries over applications and the HR dashboard.

use std::sync::Arc;

use crate::auth::Principal;
use crate::domain::{ApplicationView, JobId, OwnerStats, Role};
use crate::error::PortalError;
use crate::persistence::PortalStore;

/// Application listings scoped to the caller's role.
#[derive(Debug, Clone)]
pub struct ApplicationService {
    store: Arc<dyn PortalStore>,
}

impl ApplicationService {
    /// Creates a new `ApplicationService`.
    #[must_use]
    pub fn new(store: Arc<dyn PortalStore>) -> Self {
        Self { store }
    }

    /// Applications received across all jobs posted by `owner`.
    ///
    /// # Errors
    ///
    /// [`PortalError::Forbidden`] unless `owner` is HR, or a store error.
    pub async fn for_owner(&self, owner: Principal) -> Result<Vec<ApplicationView>, PortalError> {
        owner.require_role(Role::Hr)?;
        self.store.applications_for_owner(owner.id).await
    }

    /// Applications for a single job, visible only to its owner.
    ///
    /// # Errors
    ///
    /// [`PortalError::Forbidden`] unless `owner` is HR and posted the job,
    /// [`PortalError::JobNotFound`], or a store error.
    pub async fn for_job(
        &self,
        owner: Principal,
        job_id: JobId,
    ) -> Result<Vec<ApplicationView>, PortalError> {
        owner.require_role(Role::Hr)?;
        let job = self
            .store
            .find_job_by_id(job_id)
            .await?
            .ok_or(PortalError::JobNotFound(job_id))?;
        if !job.is_owned_by(owner.id) {
            return Err(PortalError::Forbidden(
                "you can only view applications for your own jobs".to_string(),
            ));
        }
        self.store.applications_for_job(job_id).await
    }

    /// Applications submitted by `applicant`.
    ///
    /// # Errors
    ///
    /// [`PortalError::Forbidden`] unless `applicant` is a job seeker, or a
    /// store error.
    pub async fn for_user(
        &self,
        applicant: Principal,
    ) -> Result<Vec<ApplicationView>, PortalError> {
        applicant.require_role(Role::User)?;
        self.store.applications_by_user(applicant.id).await
    }

    /// Received applications for HR, submitted ones for job seekers.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub async fn for_principal(
        &self,
        principal: Principal,
    ) -> Result<Vec<ApplicationView>, PortalError> {
        match principal.role {
            Role::Hr => self.for_owner(principal).await,
            Role::User => self.for_user(principal).await,
        }
    }

    /// Dashboard counters for `owner`.
    ///
    /// # Errors
    ///
    /// [`PortalError::Forbidden`] unless `owner` is HR, or a store error.
    pub async fn dashboard(&self, owner: Principal) -> Result<OwnerStats, PortalError> {
        owner.require_role(Role::Hr)?;
        self.store.owner_stats(owner.id).await
    }
}
