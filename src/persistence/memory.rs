//! In-process store.
//!
//! All tables live behind one [`tokio::sync::RwLock`], so the duplicate
//! check and the insert in [`MemoryStore::create_application`] are a single
//! atomic step, the same guarantee the PostgreSQL unique constraint gives.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::PortalStore;
use crate::domain::{
    Application, ApplicationId, ApplicationStatus, ApplicationView, Job, JobId, JobListing,
    JobStatus, NewJob, NewResume, NewUser, OwnedJob, OwnerStats, Resume, ResumeId, ResumeStatus,
    ResumeView, StatusUpdate, User, UserId,
};
use crate::error::PortalError;

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    jobs: BTreeMap<JobId, Job>,
    applications: BTreeMap<ApplicationId, Application>,
    resumes: BTreeMap<ResumeId, Resume>,
    last_user_id: i64,
    last_job_id: i64,
    last_application_id: i64,
    last_resume_id: i64,
}

impl Tables {
    fn application_of(&self, job: JobId, user: UserId) -> Option<&Application> {
        self.applications
            .values()
            .find(|a| a.job_id == job && a.user_id == user)
    }

    fn view(&self, application: &Application) -> Option<ApplicationView> {
        let job = self.jobs.get(&application.job_id)?;
        let applicant = self.users.get(&application.user_id)?;
        Some(ApplicationView {
            application: application.clone(),
            job_title: job.title.clone(),
            job_location: job.location.clone(),
            applicant_name: applicant.name.clone(),
            applicant_email: applicant.email.clone(),
        })
    }

    fn views<'a>(&self, applications: impl Iterator<Item = &'a Application>) -> Vec<ApplicationView> {
        let mut views: Vec<ApplicationView> = applications.filter_map(|a| self.view(a)).collect();
        views.sort_by_key(|v| Reverse((v.application.created_at, v.application.id)));
        views
    }
}

fn next_id(last: &mut i64) -> i64 {
    *last = last.saturating_add(1);
    *last
}

/// Store that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PortalStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, PortalError> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.email.eq_ignore_ascii_case(&user.email))
        {
            return Err(PortalError::EmailTaken);
        }
        let id = UserId::new(next_id(&mut tables.last_user_id));
        let stored = User {
            id,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            created_at: Utc::now(),
        };
        tables.users.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, PortalError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .values()
            .find(|u| u.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn create_job(&self, job: NewJob) -> Result<Job, PortalError> {
        let mut tables = self.tables.write().await;
        let id = JobId::new(next_id(&mut tables.last_job_id));
        let stored = Job {
            id,
            title: job.title,
            description: job.description,
            salary: job.salary,
            location: job.location,
            status: JobStatus::Active,
            posted_by: job.posted_by,
            created_at: Utc::now(),
        };
        tables.jobs.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_job_by_id(&self, id: JobId) -> Result<Option<Job>, PortalError> {
        Ok(self.tables.read().await.jobs.get(&id).cloned())
    }

    async fn update_job_status(
        &self,
        id: JobId,
        from: JobStatus,
        to: JobStatus,
    ) -> Result<StatusUpdate, PortalError> {
        let mut tables = self.tables.write().await;
        let job = tables.jobs.get_mut(&id).ok_or(PortalError::JobNotFound(id))?;
        if job.status != from {
            return Ok(StatusUpdate::Unchanged(job.clone()));
        }
        job.status = to;
        Ok(StatusUpdate::Changed(job.clone()))
    }

    async fn list_jobs(&self, viewer: Option<UserId>) -> Result<Vec<JobListing>, PortalError> {
        let tables = self.tables.read().await;
        let mut listings: Vec<JobListing> = tables
            .jobs
            .values()
            .map(|job| {
                let own = viewer.and_then(|user| tables.application_of(job.id, user));
                JobListing {
                    job: job.clone(),
                    posted_by_name: tables.users.get(&job.posted_by).map(|u| u.name.clone()),
                    has_applied: own.is_some(),
                    application_status: own.map(|a| a.status),
                }
            })
            .collect();
        listings.sort_by_key(|l| {
            (
                l.job.status != JobStatus::Active,
                Reverse((l.job.created_at, l.job.id)),
            )
        });
        Ok(listings)
    }

    async fn jobs_by_owner(&self, owner: UserId) -> Result<Vec<OwnedJob>, PortalError> {
        let tables = self.tables.read().await;
        let mut owned: Vec<OwnedJob> = tables
            .jobs
            .values()
            .filter(|job| job.is_owned_by(owner))
            .map(|job| OwnedJob {
                job: job.clone(),
                application_count: tables
                    .applications
                    .values()
                    .filter(|a| a.job_id == job.id)
                    .count() as u64,
            })
            .collect();
        owned.sort_by_key(|o| Reverse((o.job.created_at, o.job.id)));
        Ok(owned)
    }

    async fn has_applied(&self, job: JobId, user: UserId) -> Result<bool, PortalError> {
        Ok(self.tables.read().await.application_of(job, user).is_some())
    }

    async fn create_application(
        &self,
        job: JobId,
        user: UserId,
    ) -> Result<Application, PortalError> {
        let mut tables = self.tables.write().await;
        if !tables.jobs.contains_key(&job) {
            return Err(PortalError::JobNotFound(job));
        }
        if tables.application_of(job, user).is_some() {
            return Err(PortalError::AlreadyApplied {
                job_id: job,
                user_id: user,
            });
        }
        let id = ApplicationId::new(next_id(&mut tables.last_application_id));
        let stored = Application {
            id,
            job_id: job,
            user_id: user,
            status: ApplicationStatus::Pending,
            created_at: Utc::now(),
        };
        tables.applications.insert(id, stored.clone());
        Ok(stored)
    }

    async fn applications_for_job(
        &self,
        job: JobId,
    ) -> Result<Vec<ApplicationView>, PortalError> {
        let tables = self.tables.read().await;
        Ok(tables.views(tables.applications.values().filter(|a| a.job_id == job)))
    }

    async fn applications_for_owner(
        &self,
        owner: UserId,
    ) -> Result<Vec<ApplicationView>, PortalError> {
        let tables = self.tables.read().await;
        Ok(tables.views(tables.applications.values().filter(|a| {
            tables
                .jobs
                .get(&a.job_id)
                .is_some_and(|job| job.is_owned_by(owner))
        })))
    }

    async fn applications_by_user(
        &self,
        user: UserId,
    ) -> Result<Vec<ApplicationView>, PortalError> {
        let tables = self.tables.read().await;
        Ok(tables.views(tables.applications.values().filter(|a| a.user_id == user)))
    }

    async fn owner_stats(&self, owner: UserId) -> Result<OwnerStats, PortalError> {
        let tables = self.tables.read().await;
        let mut stats = OwnerStats::default();
        for job in tables.jobs.values().filter(|j| j.is_owned_by(owner)) {
            stats.total_jobs += 1;
            match job.status {
                JobStatus::Active => stats.active_jobs += 1,
                JobStatus::Expired => stats.expired_jobs += 1,
            }
        }
        stats.total_applications = tables
            .applications
            .values()
            .filter(|a| {
                tables
                    .jobs
                    .get(&a.job_id)
                    .is_some_and(|job| job.is_owned_by(owner))
            })
            .count() as u64;
        for resume in tables.resumes.values().filter(|r| r.is_owned_by(owner)) {
            stats.total_resumes += 1;
            match resume.status {
                ResumeStatus::Uploaded => stats.uploaded_resumes += 1,
                ResumeStatus::Failed => stats.failed_resumes += 1,
            }
        }
        Ok(stats)
    }

    async fn create_resume(&self, resume: NewResume) -> Result<Resume, PortalError> {
        let mut tables = self.tables.write().await;
        if let Some(job) = resume.job_id.filter(|j| !tables.jobs.contains_key(j)) {
            return Err(PortalError::JobNotFound(job));
        }
        let id = ResumeId::new(next_id(&mut tables.last_resume_id));
        let stored = Resume {
            id,
            job_id: resume.job_id,
            hr_id: resume.hr_id,
            filename: resume.filename,
            file_path: resume.file_path,
            status: resume.status,
            created_at: Utc::now(),
        };
        tables.resumes.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_resume_by_id(&self, id: ResumeId) -> Result<Option<Resume>, PortalError> {
        Ok(self.tables.read().await.resumes.get(&id).cloned())
    }

    async fn resumes_by_owner(&self, owner: UserId) -> Result<Vec<ResumeView>, PortalError> {
        let tables = self.tables.read().await;
        let mut views: Vec<ResumeView> = tables
            .resumes
            .values()
            .filter(|r| r.is_owned_by(owner))
            .map(|r| ResumeView {
                resume: r.clone(),
                job_title: r
                    .job_id
                    .and_then(|id| tables.jobs.get(&id))
                    .map(|job| job.title.clone()),
            })
            .collect();
        views.sort_by_key(|v| Reverse((v.resume.created_at, v.resume.id)));
        Ok(views)
    }

    async fn delete_resume(&self, owner: UserId, id: ResumeId) -> Result<bool, PortalError> {
        let mut tables = self.tables.write().await;
        if !tables.resumes.get(&id).is_some_and(|r| r.is_owned_by(owner)) {
            return Ok(false);
        }
        Ok(tables.resumes.remove(&id).is_some())
    }
}
