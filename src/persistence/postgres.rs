//! PostgreSQL implementation of the persistence layer.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use super::PortalStore;
use super::models::{
    ApplicationRow, ApplicationViewRow, JobListingRow, JobRow, OwnedJobRow, OwnerStatsRow,
    ResumeRow, ResumeViewRow, UserRow,
};
use crate::config::PortalConfig;
use crate::domain::{
    Application, ApplicationView, Job, JobId, JobListing, JobStatus, NewJob, NewResume, NewUser,
    OwnedJob, OwnerStats, Resume, ResumeId, ResumeView, StatusUpdate, User, UserId,
};
use crate::error::PortalError;

const USER_COLUMNS: &str = "id, name, email, password_hash, role, created_at";

const JOB_COLUMNS: &str = "j.id, j.title, j.description, j.salary, j.location, j.expiry_status, \
                           j.posted_by, j.created_at";

const APPLICATION_VIEW_SELECT: &str = "SELECT a.id, a.job_id, a.user_id, a.status, a.created_at, \
     j.title AS job_title, j.location AS job_location, \
     u.name AS applicant_name, u.email AS applicant_email \
     FROM applications a \
     JOIN jobs j ON j.id = a.job_id \
     JOIN users u ON u.id = a.user_id";

const RESUME_COLUMNS: &str = "r.id, r.job_id, r.hr_id, r.filename, r.file_path, r.status, \
                              r.created_at";

fn db_error(e: sqlx::Error) -> PortalError {
    PortalError::PersistenceError(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_foreign_key_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

fn normalize<R, T>(rows: Vec<R>) -> Result<Vec<T>, PortalError>
where
    T: TryFrom<R, Error = PortalError>,
{
    rows.into_iter().map(T::try_from).collect()
}

/// PostgreSQL-backed store using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Creates a store over an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a connection pool from `config` and, when enabled, applies
    /// the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns a [`PortalError::PersistenceError`] if the database is
    /// unreachable or a migration fails.
    pub async fn connect(config: &PortalConfig) -> Result<Self, PortalError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .min_connections(config.database_min_connections)
            .acquire_timeout(Duration::from_secs(config.database_connect_timeout_secs))
            .connect(&config.database_url)
            .await
            .map_err(db_error)?;

        if config.persistence_run_migrations {
            sqlx::migrate!("./migrations")
                .run(&pool)
                .await
                .map_err(|e| PortalError::PersistenceError(e.to_string()))?;
            tracing::info!("database migrations applied");
        }

        Ok(Self::new(pool))
    }

    /// Returns the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl PortalStore for PostgresStore {
    async fn create_user(&self, user: NewUser) -> Result<User, PortalError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4) \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortalError::EmailTaken
            } else {
                db_error(e)
            }
        })?;

        row.try_into()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, PortalError> {
        sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1)"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .map(User::try_from)
        .transpose()
    }

    async fn create_job(&self, job: NewJob) -> Result<Job, PortalError> {
        let row = sqlx::query_as::<_, JobRow>(&format!(
            "INSERT INTO jobs AS j (title, description, salary, location, posted_by) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {JOB_COLUMNS}"
        ))
        .bind(&job.title)
        .bind(&job.description)
        .bind(&job.salary)
        .bind(&job.location)
        .bind(job.posted_by.get())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        row.try_into()
    }

    async fn find_job_by_id(&self, id: JobId) -> Result<Option<Job>, PortalError> {
        sqlx::query_as::<_, JobRow>(&format!("SELECT {JOB_COLUMNS} FROM jobs j WHERE j.id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?
            .map(Job::try_from)
            .transpose()
    }

    async fn update_job_status(
        &self,
        id: JobId,
        from: JobStatus,
        to: JobStatus,
    ) -> Result<StatusUpdate, PortalError> {
        let updated = sqlx::query_as::<_, JobRow>(&format!(
            "UPDATE jobs AS j SET expiry_status = $3 \
             WHERE j.id = $1 AND j.expiry_status = $2 RETURNING {JOB_COLUMNS}"
        ))
        .bind(id.get())
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        if let Some(row) = updated {
            return Ok(StatusUpdate::Changed(row.try_into()?));
        }
        let current = self
            .find_job_by_id(id)
            .await?
            .ok_or(PortalError::JobNotFound(id))?;
        Ok(StatusUpdate::Unchanged(current))
    }

    async fn list_jobs(&self, viewer: Option<UserId>) -> Result<Vec<JobListing>, PortalError> {
        let rows = sqlx::query_as::<_, JobListingRow>(&format!(
            "SELECT {JOB_COLUMNS}, u.name AS posted_by_name, \
             (a.id IS NOT NULL) AS has_applied, a.status AS application_status \
             FROM jobs j \
             LEFT JOIN users u ON u.id = j.posted_by \
             LEFT JOIN applications a ON a.job_id = j.id AND a.user_id = $1 \
             ORDER BY (j.expiry_status = 'active') DESC, j.created_at DESC, j.id DESC"
        ))
        .bind(viewer.map(UserId::get))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        normalize(rows)
    }

    async fn jobs_by_owner(&self, owner: UserId) -> Result<Vec<OwnedJob>, PortalError> {
        let rows = sqlx::query_as::<_, OwnedJobRow>(&format!(
            "SELECT {JOB_COLUMNS}, COUNT(a.id) AS application_count \
             FROM jobs j \
             LEFT JOIN applications a ON a.job_id = j.id \
             WHERE j.posted_by = $1 \
             GROUP BY j.id \
             ORDER BY j.created_at DESC, j.id DESC"
        ))
        .bind(owner.get())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        normalize(rows)
    }

    async fn has_applied(&self, job: JobId, user: UserId) -> Result<bool, PortalError> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM applications WHERE job_id = $1 AND user_id = $2)",
        )
        .bind(job.get())
        .bind(user.get())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)
    }

    async fn create_application(
        &self,
        job: JobId,
        user: UserId,
    ) -> Result<Application, PortalError> {
        let row = sqlx::query_as::<_, ApplicationRow>(
            "INSERT INTO applications (job_id, user_id) VALUES ($1, $2) \
             RETURNING id, job_id, user_id, status, created_at",
        )
        .bind(job.get())
        .bind(user.get())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortalError::AlreadyApplied {
                    job_id: job,
                    user_id: user,
                }
            } else if is_foreign_key_violation(&e) {
                PortalError::JobNotFound(job)
            } else {
                db_error(e)
            }
        })?;

        row.try_into()
    }

    async fn applications_for_job(
        &self,
        job: JobId,
    ) -> Result<Vec<ApplicationView>, PortalError> {
        let rows = sqlx::query_as::<_, ApplicationViewRow>(&format!(
            "{APPLICATION_VIEW_SELECT} WHERE a.job_id = $1 ORDER BY a.created_at DESC, a.id DESC"
        ))
        .bind(job.get())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        normalize(rows)
    }

    async fn applications_for_owner(
        &self,
        owner: UserId,
    ) -> Result<Vec<ApplicationView>, PortalError> {
        let rows = sqlx::query_as::<_, ApplicationViewRow>(&format!(
            "{APPLICATION_VIEW_SELECT} WHERE j.posted_by = $1 ORDER BY a.created_at DESC, a.id DESC"
        ))
        .bind(owner.get())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        normalize(rows)
    }

    async fn applications_by_user(
        &self,
        user: UserId,
    ) -> Result<Vec<ApplicationView>, PortalError> {
        let rows = sqlx::query_as::<_, ApplicationViewRow>(&format!(
            "{APPLICATION_VIEW_SELECT} WHERE a.user_id = $1 ORDER BY a.created_at DESC, a.id DESC"
        ))
        .bind(user.get())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        normalize(rows)
    }

    async fn owner_stats(&self, owner: UserId) -> Result<OwnerStats, PortalError> {
        let row = sqlx::query_as::<_, OwnerStatsRow>(
            "SELECT COUNT(*) AS total_jobs, \
             COUNT(*) FILTER (WHERE expiry_status = 'active') AS active_jobs, \
             COUNT(*) FILTER (WHERE expiry_status = 'expired') AS expired_jobs, \
             (SELECT COUNT(*) FROM applications a JOIN jobs o ON o.id = a.job_id \
              WHERE o.posted_by = $1) AS total_applications, \
             (SELECT COUNT(*) FROM resumes WHERE hr_id = $1) AS total_resumes, \
             (SELECT COUNT(*) FROM resumes WHERE hr_id = $1 AND status = 'uploaded') \
              AS uploaded_resumes, \
             (SELECT COUNT(*) FROM resumes WHERE hr_id = $1 AND status = 'failed') \
              AS failed_resumes \
             FROM jobs WHERE posted_by = $1",
        )
        .bind(owner.get())
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    async fn create_resume(&self, resume: NewResume) -> Result<Resume, PortalError> {
        let row = sqlx::query_as::<_, ResumeRow>(&format!(
            "INSERT INTO resumes AS r (job_id, hr_id, filename, file_path, status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {RESUME_COLUMNS}"
        ))
        .bind(resume.job_id.map(JobId::get))
        .bind(resume.hr_id.get())
        .bind(&resume.filename)
        .bind(&resume.file_path)
        .bind(resume.status.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match resume.job_id {
            Some(job) if is_foreign_key_violation(&e) => PortalError::JobNotFound(job),
            _ => db_error(e),
        })?;

        row.try_into()
    }

    async fn find_resume_by_id(&self, id: ResumeId) -> Result<Option<Resume>, PortalError> {
        sqlx::query_as::<_, ResumeRow>(&format!(
            "SELECT {RESUME_COLUMNS} FROM resumes r WHERE r.id = $1"
        ))
        .bind(id.get())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?
        .map(Resume::try_from)
        .transpose()
    }

    async fn resumes_by_owner(&self, owner: UserId) -> Result<Vec<ResumeView>, PortalError> {
        let rows = sqlx::query_as::<_, ResumeViewRow>(&format!(
            "SELECT {RESUME_COLUMNS}, j.title AS job_title \
             FROM resumes r \
             LEFT JOIN jobs j ON j.id = r.job_id \
             WHERE r.hr_id = $1 \
             ORDER BY r.created_at DESC, r.id DESC"
        ))
        .bind(owner.get())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        normalize(rows)
    }

    async fn delete_resume(&self, owner: UserId, id: ResumeId) -> Result<bool, PortalError> {
        let result = sqlx::query("DELETE FROM resumes WHERE id = $1 AND hr_id = $2")
            .bind(id.get())
            .bind(owner.get())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}
