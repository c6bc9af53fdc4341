//! Resume service: uploads, listing and retrieval of HR resume files.

use std::sync::Arc;

use crate::auth::Principal;
use crate::domain::{JobId, NewResume, Resume, ResumeId, ResumeStatus, ResumeView, Role};
use crate::error::PortalError;
use crate::persistence::PortalStore;
use crate::storage::ResumeStorage;

/// File extensions accepted for resumes, lowercase.
pub const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "doc", "docx", "jpg", "jpeg", "png"];

/// One file received in an upload request.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    /// Client file name.
    pub filename: String,
    /// File contents.
    pub contents: Vec<u8>,
}

/// A file of an upload request that was not stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedUpload {
    /// Client file name.
    pub filename: String,
    /// Reason shown to the uploader.
    pub error: String,
}

/// Per-file results of an upload request.
#[derive(Debug, Clone, Default)]
pub struct UploadOutcome {
    /// Stored files and their records.
    pub uploaded: Vec<Resume>,
    /// Files that were rejected or could not be stored.
    pub failed: Vec<FailedUpload>,
}

impl UploadOutcome {
    /// Number of files the request carried.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.uploaded.len().saturating_add(self.failed.len())
    }
}

/// A resume's contents ready to be sent to its owner.
#[derive(Debug, Clone)]
pub struct ResumeDownload {
    /// The resume record.
    pub resume: Resume,
    /// File contents.
    pub contents: Vec<u8>,
}

/// HR-only resume management over a [`PortalStore`] and a
/// [`ResumeStorage`].
///
/// Every read and delete checks that the caller uploaded the resume; other
/// HR users get [`PortalError::Forbidden`].
#[derive(Debug, Clone)]
pub struct ResumeService {
    store: Arc<dyn PortalStore>,
    storage: Arc<dyn ResumeStorage>,
    max_bytes: usize,
}

impl ResumeService {
    /// Creates a new `ResumeService` accepting files up to `max_bytes`.
    #[must_use]
    pub fn new(
        store: Arc<dyn PortalStore>,
        storage: Arc<dyn ResumeStorage>,
        max_bytes: usize,
    ) -> Self {
        Self {
            store,
            storage,
            max_bytes,
        }
    }

    /// Per-file size limit in bytes.
    #[must_use]
    pub const fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Stores `files` for `owner`, optionally linked to `job`.
    ///
    /// Files are handled one by one. A file with an unsupported extension
    /// or over the size limit is reported as failed without a record. A
    /// file the storage refuses gets a `failed` record. A file that cannot
    /// be recorded is removed from storage again and reported as failed.
    ///
    /// # Errors
    ///
    /// [`PortalError::Forbidden`] unless `owner` is HR,
    /// [`PortalError::InvalidRequest`] if `files` is empty,
    /// [`PortalError::JobNotFound`] if `job` does not exist, or a store
    /// error.
    pub async fn upload(
        &self,
        owner: Principal,
        job: Option<JobId>,
        files: Vec<ResumeFile>,
    ) -> Result<UploadOutcome, PortalError> {
        owner.require_role(Role::Hr)?;
        if files.is_empty() {
            return Err(PortalError::InvalidRequest("No files uploaded".to_string()));
        }
        if let Some(job_id) = job {
            self.store
                .find_job_by_id(job_id)
                .await?
                .ok_or(PortalError::JobNotFound(job_id))?;
        }

        let mut outcome = UploadOutcome::default();
        for file in files {
            if let Err(reason) = self.check_file(&file) {
                tracing::debug!(filename = %file.filename, %reason, "resume rejected");
                outcome.failed.push(FailedUpload {
                    filename: file.filename,
                    error: reason,
                });
                continue;
            }
            match self.store_file(owner, job, file).await {
                Ok(resume) => outcome.uploaded.push(resume),
                Err(failed) => outcome.failed.push(failed),
            }
        }
        tracing::info!(
            owner = %owner.id,
            uploaded = outcome.uploaded.len(),
            failed = outcome.failed.len(),
            "resumes processed"
        );
        Ok(outcome)
    }

    fn check_file(&self, file: &ResumeFile) -> Result<(), String> {
        let extension = file
            .filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(format!(
                "unsupported file type, allowed: {}",
                ALLOWED_EXTENSIONS.join(", ")
            ));
        }
        if file.contents.is_empty() {
            return Err("file is empty".to_string());
        }
        if file.contents.len() > self.max_bytes {
            return Err(format!("file exceeds the {} byte limit", self.max_bytes));
        }
        Ok(())
    }

    /// Stores one checked file and records it. Any failure is reported
    /// against the file and leaves no stored contents behind.
    async fn store_file(
        &self,
        owner: Principal,
        job: Option<JobId>,
        file: ResumeFile,
    ) -> Result<Resume, FailedUpload> {
        let record = |file_path: String, status: ResumeStatus| NewResume {
            job_id: job,
            hr_id: owner.id,
            filename: file.filename.clone(),
            file_path,
            status,
        };
        let failed = |e: PortalError| FailedUpload {
            filename: file.filename.clone(),
            error: e.to_string(),
        };

        let key = match self
            .storage
            .put(owner.id, job, &file.filename, &file.contents)
            .await
        {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(filename = %file.filename, error = %e, "resume storage failed");
                if let Err(db) = self
                    .store
                    .create_resume(record(String::new(), ResumeStatus::Failed))
                    .await
                {
                    tracing::warn!(error = %db, "failed resume not recorded");
                }
                return Err(failed(e));
            }
        };

        match self
            .store
            .create_resume(record(key.clone(), ResumeStatus::Uploaded))
            .await
        {
            Ok(resume) => Ok(resume),
            Err(e) => {
                tracing::warn!(filename = %file.filename, error = %e, "resume not recorded");
                if let Err(cleanup) = self.storage.delete(&key).await {
                    tracing::warn!(key = %key, error = %cleanup, "orphaned resume file");
                }
                Err(failed(e))
            }
        }
    }

    /// Lists the resumes uploaded by `owner`, newest first.
    ///
    /// # Errors
    ///
    /// [`PortalError::Forbidden`] unless `owner` is HR, or a store error.
    pub async fn list(&self, owner: Principal) -> Result<Vec<ResumeView>, PortalError> {
        owner.require_role(Role::Hr)?;
        self.store.resumes_by_owner(owner.id).await
    }

    /// Loads resume `id` on behalf of `owner`.
    ///
    /// # Errors
    ///
    /// [`PortalError::Forbidden`] unless `owner` is HR and uploaded it,
    /// [`PortalError::ResumeNotFound`] if it does not exist, or a store
    /// error.
    pub async fn locate(&self, owner: Principal, id: ResumeId) -> Result<Resume, PortalError> {
        owner.require_role(Role::Hr)?;
        let resume = self
            .store
            .find_resume_by_id(id)
            .await?
            .ok_or(PortalError::ResumeNotFound(id))?;
        if !resume.is_owned_by(owner.id) {
            tracing::warn!(
                resume_id = %id,
                actor = %owner.id,
                "resume access rejected, not the owner"
            );
            return Err(PortalError::Forbidden(
                "you can only access your own resumes".to_string(),
            ));
        }
        Ok(resume)
    }

    /// Reads the contents of resume `id`.
    ///
    /// # Errors
    ///
    /// As [`ResumeService::locate`], plus [`PortalError::ResumeFileMissing`]
    /// if the file is not in storage and [`PortalError::StorageError`] if
    /// it cannot be read.
    pub async fn download(
        &self,
        owner: Principal,
        id: ResumeId,
    ) -> Result<ResumeDownload, PortalError> {
        let resume = self.locate(owner, id).await?;
        if resume.status == ResumeStatus::Failed {
            return Err(PortalError::ResumeFileMissing(id));
        }
        let contents = self
            .storage
            .get(&resume.file_path)
            .await?
            .ok_or(PortalError::ResumeFileMissing(id))?;
        Ok(ResumeDownload { resume, contents })
    }

    /// Deletes resume `id` and its file. A file that cannot be removed is
    /// logged and the record is deleted anyway.
    ///
    /// # Errors
    ///
    /// As [`ResumeService::locate`], or a store error.
    pub async fn delete(&self, owner: Principal, id: ResumeId) -> Result<Resume, PortalError> {
        let resume = self.locate(owner, id).await?;
        if !resume.file_path.is_empty()
            && let Err(e) = self.storage.delete(&resume.file_path).await
        {
            tracing::warn!(resume_id = %id, error = %e, "resume file not removed");
        }
        if !self.store.delete_resume(owner.id, id).await? {
            return Err(PortalError::ResumeNotFound(id));
        }
        tracing::info!(resume_id = %id, owner = %owner.id, "resume deleted");
        Ok(resume)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use async_trait::async_trait;
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::domain::{NewJob, NewUser, UserId};
    use crate::persistence::MemoryStore;
    use crate::storage::{LocalDiskStorage, MemoryStorage};

    #[derive(Debug)]
    struct BrokenStorage;

    #[async_trait]
    impl ResumeStorage for BrokenStorage {
        async fn put(
            &self,
            _owner: UserId,
            _job: Option<JobId>,
            _filename: &str,
            _contents: &[u8],
        ) -> Result<String, PortalError> {
            Err(PortalError::StorageError("disk full".to_string()))
        }

        async fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, PortalError> {
            Ok(None)
        }

        async fn delete(&self, _key: &str) -> Result<(), PortalError> {
            Err(PortalError::StorageError("read-only".to_string()))
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        storage: Arc<MemoryStorage>,
        service: ResumeService,
        hr: Principal,
        other_hr: Principal,
        seeker: Principal,
    }

    async fn principal(store: &MemoryStore, name: &str, role: Role) -> Principal {
        let user = assert_ok!(
            store
                .create_user(NewUser {
                    name: name.to_string(),
                    email: format!("{name}@example.com"),
                    password_hash: "hash".to_string(),
                    role,
                })
                .await
        );
        Principal::new(user.id, role)
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let storage = Arc::new(MemoryStorage::new());
        let service = ResumeService::new(
            Arc::clone(&store) as Arc<dyn PortalStore>,
            Arc::clone(&storage) as Arc<dyn ResumeStorage>,
            1024,
        );
        Fixture {
            hr: principal(&store, "hr", Role::Hr).await,
            other_hr: principal(&store, "other", Role::Hr).await,
            seeker: principal(&store, "seeker", Role::User).await,
            store,
            storage,
            service,
        }
    }

    fn file(name: &str, contents: &[u8]) -> ResumeFile {
        ResumeFile {
            filename: name.to_string(),
            contents: contents.to_vec(),
        }
    }

    #[tokio::test]
    async fn upload_sorts_files_into_uploaded_and_failed() {
        let fx = fixture().await;
        let outcome = assert_ok!(
            fx.service
                .upload(
                    fx.hr,
                    None,
                    vec![
                        file("cv.pdf", b"pdf"),
                        file("Photo.PNG", b"png"),
                        file("run.exe", b"mz"),
                        file("big.docx", &[0; 2048]),
                    ],
                )
                .await
        );
        assert_eq!(outcome.processed(), 4);
        assert_eq!(outcome.uploaded.len(), 2);
        let failed: Vec<&str> = outcome.failed.iter().map(|f| f.filename.as_str()).collect();
        assert_eq!(failed, vec!["run.exe", "big.docx"]);
        assert_eq!(fx.storage.len().await, 2);

        let stats = assert_ok!(fx.store.owner_stats(fx.hr.id).await);
        assert_eq!((stats.total_resumes, stats.uploaded_resumes), (2, 2));
    }

    #[tokio::test]
    async fn upload_requires_hr_files_and_known_job() {
        let fx = fixture().await;
        let err = assert_err!(
            fx.service
                .upload(fx.seeker, None, vec![file("a.pdf", b"x")])
                .await
        );
        assert!(matches!(err, PortalError::Forbidden(_)));

        let err = assert_err!(fx.service.upload(fx.hr, None, Vec::new()).await);
        assert!(matches!(err, PortalError::InvalidRequest(ref m) if m == "No files uploaded"));

        let err = assert_err!(
            fx.service
                .upload(fx.hr, Some(JobId::new(99)), vec![file("a.pdf", b"x")])
                .await
        );
        assert!(matches!(err, PortalError::JobNotFound(_)));
    }

    #[tokio::test]
    async fn storage_failure_is_recorded_as_failed() {
        let store = Arc::new(MemoryStore::new());
        let hr = principal(&store, "hr", Role::Hr).await;
        let service = ResumeService::new(
            Arc::clone(&store) as Arc<dyn PortalStore>,
            Arc::new(BrokenStorage),
            1024,
        );

        let outcome = assert_ok!(service.upload(hr, None, vec![file("cv.pdf", b"x")]).await);
        assert!(outcome.uploaded.is_empty());
        assert_eq!(
            outcome.failed.first().map(|f| f.error.as_str()),
            Some("storage error: disk full")
        );

        let stats = assert_ok!(store.owner_stats(hr.id).await);
        assert_eq!((stats.total_resumes, stats.failed_resumes), (1, 1));

        let listed = assert_ok!(service.list(hr).await);
        let Some(view) = listed.first() else {
            panic!("failed resume should be listed");
        };
        let err = assert_err!(service.download(hr, view.resume.id).await);
        assert!(matches!(err, PortalError::ResumeFileMissing(_)));
    }

    #[tokio::test]
    async fn only_the_uploader_can_read_or_delete() {
        let fx = fixture().await;
        let job = assert_ok!(
            fx.store
                .create_job(NewJob {
                    title: "Rust Dev".to_string(),
                    description: "d".to_string(),
                    salary: "1".to_string(),
                    location: "l".to_string(),
                    posted_by: fx.hr.id,
                })
                .await
        );
        let outcome = assert_ok!(
            fx.service
                .upload(fx.hr, Some(job.id), vec![file("cv.pdf", b"resume body")])
                .await
        );
        let Some(resume) = outcome.uploaded.first().cloned() else {
            panic!("upload should succeed");
        };
        assert_eq!(resume.job_id, Some(job.id));

        for err in [
            assert_err!(fx.service.locate(fx.other_hr, resume.id).await),
            assert_err!(fx.service.download(fx.other_hr, resume.id).await),
            assert_err!(fx.service.delete(fx.other_hr, resume.id).await),
        ] {
            assert!(matches!(err, PortalError::Forbidden(_)));
        }
        assert!(assert_ok!(fx.service.list(fx.other_hr).await).is_empty());

        let download = assert_ok!(fx.service.download(fx.hr, resume.id).await);
        assert_eq!(download.contents, b"resume body");

        assert_ok!(fx.service.delete(fx.hr, resume.id).await);
        assert!(fx.storage.is_empty().await);
        let err = assert_err!(fx.service.locate(fx.hr, resume.id).await);
        assert!(matches!(err, PortalError::ResumeNotFound(_)));
    }

    #[tokio::test]
    async fn delete_survives_storage_errors() {
        let store = Arc::new(MemoryStore::new());
        let hr = principal(&store, "hr", Role::Hr).await;
        let resume = assert_ok!(
            store
                .create_resume(NewResume {
                    job_id: None,
                    hr_id: hr.id,
                    filename: "cv.pdf".to_string(),
                    file_path: "2026/01/1/cv.pdf".to_string(),
                    status: ResumeStatus::Uploaded,
                })
                .await
        );
        let service = ResumeService::new(
            Arc::clone(&store) as Arc<dyn PortalStore>,
            Arc::new(BrokenStorage),
            1024,
        );
        assert_ok!(service.delete(hr, resume.id).await);
        assert!(assert_ok!(store.find_resume_by_id(resume.id).await).is_none());
    }

    #[tokio::test]
    async fn missing_file_on_disk_is_not_found() {
        let Ok(dir) = tempfile::tempdir() else {
            panic!("temp dir");
        };
        let store = Arc::new(MemoryStore::new());
        let hr = principal(&store, "hr", Role::Hr).await;
        let disk = Arc::new(LocalDiskStorage::new(dir.path()));
        let service = ResumeService::new(
            Arc::clone(&store) as Arc<dyn PortalStore>,
            Arc::clone(&disk) as Arc<dyn ResumeStorage>,
            1024,
        );
        let outcome = assert_ok!(service.upload(hr, None, vec![file("cv.doc", b"doc")]).await);
        let Some(resume) = outcome.uploaded.first() else {
            panic!("upload should succeed");
        };
        assert_ok!(disk.delete(&resume.file_path).await);

        let err = assert_err!(service.download(hr, resume.id).await);
        assert!(matches!(err, PortalError::ResumeFileMissing(_)));
    }
}
