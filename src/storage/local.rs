//! Resume storage on the local filesystem.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;

use super::{ResumeStorage, storage_key, validate_key};
use crate::domain::{JobId, UserId};
use crate::error::PortalError;

/// Stores resumes as files below a root directory.
#[derive(Debug, Clone)]
pub struct LocalDiskStorage {
    root: PathBuf,
}

impl LocalDiskStorage {
    /// Creates a storage rooted at `root`. Directories are created on the
    /// first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, PortalError> {
        Ok(self.root.join(validate_key(key)?))
    }
}

fn io_error(action: &str, path: &Path, e: &std::io::Error) -> PortalError {
    PortalError::StorageError(format!("{action} {}: {e}", path.display()))
}

#[async_trait]
impl ResumeStorage for LocalDiskStorage {
    async fn put(
        &self,
        owner: UserId,
        job: Option<JobId>,
        filename: &str,
        contents: &[u8],
    ) -> Result<String, PortalError> {
        let key = storage_key(owner, job, filename, Utc::now());
        let path = self.resolve(&key)?;
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| io_error("creating", dir, &e))?;
        }
        tokio::fs::write(&path, contents)
            .await
            .map_err(|e| io_error("writing", &path, &e))?;
        tracing::debug!(key = %key, bytes = contents.len(), "resume stored");
        Ok(key)
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PortalError> {
        let path = self.resolve(key)?;
        match tokio::fs::read(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(io_error("reading", &path, &e)),
        }
    }

    async fn delete(&self, key: &str) -> Result<(), PortalError> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("removing", &path, &e)),
        }
    }
}
