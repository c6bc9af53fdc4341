//! Resume file storage.
//!
//! [`ResumeStorage`] holds resume contents under opaque keys; the resume
//! record in the store keeps the key. [`LocalDiskStorage`] writes under a
//! root directory, [`MemoryStorage`] keeps files in process memory.
//!
//! Keys are relative paths of the form
//! `YYYY/MM/<hr-id>/[job-<id>_]<unix-ms>_<random>_<name>`, so files group
//! by upload month and uploader.

pub mod local;
pub mod memory;

use std::fmt;
use std::path::{Component, Path};

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

pub use local::LocalDiskStorage;
pub use memory::MemoryStorage;

use crate::domain::{JobId, UserId};
use crate::error::PortalError;

/// Longest sanitized file name kept in a key.
const MAX_NAME_LEN: usize = 100;

/// Backend that stores resume contents.
#[async_trait]
pub trait ResumeStorage: Send + Sync + fmt::Debug {
    /// Stores `contents` for a file uploaded by `owner` and returns its key.
    ///
    /// # Errors
    ///
    /// [`PortalError::StorageError`] if the file cannot be written.
    async fn put(
        &self,
        owner: UserId,
        job: Option<JobId>,
        filename: &str,
        contents: &[u8],
    ) -> Result<String, PortalError>;

    /// Reads the file stored under `key`, `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// [`PortalError::StorageError`] on a malformed key or read failure.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PortalError>;

    /// Removes the file stored under `key`. Removing a missing file succeeds.
    ///
    /// # Errors
    ///
    /// [`PortalError::StorageError`] on a malformed key or delete failure.
    async fn delete(&self, key: &str) -> Result<(), PortalError>;
}

/// Builds the storage key for an upload made at `now`.
#[must_use]
pub fn storage_key(
    owner: UserId,
    job: Option<JobId>,
    filename: &str,
    now: DateTime<Utc>,
) -> String {
    let job_prefix = job.map(|id| format!("job-{id}_")).unwrap_or_default();
    let random = Uuid::new_v4().simple().to_string();
    let random = random.get(..8).unwrap_or(&random);
    format!(
        "{:04}/{:02}/{owner}/{job_prefix}{}_{random}_{}",
        now.year(),
        now.month(),
        now.timestamp_millis(),
        sanitize_filename(filename),
    )
}

/// Reduces a client file name to a safe single path segment: directory
/// parts are dropped and anything outside `[A-Za-z0-9._-]` becomes `_`.
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename)
        .trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    let start = cleaned.len().saturating_sub(MAX_NAME_LEN);
    match cleaned.get(start..) {
        Some(tail) if !tail.is_empty() => tail.to_string(),
        _ => "resume".to_string(),
    }
}

/// Checks that `key` is a relative path without `..` or root components.
///
/// # Errors
///
/// [`PortalError::StorageError`] if the key could escape the storage root.
pub fn validate_key(key: &str) -> Result<&Path, PortalError> {
    let path = Path::new(key);
    let plain = !key.is_empty() && path.components().all(|c| matches!(c, Component::Normal(_)));
    if plain {
        Ok(path)
    } else {
        Err(PortalError::StorageError(format!("invalid storage key: {key}")))
    }
}
