//! Resume storage in process memory.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{ResumeStorage, storage_key, validate_key};
use crate::domain::{JobId, UserId};
use crate::error::PortalError;

/// Keeps resume contents in a map. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    /// Creates an empty storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored files.
    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    /// Returns `true` if no file is stored.
    pub async fn is_empty(&self) -> bool {
        self.files.read().await.is_empty()
    }
}

#[async_trait]
impl ResumeStorage for MemoryStorage {
    async fn put(
        &self,
        owner: UserId,
        job: Option<JobId>,
        filename: &str,
        contents: &[u8],
    ) -> Result<String, PortalError> {
        let key = storage_key(owner, job, filename, Utc::now());
        self.files.write().await.insert(key.clone(), contents.to_vec());
        Ok(key)
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, PortalError> {
        validate_key(key)?;
        Ok(self.files.read().await.get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<(), PortalError> {
        validate_key(key)?;
        self.files.write().await.remove(key);
        Ok(())
    }
}
