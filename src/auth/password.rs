//! Password hashing using Argon2id.
//!
//! Hashing is CPU-bound, so both operations run on Tokio's blocking pool
//! rather than on the request-handling workers.

use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::PortalError;

/// Argon2id hasher with fixed parameters.
#[derive(Clone)]
pub struct PasswordService {
    argon2: Argon2<'static>,
}

impl fmt::Debug for PasswordService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordService").finish_non_exhaustive()
    }
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl PasswordService {
    /// Creates a hasher with explicit cost parameters.
    #[must_use]
    pub fn new(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }

    /// Low-cost parameters for tests and local seeding.
    #[must_use]
    pub fn fast() -> Self {
        Self::new(Params::new(4096, 1, 1, None).unwrap_or_default())
    }

    /// Hashes `password` into a PHC string.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Internal`] if hashing fails or the blocking
    /// task is cancelled.
    pub async fn hash(&self, password: &str) -> Result<String, PortalError> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| PortalError::Internal(format!("failed to hash password: {e}")))
        })
        .await
        .map_err(|e| PortalError::Internal(format!("hashing task failed: {e}")))?
    }

    /// Checks `password` against a stored PHC string.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Internal`] if the stored hash is unparsable or
    /// the blocking task is cancelled. A wrong password is `Ok(false)`.
    pub async fn verify(&self, password: &str, stored: &str) -> Result<bool, PortalError> {
        let argon2 = self.argon2.clone();
        let password = password.to_owned();
        let stored = stored.to_owned();
        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&stored)
                .map_err(|e| PortalError::Internal(format!("invalid password hash: {e}")))?;
            match argon2.verify_password(password.as_bytes(), &parsed) {
                Ok(()) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(PortalError::Internal(format!(
                    "password verification error: {e}"
                ))),
            }
        })
        .await
        .map_err(|e| PortalError::Internal(format!("verification task failed: {e}")))?
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    #[tokio::test]
    async fn hash_then_verify() {
        let passwords = PasswordService::fast();
        let hash = assert_ok!(passwords.hash("correct horse").await);
        assert!(hash.starts_with("$argon2id$"));
        assert!(assert_ok!(passwords.verify("correct horse", &hash).await));
        assert!(!assert_ok!(passwords.verify("battery staple", &hash).await));
    }

    #[tokio::test]
    async fn same_password_gets_distinct_salts() {
        let passwords = PasswordService::fast();
        let a = assert_ok!(passwords.hash("pw").await);
        let b = assert_ok!(passwords.hash("pw").await);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn unparsable_hash_is_an_error() {
        let passwords = PasswordService::fast();
        assert_err!(passwords.verify("pw", "plaintext").await);
    }
}
