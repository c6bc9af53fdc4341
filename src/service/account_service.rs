//! Account registration and login.

use std::sync::Arc;

use crate::auth::{PasswordService, TokenService};
use crate::domain::{NewUser, Role, User};
use crate::error::PortalError;
use crate::persistence::PortalStore;

const BAD_CREDENTIALS: &str = "invalid email or password";

/// Input to [`AccountService::register`].
#[derive(Clone, Default)]
pub struct Registration {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plain-text password.
    pub password: String,
    /// Requested role, `USER` when absent.
    pub role: Option<Role>,
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// A signed-in user and the bearer token issued to them.
#[derive(Debug, Clone)]
pub struct Session {
    /// Bearer token for subsequent requests and the real-time handshake.
    pub token: String,
    /// The account.
    pub user: User,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Creates accounts and exchanges credentials for tokens.
#[derive(Debug, Clone)]
pub struct AccountService {
    store: Arc<dyn PortalStore>,
    passwords: PasswordService,
    tokens: Arc<TokenService>,
}

impl AccountService {
    /// Creates a new `AccountService`.
    #[must_use]
    pub fn new(
        store: Arc<dyn PortalStore>,
        passwords: PasswordService,
        tokens: Arc<TokenService>,
    ) -> Self {
        Self {
            store,
            passwords,
            tokens,
        }
    }

    /// Registers a new account and signs it in.
    ///
    /// # Errors
    ///
    /// [`PortalError::InvalidRequest`] if name, email or password is blank,
    /// [`PortalError::EmailTaken`] if the email is registered, or a store
    /// error.
    pub async fn register(&self, registration: Registration) -> Result<Session, PortalError> {
        let name = registration.name.trim().to_string();
        let email = normalize_email(&registration.email);
        if name.is_empty() || email.is_empty() || registration.password.is_empty() {
            return Err(PortalError::InvalidRequest(
                "name, email, and password are required".to_string(),
            ));
        }
        if self.store.find_user_by_email(&email).await?.is_some() {
            return Err(PortalError::EmailTaken);
        }

        let password_hash = self.passwords.hash(&registration.password).await?;
        let user = self
            .store
            .create_user(NewUser {
                name,
                email,
                password_hash,
                role: registration.role.unwrap_or(Role::User),
            })
            .await?;
        tracing::info!(user_id = %user.id, role = %user.role, "account registered");

        let token = self.tokens.issue(&user)?;
        Ok(Session { token, user })
    }

    /// Verifies `email` and `password` and issues a token.
    ///
    /// # Errors
    ///
    /// [`PortalError::InvalidRequest`] if either is blank,
    /// [`PortalError::Unauthorized`] for an unknown email or a wrong
    /// password (indistinguishable), or a store error.
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, PortalError> {
        let email = normalize_email(email);
        if email.is_empty() || password.is_empty() {
            return Err(PortalError::InvalidRequest(
                "email and password are required".to_string(),
            ));
        }

        let Some(user) = self.store.find_user_by_email(&email).await? else {
            tracing::debug!("login for unknown email");
            return Err(PortalError::Unauthorized(BAD_CREDENTIALS.to_string()));
        };
        if !self.passwords.verify(password, &user.password_hash).await? {
            tracing::debug!(user_id = %user.id, "login with wrong password");
            return Err(PortalError::Unauthorized(BAD_CREDENTIALS.to_string()));
        }

        let token = self.tokens.issue(&user)?;
        tracing::info!(user_id = %user.id, "login succeeded");
        Ok(Session { token, user })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use chrono::Duration;
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::auth::TokenConfig;
    use crate::persistence::MemoryStore;

    fn service() -> (AccountService, Arc<TokenService>) {
        let tokens = Arc::new(TokenService::new(&TokenConfig {
            secret: "test-secret".to_string(),
            issuer: "job-portal".to_string(),
            ttl: Duration::hours(1),
        }));
        let service = AccountService::new(
            Arc::new(MemoryStore::new()),
            PasswordService::fast(),
            Arc::clone(&tokens),
        );
        (service, tokens)
    }

    fn registration(email: &str, role: Option<Role>) -> Registration {
        Registration {
            name: "Dana".to_string(),
            email: email.to_string(),
            password: "hunter22".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn register_then_login() {
        let (service, tokens) = service();
        let session = assert_ok!(
            service
                .register(registration(" Dana@Example.com ", Some(Role::Hr)))
                .await
        );
        assert_eq!(session.user.email, "dana@example.com");
        let principal = assert_ok!(tokens.verify(&session.token));
        assert_eq!(principal.id, session.user.id);
        assert_eq!(principal.role, Role::Hr);

        let login = assert_ok!(service.login("dana@example.com", "hunter22").await);
        assert_eq!(login.user.id, session.user.id);
    }

    #[tokio::test]
    async fn role_defaults_to_user() {
        let (service, _) = service();
        let session = assert_ok!(service.register(registration("u@example.com", None)).await);
        assert_eq!(session.user.role, Role::User);
    }

    #[tokio::test]
    async fn duplicate_email_and_blank_fields() {
        let (service, _) = service();
        assert_ok!(service.register(registration("a@example.com", None)).await);
        let err = assert_err!(service.register(registration("A@example.com", None)).await);
        assert!(matches!(err, PortalError::EmailTaken));

        let err = assert_err!(service.register(registration("  ", None)).await);
        assert!(matches!(err, PortalError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn bad_credentials_are_indistinguishable() {
        let (service, _) = service();
        assert_ok!(service.register(registration("b@example.com", None)).await);

        let wrong_password = assert_err!(service.login("b@example.com", "nope").await);
        let unknown_email = assert_err!(service.login("c@example.com", "hunter22").await);
        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert!(matches!(wrong_password, PortalError::Unauthorized(_)));
    }
}
