//! Bearer token issuance and verification (the identity gate).
//!
//! Tokens are HS256 JWTs signed with a server-held secret. Verification is
//! stateless: every request and every real-time handshake re-verifies the
//! token from scratch.

use std::fmt;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use super::Principal;
use crate::domain::{Role, User, UserId};
use crate::error::PortalError;

/// Message returned for every verification failure, whatever the cause.
const INVALID_TOKEN: &str = "invalid or expired token";

/// JWT claims carried by portal tokens.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id as a decimal string.
    pub sub: String,
    /// Portal role.
    pub role: Role,
    /// Login email, informational only.
    pub email: String,
    /// Issuer.
    pub iss: String,
    /// Issued at (Unix seconds).
    pub iat: i64,
    /// Expiration (Unix seconds).
    pub exp: i64,
}

/// Token signing settings.
#[derive(Clone)]
pub struct TokenConfig {
    /// HMAC secret.
    pub secret: String,
    /// Value written to and required in the `iss` claim.
    pub issuer: String,
    /// Lifetime of issued tokens.
    pub ttl: Duration,
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish()
    }
}

/// Issues and verifies bearer tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl: Duration,
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("issuer", &self.issuer)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a token service from its configuration.
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            ttl: config.ttl,
        }
    }

    /// Issues a token for `user` with the configured lifetime.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Internal`] if signing fails.
    pub fn issue(&self, user: &User) -> Result<String, PortalError> {
        self.issue_with_ttl(Principal::new(user.id, user.role), &user.email, self.ttl)
    }

    /// Issues a token for `principal` with an explicit lifetime. A negative
    /// lifetime yields an already-expired token.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Internal`] if signing fails or `ttl` moves the
    /// expiry outside the representable time range.
    pub fn issue_with_ttl(
        &self,
        principal: Principal,
        email: &str,
        ttl: Duration,
    ) -> Result<String, PortalError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| PortalError::Internal("token lifetime out of range".to_string()))?;
        let claims = Claims {
            sub: principal.id.to_string(),
            role: principal.role,
            email: email.to_string(),
            iss: self.issuer.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| PortalError::Internal(format!("token signing failed: {e}")))
    }

    /// Verifies `token` and returns the principal it was issued to.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Unauthorized`] for a bad signature, an expired
    /// or malformed token, a foreign issuer, or a non-numeric subject.
    pub fn verify(&self, token: &str) -> Result<Principal, PortalError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "token rejected");
            PortalError::Unauthorized(INVALID_TOKEN.to_string())
        })?;

        let id: UserId = data.claims.sub.parse().map_err(|_| {
            tracing::debug!(sub = %data.claims.sub, "token subject is not a user id");
            PortalError::Unauthorized(INVALID_TOKEN.to_string())
        })?;

        Ok(Principal::new(id, data.claims.role))
    }

    /// Verifies an optional credential, treating absence as a failure.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Unauthorized`] when `credential` is `None` or
    /// fails [`TokenService::verify`].
    pub fn verify_credential(&self, credential: Option<&str>) -> Result<Principal, PortalError> {
        match credential.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => self.verify(token),
            None => Err(PortalError::Unauthorized("no token provided".to_string())),
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
#[must_use]
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::http::HeaderValue;
    use tokio_test::{assert_err, assert_ok};

    use super::*;

    fn config(secret: &str) -> TokenConfig {
        TokenConfig {
            secret: secret.to_string(),
            issuer: "job-portal".to_string(),
            ttl: Duration::hours(1),
        }
    }

    fn hr() -> Principal {
        Principal::new(UserId::new(5), Role::Hr)
    }

    #[test]
    fn issued_token_verifies_to_same_principal() {
        let tokens = TokenService::new(&config("s3cret"));
        let token = assert_ok!(tokens.issue_with_ttl(hr(), "hr@example.com", Duration::hours(1)));
        let principal = assert_ok!(tokens.verify(&token));
        assert_eq!(principal, hr());
    }

    #[test]
    fn expired_token_is_rejected() {
        let tokens = TokenService::new(&config("s3cret"));
        let token = assert_ok!(tokens.issue_with_ttl(hr(), "hr@example.com", Duration::hours(-2)));
        let err = assert_err!(tokens.verify(&token));
        assert!(matches!(err, PortalError::Unauthorized(ref m) if m == INVALID_TOKEN));
    }

    #[test]
    fn out_of_range_lifetime_is_an_error() {
        let tokens = TokenService::new(&config("s3cret"));
        let err = assert_err!(tokens.issue_with_ttl(
            hr(),
            "hr@example.com",
            Duration::seconds(1_000_000_000_000_000)
        ));
        assert!(matches!(err, PortalError::Internal(_)));
    }

    #[test]
    fn token_from_other_secret_is_rejected() {
        let issuer = TokenService::new(&config("one"));
        let verifier = TokenService::new(&config("two"));
        let token = assert_ok!(issuer.issue_with_ttl(hr(), "hr@example.com", Duration::hours(1)));
        assert_err!(verifier.verify(&token));
    }

    #[test]
    fn token_from_other_issuer_is_rejected() {
        let mut foreign = config("s3cret");
        foreign.issuer = "someone-else".to_string();
        let token = assert_ok!(TokenService::new(&foreign).issue_with_ttl(
            hr(),
            "hr@example.com",
            Duration::hours(1)
        ));
        assert_err!(TokenService::new(&config("s3cret")).verify(&token));
    }

    #[test]
    fn garbage_and_missing_credentials_are_rejected() {
        let tokens = TokenService::new(&config("s3cret"));
        assert_err!(tokens.verify("not-a-jwt"));
        assert_err!(tokens.verify_credential(None));
        assert_err!(tokens.verify_credential(Some("   ")));
    }

    #[test]
    fn bearer_header_parsing() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&headers), Some("abc.def"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("bearer xyz"));
        assert_eq!(bearer_token(&headers), Some("xyz"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        assert_eq!(bearer_token(&headers), None);
    }
}
