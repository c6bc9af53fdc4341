//! Axum extractors that run the identity gate on REST requests.

use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::{Principal, bearer_token};
use crate::app_state::AppState;
use crate::error::PortalError;

/// Required authentication. Rejects with `401` before the handler runs
/// when the `Authorization` header is missing or the token is invalid.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Principal);

impl Deref for AuthUser {
    type Target = Principal;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = PortalError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal = state
            .tokens
            .verify_credential(bearer_token(&parts.headers))
            .inspect_err(|e| tracing::debug!(path = %parts.uri.path(), error = %e, "request rejected"))?;
        Ok(Self(principal))
    }
}

/// Optional authentication for public endpoints that personalize their
/// output. An absent or invalid token yields `None`, never a rejection.
#[derive(Debug, Clone, Copy)]
pub struct MaybeAuthUser(pub Option<Principal>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let principal =
            bearer_token(&parts.headers).and_then(|token| state.tokens.verify(token).ok());
        Ok(Self(principal))
    }
}
