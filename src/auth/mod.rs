//! Identity gate: credential verification, principals, and role checks.
//!
//! Every protected REST request and every real-time handshake presents a
//! bearer token. [`TokenService`] verifies it and yields a [`Principal`];
//! role checks are layered on top via [`Principal::require_role`].

pub mod extract;
pub mod password;
pub mod principal;
pub mod token;

pub use extract::{AuthUser, MaybeAuthUser};
pub use password::PasswordService;
pub use principal::{Principal, identity_group};
pub use token::{Claims, TokenConfig, TokenService, bearer_token};
