//! The authenticated identity attached to a request or connection.

use serde::{Deserialize, Serialize};

use crate::domain::{Role, UserId};
use crate::error::PortalError;

/// Identity and role decoded from a verified credential.
///
/// Derived once per request or connection and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Principal {
    /// Authenticated user.
    pub id: UserId,
    /// Role embedded in the credential.
    pub role: Role,
}

impl Principal {
    /// Creates a principal.
    #[must_use]
    pub const fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    /// Checks that the principal holds `role`.
    ///
    /// # Errors
    ///
    /// Returns [`PortalError::Forbidden`] on mismatch. This is distinct from
    /// the [`PortalError::Unauthorized`] produced by the identity gate.
    pub fn require_role(&self, role: Role) -> Result<(), PortalError> {
        if self.role == role {
            Ok(())
        } else {
            Err(PortalError::Forbidden(format!(
                "this action requires role {role}"
            )))
        }
    }

    /// Name of the role group this principal joins on the event bus.
    #[must_use]
    pub const fn role_group(&self) -> &'static str {
        self.role.as_str()
    }

    /// Name of the per-user identity group (`user-<id>`).
    #[must_use]
    pub fn identity_group(&self) -> String {
        identity_group(self.id)
    }
}

/// Builds the identity group name for `user`.
#[must_use]
pub fn identity_group(user: UserId) -> String {
    format!("user-{user}")
}
