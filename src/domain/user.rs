//! Portal users and their roles.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::UserId;

/// Portal role. Serialized upper-case (`"HR"`, `"USER"`) on the wire, in
/// tokens, and in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Role {
    /// Recruiter: posts and expires jobs, reviews applications.
    #[serde(rename = "HR")]
    Hr,
    /// Job seeker: browses and applies to jobs.
    #[serde(rename = "USER")]
    User,
}

impl Role {
    /// Returns the canonical upper-case name, also used as the role group
    /// name on the event bus.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hr => "HR",
            Self::User => "USER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a role string is neither `HR` nor `USER`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    /// Case-insensitive: registration accepts `"hr"` as well as `"HR"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "HR" => Ok(Self::Hr),
            "USER" => Ok(Self::User),
            _ => Err(UnknownRole(s.to_string())),
        }
    }
}

/// A stored user account.
#[derive(Debug, Clone)]
pub struct User {
    /// Database identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email, unique across users.
    pub email: String,
    /// Argon2id PHC string. Never serialized.
    pub password_hash: String,
    /// Portal role.
    pub role: Role,
    /// Registration timestamp.
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Portal role.
    pub role: Role,
}
