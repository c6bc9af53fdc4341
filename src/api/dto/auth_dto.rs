//! Registration and login DTOs.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Role, User, UserId};
use crate::error::PortalError;
use crate::service::{Registration, Session};

/// Request body for `POST /api/auth/register`.
#[derive(Deserialize, ToSchema)]
pub struct RegisterRequest {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Login email.
    #[serde(default)]
    pub email: String,
    /// Plain-text password.
    #[serde(default)]
    pub password: String,
    /// `HR` or `USER` (case-insensitive). Defaults to `USER`.
    #[serde(default)]
    pub role: Option<String>,
}

impl std::fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = PortalError;

    fn try_from(req: RegisterRequest) -> Result<Self, Self::Error> {
        let role = req
            .role
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::parse::<Role>)
            .transpose()
            .map_err(|e| PortalError::InvalidRequest(e.to_string()))?;
        Ok(Self {
            name: req.name,
            email: req.email,
            password: req.password,
            role,
        })
    }
}

/// Request body for `POST /api/auth/login`.
#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    /// Login email.
    #[serde(default)]
    pub email: String,
    /// Plain-text password.
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Public view of an account. Never carries the password hash.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserDto {
    /// Account id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Portal role.
    pub role: Role,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Token plus account, the `data` of both auth responses.
#[derive(Debug, Serialize, ToSchema)]
pub struct SessionDto {
    /// Bearer token.
    pub token: String,
    /// The signed-in account.
    pub user: UserDto,
}

impl From<Session> for SessionDto {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            user: session.user.into(),
        }
    }
}

/// Response body for register (201) and login (200).
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    /// Always `true`.
    pub success: bool,
    /// Outcome summary.
    pub message: String,
    /// Token repeated at the top level on login.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Token and account.
    pub data: SessionDto,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn request(role: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            name: "Kim".to_string(),
            email: "kim@example.com".to_string(),
            password: "pw".to_string(),
            role: role.map(str::to_string),
        }
    }

    #[test]
    fn role_is_case_insensitive_and_optional() {
        let Ok(reg) = Registration::try_from(request(Some("hr"))) else {
            panic!("hr should parse");
        };
        assert_eq!(reg.role, Some(Role::Hr));

        let Ok(reg) = Registration::try_from(request(Some(""))) else {
            panic!("blank role should default");
        };
        assert_eq!(reg.role, None);
    }

    #[test]
    fn unknown_role_is_invalid_request() {
        let result = Registration::try_from(request(Some("ADMIN")));
        assert!(matches!(result, Err(PortalError::InvalidRequest(_))));
    }

    #[test]
    fn debug_omits_password() {
        let text = format!("{:?}", request(None));
        assert!(!text.contains("pw\""));
    }
}
