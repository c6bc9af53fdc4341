//! Type-safe record identifiers.
//!
//! Stored records are keyed by database-assigned `i64` values. Each kind
//! of record gets its own newtype so a [`JobId`] can never be passed where
//! a [`UserId`] is expected.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
            ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a raw database identifier.
            #[must_use]
            pub const fn new(raw: i64) -> Self {
                Self(raw)
            }

            /// Returns the raw database identifier.
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(raw: i64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }
    };
}

record_id!(
    /// Identifier of a registered user (HR or job seeker).
    UserId
);

record_id!(
    /// Identifier of a job listing.
    JobId
);

record_id!(
    /// Identifier of an application record.
    ApplicationId
);

record_id!(
    /// Identifier of an uploaded resume.
    ResumeId
);

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn display_is_raw_number() {
        assert_eq!(JobId::new(42).to_string(), "42");
    }

    #[test]
    fn parses_from_token_subject() {
        let Ok(id) = "17".parse::<UserId>() else {
            panic!("valid id");
        };
        assert_eq!(id.get(), 17);
        assert!("abc".parse::<UserId>().is_err());
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&ApplicationId::new(5)).ok();
        assert_eq!(json.as_deref(), Some("5"));
    }
}
