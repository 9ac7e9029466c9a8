//! Type-safe wrapper for user identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Type-safe wrapper for user identifiers.
///
/// Users are keyed by uuid everywhere: the user directory, the JWT `uid`
/// claim and the loyalty account table all share this identifier. The
/// newtype ensures a user id cannot be accidentally swapped with any other
/// string-shaped value crossing the service boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

/// Error type for `UserId` parse failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid user id '{0}': not a uuid")]
pub struct UserIdParseError(pub String);

impl UserId {
    /// Generates a new random (v4) user id.
    #[inline]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses a user id from its canonical uuid string form.
    pub fn parse(id: &str) -> Result<Self, UserIdParseError> {
        Uuid::parse_str(id)
            .map(Self)
            .map_err(|_| UserIdParseError(id.to_string()))
    }

    /// Returns the underlying uuid.
    #[inline]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl From<Uuid> for UserId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl FromStr for UserId {
    type Err = UserIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
