//! Collision-resistant room identifier.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier for a two-party signaling room.
///
/// Combines the epoch-millisecond creation time with a random UUID v4
/// suffix, so identifiers sort roughly by creation time and cannot
/// collide in practice. Generated once by the matching transaction and
/// immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Generates a new room identifier.
    #[must_use]
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        Self(format!("{millis}-{}", uuid::Uuid::new_v4().simple()))
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for RoomId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RoomId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
