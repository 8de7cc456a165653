//! Token and container ID generation

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a token placed on the workspace.
/// Every placement gets a fresh UUID v4, so two placements of the same
/// symbol never share an ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TokenId(Uuid);

impl TokenId {
    /// Create a new random TokenId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a TokenId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for TokenId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContainerId(Uuid);

impl ContainerId {
    /// Create a new random ContainerId
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a ContainerId from an existing UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Parse a ContainerId from its string form
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for ContainerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_ids_are_unique() {
        assert_ne!(TokenId::new(), TokenId::new());
    }

    #[test]
    fn test_container_id_string_roundtrip() {
        let id = ContainerId::new();
        assert_eq!(ContainerId::from_string(&id.to_string()), Some(id));
        assert_eq!(ContainerId::from_string("container_1"), None);
    }
}
