//! ULID-based identifier generation with prefixes.
//!
//! Identifiers in atelier follow the pattern: `prefix_ulid`
//! For example: `ver_01hqxyz...` for persisted versions.

use ulid::Ulid;

/// Known identifier prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPrefix {
    Version,
}

impl IdPrefix {
    /// Get the string prefix for this identifier type.
    pub fn as_str(&self) -> &'static str {
        match self {
            IdPrefix::Version => "ver",
        }
    }
}

/// Identifier generation.
pub struct Identifier;

impl Identifier {
    /// Generate a new ascending identifier (newer = larger).
    pub fn ascending(prefix: IdPrefix) -> String {
        let ulid = Ulid::new();
        format!("{}_{}", prefix.as_str(), ulid.to_string().to_lowercase())
    }

    /// Generate a version ID.
    ///
    /// Version IDs ascend so two versions created within the same
    /// millisecond still order by creation.
    pub fn version() -> String {
        Self::ascending(IdPrefix::Version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascending_id() {
        let id = Identifier::ascending(IdPrefix::Version);
        assert!(id.starts_with("ver_"));
        assert_eq!(id.len(), 30); // "ver_" (4) + ULID (26)
    }

    #[test]
    fn test_ascending_order() {
        let id1 = Identifier::version();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = Identifier::version();
        assert!(id1 < id2, "Ascending IDs should increase over time");
    }
}
