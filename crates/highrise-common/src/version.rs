//! Version types for schema compatibility.

use serde::{Deserialize, Serialize};

use crate::error::{HighriseError, HighriseResult};

/// Schema version using semantic versioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SchemaVersion {
    /// Major version (breaking changes)
    pub major: u16,
    /// Minor version (backwards-compatible additions)
    pub minor: u16,
    /// Patch version (bug fixes)
    pub patch: u16,
}

impl SchemaVersion {
    /// Creates a new schema version.
    #[must_use]
    pub const fn new(major: u16, minor: u16, patch: u16) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Current level data version.
    pub const LEVEL_DATA: Self = Self::new(1, 0, 0);

    /// Current player carry-over snapshot version.
    pub const PLAYER_SNAPSHOT: Self = Self::new(1, 0, 0);

    /// Checks if this version can read data from another version.
    #[must_use]
    pub const fn can_read(&self, data_version: &Self) -> bool {
        self.major == data_version.major
    }

    /// Fails with [`HighriseError::VersionMismatch`] unless `data_version` is readable.
    pub fn ensure_readable(&self, data_version: &Self) -> HighriseResult<()> {
        if self.can_read(data_version) {
            Ok(())
        } else {
            Err(HighriseError::VersionMismatch {
                expected: self.to_string(),
                actual: data_version.to_string(),
            })
        }
    }
}

impl Default for SchemaVersion {
    fn default() -> Self {
        Self::LEVEL_DATA
    }
}

impl std::fmt::Display for SchemaVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}
