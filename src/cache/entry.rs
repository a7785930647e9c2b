//! Cache entry definitions.

use serde::{Deserialize, Serialize};
use std::time::SystemTime;

/// Compiled state of one icon file, keyed by its absolute path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Path relative to the scan root, `/`-separated.
    pub relative_name: String,
    /// Modification time the fragment was compiled from. `None` means the
    /// entry was never compiled and can never be fresh.
    pub modified: Option<SystemTime>,
    /// Rendered `<symbol>` fragment.
    pub fragment: String,
    /// Identifier assigned at compilation.
    pub symbol_id: String,
}

impl CacheEntry {
    /// Create an entry for a freshly compiled icon.
    #[must_use]
    pub fn new(
        relative_name: impl Into<String>,
        modified: SystemTime,
        fragment: impl Into<String>,
        symbol_id: impl Into<String>,
    ) -> Self {
        Self {
            relative_name: relative_name.into(),
            modified: Some(modified),
            fragment: fragment.into(),
            symbol_id: symbol_id.into(),
        }
    }

    /// Whether this entry still describes a file last modified at `modified`.
    #[must_use]
    pub fn is_fresh(&self, modified: SystemTime) -> bool {
        self.modified == Some(modified)
    }
}
