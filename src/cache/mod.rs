//! Icon cache for incremental sprite builds.
//!
//! Compiling an icon (optimize, rewrite, render) is the expensive part of a
//! scan. This module keeps the rendered fragment of every icon so that the
//! next scan can skip files that have not changed.
//!
//! # Architecture
//!
//! * [`entry`]: The per-file record and its freshness rule.
//! * [`IconCache`]: The in-memory map the pipeline reads and writes. It is
//!   owned by the caller and passed by `&mut` into every scan, so only one
//!   scan can use a given cache at a time.
//! * [`database`]: SQLite persistence of an [`IconCache`] between runs.
//!
//! # Cache Invalidation
//!
//! An entry is valid exactly while its recorded modification time equals
//! the one the file system reports now. Any difference forces
//! recompilation. The pipeline never evicts entries for deleted files;
//! callers can do so with [`IconCache::prune_missing`].

pub mod database;
pub mod entry;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

pub use database::{CacheDatabase, CacheError, CacheResult};
pub use entry::CacheEntry;

/// Caller-owned mapping from absolute icon path to [`CacheEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IconCache {
    entries: HashMap<PathBuf, CacheEntry>,
}

impl IconCache {
    /// Create an empty cache. Scanning with it compiles every icon.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the entry for `path`.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&CacheEntry> {
        self.entries.get(path)
    }

    /// Insert or overwrite the entry for `path`.
    pub fn insert(&mut self, path: PathBuf, entry: CacheEntry) -> Option<CacheEntry> {
        self.entries.insert(path, entry)
    }

    /// Remove the entry for `path`.
    pub fn remove(&mut self, path: &Path) -> Option<CacheEntry> {
        self.entries.remove(path)
    }

    /// Number of cached icons.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries.
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &CacheEntry)> {
        self.entries.iter()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Keep only entries whose path is in `live`. Returns how many were dropped.
    pub fn retain_paths(&mut self, live: &HashSet<PathBuf>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|path, _| live.contains(path));
        before - self.entries.len()
    }

    /// Drop entries whose source file no longer exists. Returns how many
    /// were dropped.
    pub fn prune_missing(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|path, _| {
            let exists = path.is_file();
            if !exists {
                log::debug!("Evicting cache entry for missing file: {}", path.display());
            }
            exists
        });
        before - self.entries.len()
    }
}

impl FromIterator<(PathBuf, CacheEntry)> for IconCache {
    fn from_iter<I: IntoIterator<Item = (PathBuf, CacheEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
