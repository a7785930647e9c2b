//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing an icon tree
//! and collecting the path and modification time of every icon file.
//! Traversal is sequential and children are visited in file-name order,
//! so two walks of an unchanged tree yield identical sequences.
//!
//! # Features
//!
//! - Include glob (default `**/*.svg`) via `ignore` overrides
//! - Gitignore-style exclusion patterns
//! - Hidden file filtering
//! - Optional symlink following
//!
//! # Example
//!
//! ```no_run
//! use iconsprite::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("assets/icons"), WalkerConfig::default());
//! let icons: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} icons", icons.len());
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use ignore::overrides::{Override, OverrideBuilder};
use walkdir::{DirEntry, WalkDir};

use super::{IconEntry, ScanError, WalkerConfig};

/// Compiled include/exclude globs for one walk.
#[derive(Debug)]
pub struct IconMatcher {
    include: Override,
    exclude: Option<Gitignore>,
}

impl IconMatcher {
    /// Whether `relative` (a path under the root) is an icon file.
    fn is_icon(&self, relative: &Path) -> bool {
        self.include.matched(relative, false).is_whitelist()
    }

    /// Whether `relative` is excluded by the ignore patterns.
    fn is_excluded(&self, relative: &Path, is_dir: bool) -> bool {
        self.exclude
            .as_ref()
            .is_some_and(|gi| gi.matched(relative, is_dir).is_ignore())
    }
}

/// Directory walker for icon discovery.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
        }
    }

    /// Compile the include glob and exclusion patterns.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidPattern`] if the include glob does not
    /// compile. Bad exclusion patterns are logged and skipped.
    pub fn build_matcher(&self) -> Result<IconMatcher, ScanError> {
        let mut include = OverrideBuilder::new(&self.root);
        include
            .add(&self.config.pattern)
            .map_err(|e| ScanError::InvalidPattern {
                pattern: self.config.pattern.clone(),
                message: e.to_string(),
            })?;
        let include = include.build().map_err(|e| ScanError::InvalidPattern {
            pattern: self.config.pattern.clone(),
            message: e.to_string(),
        })?;

        Ok(IconMatcher {
            include,
            exclude: self.build_exclude(),
        })
    }

    fn build_exclude(&self) -> Option<Gitignore> {
        if self.config.ignore_patterns.is_empty() {
            return None;
        }

        let mut builder = GitignoreBuilder::new(&self.root);
        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if !gitignore.is_empty() => Some(gitignore),
            Ok(_) => None,
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Walk the directory tree, yielding icon entries.
    ///
    /// Errors are yielded as [`ScanError`] values rather than stopping
    /// iteration. An invalid include glob yields a single error.
    pub fn walk(&self) -> Box<dyn Iterator<Item = Result<IconEntry, ScanError>> + '_> {
        match self.build_matcher() {
            Ok(matcher) => Box::new(self.walk_with(matcher)),
            Err(e) => Box::new(std::iter::once(Err(e))),
        }
    }

    /// Walk using an already compiled matcher.
    pub fn walk_with(
        &self,
        matcher: IconMatcher,
    ) -> impl Iterator<Item = Result<IconEntry, ScanError>> + '_ {
        let skip_hidden = self.config.skip_hidden;

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name();

        let matcher = Arc::new(matcher);
        let filter_matcher = Arc::clone(&matcher);

        walk_dir
            .into_iter()
            .filter_entry(move |entry| {
                if entry.depth() == 0 {
                    return true;
                }
                if skip_hidden && is_hidden(entry) {
                    log::trace!("Skipping hidden: {}", entry.path().display());
                    return false;
                }
                match entry.path().strip_prefix(&self.root) {
                    Ok(relative) => {
                        !filter_matcher.is_excluded(relative, entry.file_type().is_dir())
                    }
                    Err(_) => true,
                }
            })
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => self.process_entry(&entry, &matcher),
                Err(e) => Some(Err(self.handle_walk_error(e))),
            })
    }

    /// Turn a walk entry into an [`IconEntry`] if it is an icon file.
    fn process_entry(
        &self,
        entry: &DirEntry,
        matcher: &IconMatcher,
    ) -> Option<Result<IconEntry, ScanError>> {
        let path = entry.path();
        let file_type = entry.file_type();

        if file_type.is_dir() {
            return None;
        }
        if file_type.is_symlink() && !self.config.follow_symlinks {
            log::trace!("Skipping symlink: {}", path.display());
            return None;
        }

        let relative = path.strip_prefix(&self.root).unwrap_or(path);
        if !matcher.is_icon(relative) {
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => return Some(Err(self.handle_walk_error(e))),
        };
        if !metadata.is_file() {
            return None;
        }

        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        Some(Ok(IconEntry::new(path.to_path_buf(), modified)))
    }

    fn handle_walk_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);
        log::debug!("Walker error for {}: {}", path.display(), error);
        match error.into_io_error() {
            Some(io) => ScanError::from_io(&path, io),
            None => ScanError::Io {
                path,
                source: std::io::Error::other("filesystem loop detected"),
            },
        }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}
