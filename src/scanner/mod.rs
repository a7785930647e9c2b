//! Scanner module for icon discovery and source reads.
//!
//! This module provides functionality for:
//! - Sequential directory walking using walkdir, sorted by file name
//! - Glob matching of icon files (`**/*.svg` by default)
//! - Unicode path normalization of relative icon names
//!
//! # Architecture
//!
//! - [`walker`]: Directory traversal and icon discovery
//! - [`path_utils`]: Relative-name and NFC normalization helpers
//!
//! The sprite pipeline never touches the file system directly. It goes
//! through the [`IconSource`] trait so callers can substitute their own
//! enumeration (or count reads in tests).
//!
//! # Example
//!
//! ```no_run
//! use iconsprite::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("assets/icons"), WalkerConfig::default());
//! for entry in walker.walk() {
//!     match entry {
//!         Ok(icon) => println!("{}", icon.path.display()),
//!         Err(e) => eprintln!("Warning: {}", e),
//!     }
//! }
//! ```

pub mod path_utils;
pub mod walker;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub use path_utils::relative_name;
pub use walker::Walker;

/// Default glob for icon files, relative to the scan root.
pub const DEFAULT_PATTERN: &str = "**/*.svg";

/// An icon file discovered under the scan root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconEntry {
    /// Absolute path to the icon file
    pub path: PathBuf,
    /// Last modification time reported by the file system
    pub modified: SystemTime,
}

impl IconEntry {
    /// Create a new IconEntry.
    #[must_use]
    pub fn new(path: PathBuf, modified: SystemTime) -> Self {
        Self { path, modified }
    }
}

/// Configuration for directory walking.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Glob selecting icon files (gitignore syntax, relative to the root).
    pub pattern: String,

    /// Follow symbolic links during traversal. Loops are reported as errors.
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (names starting with `.`).
    pub skip_hidden: bool,

    /// Glob patterns to exclude (gitignore-style).
    pub ignore_patterns: Vec<String>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.to_string(),
            follow_symlinks: true,
            skip_hidden: true,
            ignore_patterns: Vec::new(),
        }
    }
}

impl WalkerConfig {
    /// Set the glob selecting icon files.
    #[must_use]
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = pattern.into();
        self
    }

    /// Add exclusion patterns.
    #[must_use]
    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }
}

/// Errors that can occur while enumerating or reading icon files.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// Permission was denied when accessing a file or directory.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// The specified path was not found.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// The specified path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An invalid include or exclude glob.
    #[error("Invalid glob '{pattern}': {message}")]
    InvalidPattern {
        /// The offending pattern
        pattern: String,
        /// Message from the glob compiler
        message: String,
    },

    /// An I/O error occurred while accessing a file.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ScanError {
    /// Classify an I/O error for `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// Where icon files come from.
///
/// `list` yields the icons under `root` in a stable order; the order is
/// the order fragments appear in the sprite. `read_to_string` returns the
/// full UTF-8 text of one icon.
pub trait IconSource {
    /// Enumerate icon files under `root`.
    fn list(&self, root: &Path) -> Result<Vec<IconEntry>, ScanError>;

    /// Read one icon file as UTF-8 text.
    fn read_to_string(&self, path: &Path) -> Result<String, ScanError>;
}

/// [`IconSource`] backed by the local file system.
#[derive(Debug, Clone, Default)]
pub struct DiskSource {
    config: WalkerConfig,
}

impl DiskSource {
    /// Create a disk source with the given walker configuration.
    #[must_use]
    pub fn new(config: WalkerConfig) -> Self {
        Self { config }
    }

    /// The walker configuration in use.
    #[must_use]
    pub fn config(&self) -> &WalkerConfig {
        &self.config
    }
}

impl IconSource for DiskSource {
    fn list(&self, root: &Path) -> Result<Vec<IconEntry>, ScanError> {
        let metadata = std::fs::metadata(root).map_err(|e| ScanError::from_io(root, e))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(root.to_path_buf()));
        }

        let walker = Walker::new(root, self.config.clone());
        let matcher = walker.build_matcher()?;
        let mut icons = Vec::new();
        for entry in walker.walk_with(matcher) {
            match entry {
                // Removed between listing and stat.
                Err(ScanError::NotFound(path)) => {
                    log::debug!("Icon vanished during scan: {}", path.display());
                }
                entry => icons.push(entry?),
            }
        }
        log::debug!("Found {} icon(s) under {}", icons.len(), root.display());
        Ok(icons)
    }

    fn read_to_string(&self, path: &Path) -> Result<String, ScanError> {
        std::fs::read_to_string(path).map_err(|e| ScanError::from_io(path, e))
    }
}
