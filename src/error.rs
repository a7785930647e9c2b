//! Error types and exit codes.

use std::path::PathBuf;

use serde::Serialize;

use crate::scanner::ScanError;
use crate::sprite::symbol::SymbolError;

/// Errors that abort a sprite scan.
///
/// Optimizer failures never appear here: an icon that cannot be optimized
/// is used as read.
#[derive(thiserror::Error, Debug)]
pub enum SpriteError {
    /// Enumerating or reading icon files failed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// An icon could not be rendered as a symbol.
    #[error(transparent)]
    Symbol(#[from] SymbolError),

    /// Two files produced the same identifier while strict ids were on.
    #[error("Duplicate symbol id '{id}': {} and {}", .first.display(), .second.display())]
    DuplicateSymbolId {
        /// The colliding identifier
        id: String,
        /// File that produced the identifier first
        first: PathBuf,
        /// File that produced it again
        second: PathBuf,
    },
}

/// Exit codes for the iconsprite binary.
///
/// - 0: Success (sprite written)
/// - 1: General error
/// - 2: No icons found under the root
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Success: the command completed.
    Success = 0,
    /// General error: an unexpected failure.
    GeneralError = 1,
    /// The scan completed but found no icons.
    NoIcons = 2,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "IS000",
            Self::GeneralError => "IS001",
            Self::NoIcons => "IS002",
        }
    }
}

/// Structured error information for `--json-errors` output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "IS001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message, including its causes
    pub message: String,
}

impl StructuredError {
    /// Create a structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: format!("{err:#}"),
        }
    }
}
