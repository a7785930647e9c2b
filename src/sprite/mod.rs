//! Scan-compile-cache pipeline.
//!
//! [`scan`] turns a directory of SVG icons into one sprite document:
//!
//! 1. the [`IconSource`] enumerates icon files under the root
//! 2. each file whose cache entry is stale or missing gets an identifier
//!    ([`ident`]) and is compiled to a `<symbol>` fragment ([`icon`])
//! 3. fragments are concatenated in enumeration order ([`directory`])
//! 4. the concatenation is wrapped once in a hidden `<svg>` container
//!    ([`assemble`])
//!
//! The [`IconCache`] is owned by the caller and borrowed mutably for the
//! whole scan; passing the same cache to the next scan is what makes the
//! build incremental.
//!
//! # Example
//!
//! ```no_run
//! use iconsprite::cache::IconCache;
//! use iconsprite::sprite::{scan, ScanOptions};
//! use std::path::Path;
//!
//! let mut cache = IconCache::new();
//! let result = scan(Path::new("assets/icons"), &mut cache, &ScanOptions::default())?;
//! println!("{} symbols", result.symbol_ids.len());
//!
//! // Nothing changed, so this reuses every cached fragment.
//! let again = scan(Path::new("assets/icons"), &mut cache, &ScanOptions::default())?;
//! assert_eq!(again.summary.compiled, 0);
//! # Ok::<(), iconsprite::error::SpriteError>(())
//! ```

pub mod assemble;
pub mod directory;
pub mod icon;
pub mod ident;
pub mod markup;
pub mod optimize;
pub mod symbol;

use std::collections::BTreeSet;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::cache::IconCache;
use crate::error::SpriteError;
use crate::scanner::{DiskSource, IconSource, ScanError};

pub use assemble::{assemble, Sprite};
pub use directory::{DirectoryOutput, SymbolCollision};
pub use ident::{build_symbol_id, DEFAULT_TEMPLATE};
pub use optimize::{Minifier, Optimization, Optimizer, OptimizerConfig};
pub use symbol::{SymbolCompiler, SymbolRenderer};

/// Options for one scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanOptions {
    /// Identifier template with `[dir]` and/or `[name]` placeholders.
    pub symbol_id_template: String,
    /// Optimizer settings, or disabled.
    pub optimization: Optimization,
    /// Fail the scan when two files produce the same identifier.
    pub strict_ids: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            symbol_id_template: DEFAULT_TEMPLATE.to_string(),
            optimization: Optimization::default(),
            strict_ids: false,
        }
    }
}

impl ScanOptions {
    /// Set the identifier template.
    #[must_use]
    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.symbol_id_template = template.into();
        self
    }

    /// Set the optimizer settings.
    #[must_use]
    pub fn with_optimization(mut self, optimization: Optimization) -> Self {
        self.optimization = optimization;
        self
    }

    /// Enable or disable strict identifier checking.
    #[must_use]
    pub fn with_strict_ids(mut self, strict: bool) -> Self {
        self.strict_ids = strict;
        self
    }

    /// SHA-256 over everything that shapes a compiled fragment.
    ///
    /// Cached fragments are only reusable under the same fingerprint.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let optimization = serde_json::to_string(&self.optimization).unwrap_or_default();
        let mut hasher = Sha256::new();
        hasher.update(env!("CARGO_PKG_VERSION").as_bytes());
        hasher.update([0]);
        hasher.update(self.symbol_id_template.as_bytes());
        hasher.update([0]);
        hasher.update(optimization.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

/// Counters for one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanSummary {
    /// Icon files enumerated
    pub total_files: usize,
    /// Files whose cached fragment was reused
    pub cache_hits: usize,
    /// Files compiled in this scan
    pub compiled: usize,
    /// Files whose identifier was already taken by an earlier file
    pub collisions: usize,
}

/// Output of [`scan`]. Owned by the caller; the pipeline keeps nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanResult {
    /// Complete sprite document.
    #[serde(rename = "sprite")]
    pub sprite_document: String,
    /// Concatenated symbols without the container, namespaces stripped.
    pub fragments: String,
    /// Every identifier in this scan, including ones reused from cache.
    #[serde(rename = "ids")]
    pub symbol_ids: BTreeSet<String>,
    /// Hit/compile counters.
    pub summary: ScanSummary,
}

/// The pipeline, parameterised over its three collaborators.
#[derive(Debug, Clone, Default)]
pub struct SpriteCompiler<S = DiskSource, O = Minifier, R = SymbolRenderer> {
    source: S,
    optimizer: O,
    renderer: R,
}

impl SpriteCompiler {
    /// Compiler reading from disk with the built-in optimizer and renderer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S, O, R> SpriteCompiler<S, O, R> {
    /// Assemble a compiler from explicit collaborators.
    pub fn from_parts(source: S, optimizer: O, renderer: R) -> Self {
        Self {
            source,
            optimizer,
            renderer,
        }
    }

    /// Replace the icon source.
    pub fn with_source<S2>(self, source: S2) -> SpriteCompiler<S2, O, R> {
        SpriteCompiler {
            source,
            optimizer: self.optimizer,
            renderer: self.renderer,
        }
    }

    /// Replace the optimizer.
    pub fn with_optimizer<O2>(self, optimizer: O2) -> SpriteCompiler<S, O2, R> {
        SpriteCompiler {
            source: self.source,
            optimizer,
            renderer: self.renderer,
        }
    }

    /// Replace the symbol renderer.
    pub fn with_renderer<R2>(self, renderer: R2) -> SpriteCompiler<S, O, R2> {
        SpriteCompiler {
            source: self.source,
            optimizer: self.optimizer,
            renderer,
        }
    }

    /// The icon source in use.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S, O, R> SpriteCompiler<S, O, R>
where
    S: IconSource,
    O: Optimizer,
    R: SymbolCompiler,
{
    /// Scan `root` and build the sprite, reusing and updating `cache`.
    ///
    /// # Errors
    ///
    /// Fails if the root cannot be enumerated, an icon cannot be read or
    /// rendered, or (with `strict_ids`) two icons share an identifier.
    /// Cache entries written before the failure are kept.
    pub fn scan(
        &self,
        root: &Path,
        cache: &mut IconCache,
        options: &ScanOptions,
    ) -> Result<ScanResult, SpriteError> {
        let root = std::path::absolute(root).map_err(|e| ScanError::from_io(root, e))?;

        let output = self.compile_directory(
            cache,
            &root,
            &options.symbol_id_template,
            options.optimization.config(),
        )?;

        if options.strict_ids {
            if let Some(collision) = output.collisions.into_iter().next() {
                return Err(SpriteError::DuplicateSymbolId {
                    id: collision.id,
                    first: collision.first,
                    second: collision.second,
                });
            }
        }

        let sprite = assemble(&output.fragments);
        log::debug!(
            "Scanned {}: {} icon(s), {} from cache, {} compiled",
            root.display(),
            output.summary.total_files,
            output.summary.cache_hits,
            output.summary.compiled
        );

        Ok(ScanResult {
            sprite_document: sprite.document,
            fragments: sprite.fragments,
            symbol_ids: output.symbol_ids,
            summary: output.summary,
        })
    }
}

/// Scan `root` with the default collaborators.
///
/// See [`SpriteCompiler::scan`].
pub fn scan(
    root: &Path,
    cache: &mut IconCache,
    options: &ScanOptions,
) -> Result<ScanResult, SpriteError> {
    SpriteCompiler::new().scan(root, cache, options)
}
