//! Directory compilation with per-file cache reuse.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use super::ident::build_symbol_id;
use super::optimize::{Optimizer, OptimizerConfig};
use super::symbol::SymbolCompiler;
use super::{ScanSummary, SpriteCompiler};
use crate::cache::{CacheEntry, IconCache};
use crate::error::SpriteError;
use crate::scanner::{relative_name, IconSource};

/// Two files that produced the same symbol identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolCollision {
    /// The shared identifier
    pub id: String,
    /// File that produced it first
    pub first: PathBuf,
    /// File that produced it again
    pub second: PathBuf,
}

/// Result of compiling every icon under a root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryOutput {
    /// Fragments concatenated in enumeration order.
    pub fragments: String,
    /// Identifiers produced, including reused ones.
    pub symbol_ids: BTreeSet<String>,
    /// Identifier collisions, in the order they were found.
    pub collisions: Vec<SymbolCollision>,
    /// Hit/compile counters.
    pub summary: ScanSummary,
}

impl DirectoryOutput {
    fn register(&mut self, owners: &mut HashMap<String, PathBuf>, id: &str, path: &Path) {
        if self.symbol_ids.insert(id.to_string()) {
            owners.insert(id.to_string(), path.to_path_buf());
            return;
        }

        let first = owners.get(id).cloned().unwrap_or_default();
        log::warn!(
            "Symbol id '{}' from {} is already used by {}",
            id,
            path.display(),
            first.display()
        );
        self.summary.collisions += 1;
        self.collisions.push(SymbolCollision {
            id: id.to_string(),
            first,
            second: path.to_path_buf(),
        });
    }
}

impl<S, O, R> SpriteCompiler<S, O, R>
where
    S: IconSource,
    O: Optimizer,
    R: SymbolCompiler,
{
    /// Compile every icon under `root`, reusing fresh entries from `cache`.
    ///
    /// Files are processed one at a time in the order the source lists
    /// them. A file whose cache entry has the same modification time is
    /// not read again. Every other file gets a new identifier from
    /// `template` and is compiled, and its entry is overwritten. Entries
    /// for files that no longer exist are left alone.
    ///
    /// # Errors
    ///
    /// The first enumeration, read or render failure is returned. Entries
    /// already written to `cache` stay there.
    pub fn compile_directory(
        &self,
        cache: &mut IconCache,
        root: &Path,
        template: &str,
        optimizer: Option<&OptimizerConfig>,
    ) -> Result<DirectoryOutput, SpriteError> {
        let icons = self.source.list(root)?;
        let mut output = DirectoryOutput::default();
        let mut owners = HashMap::new();

        for icon in icons {
            output.summary.total_files += 1;

            let fresh = cache
                .get(&icon.path)
                .filter(|cached| cached.is_fresh(icon.modified))
                .map(|cached| (cached.fragment.clone(), cached.symbol_id.clone()));

            let (fragment, symbol_id) = match fresh {
                Some((fragment, symbol_id)) => {
                    log::trace!("Cache hit: {}", icon.path.display());
                    output.summary.cache_hits += 1;
                    if !symbol_id.is_empty() {
                        output.register(&mut owners, &symbol_id, &icon.path);
                    }
                    (Some(fragment), symbol_id)
                }
                None => {
                    log::trace!("Cache miss: {}", icon.path.display());
                    let relative = relative_name(&icon.path, root);
                    let symbol_id = build_symbol_id(&relative, template);
                    let fragment = self.compile_icon(&icon.path, &symbol_id, optimizer)?;
                    output.summary.compiled += 1;
                    output.register(&mut owners, &symbol_id, &icon.path);

                    if let Some(fragment) = &fragment {
                        cache.insert(
                            icon.path.clone(),
                            CacheEntry::new(relative, icon.modified, fragment.clone(), &symbol_id),
                        );
                    }
                    (fragment, symbol_id)
                }
            };

            log::trace!("Emitting {} for {}", symbol_id, icon.path.display());
            output.fragments.push_str(fragment.as_deref().unwrap_or(""));
        }

        Ok(output)
    }
}
