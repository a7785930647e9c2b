//! Compilation of a single icon file into a symbol fragment.

use std::path::Path;

use super::markup::rewrite_first_stroke_attribute;
use super::optimize::{Optimizer, OptimizerConfig};
use super::symbol::SymbolCompiler;
use super::SpriteCompiler;
use crate::error::SpriteError;
use crate::scanner::IconSource;

impl<S, O, R> SpriteCompiler<S, O, R>
where
    S: IconSource,
    O: Optimizer,
    R: SymbolCompiler,
{
    /// Compile the icon at `path` into a `<symbol>` fragment with `symbol_id`.
    ///
    /// Returns `Ok(None)` for an empty path. With `optimizer` set, the
    /// markup is optimized first; when optimization fails or yields
    /// nothing, the raw markup is used instead. The first `stroke`
    /// attribute is then rewritten to `currentColor`.
    ///
    /// # Errors
    ///
    /// Read failures and render failures are returned.
    pub fn compile_icon(
        &self,
        path: &Path,
        symbol_id: &str,
        optimizer: Option<&OptimizerConfig>,
    ) -> Result<Option<String>, SpriteError> {
        if path.as_os_str().is_empty() {
            return Ok(None);
        }

        let raw = self.source.read_to_string(path)?;
        let markup = match optimizer {
            Some(config) => self.optimize_or_raw(raw, config, path),
            None => raw,
        };
        let markup = rewrite_first_stroke_attribute(&markup);

        let fragment = self.renderer.render(symbol_id, &markup, path)?;
        Ok(Some(fragment))
    }

    fn optimize_or_raw(&self, raw: String, config: &OptimizerConfig, path: &Path) -> String {
        match self.optimizer.optimize(&raw, config) {
            Ok(optimized) if !optimized.trim().is_empty() => optimized,
            Ok(_) => {
                log::debug!("Optimizer returned nothing for {}, using raw markup", path.display());
                raw
            }
            Err(e) => {
                log::debug!("Optimizer failed for {} ({}), using raw markup", path.display(), e);
                raw
            }
        }
    }
}
