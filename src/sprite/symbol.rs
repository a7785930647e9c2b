//! Conversion of one SVG document into an embeddable `<symbol>`.
//!
//! [`SymbolCompiler`] is the seam. The pipeline only relies on the rendered
//! fragment being one self-contained block that carries the requested id.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use super::markup::{XMLNS_DECL, XMLNS_XLINK_DECL};

/// Errors raised while turning a document into a symbol.
#[derive(thiserror::Error, Debug)]
pub enum SymbolError {
    /// No `<svg>` root element was found.
    #[error("No <svg> root element in {0}")]
    MissingRoot(PathBuf),

    /// The `<svg>` root element is never closed.
    #[error("Unclosed <svg> root element in {0}")]
    Unclosed(PathBuf),
}

/// Renders an SVG document as a reusable symbol fragment.
pub trait SymbolCompiler {
    /// Wrap `markup` as a symbol with identifier `id`.
    ///
    /// `source` is the file the markup came from, for diagnostics.
    fn render(&self, id: &str, markup: &str, source: &Path) -> Result<String, SymbolError>;
}

/// Root attributes that do not carry over to the symbol.
const DROPPED_ATTRIBUTES: &[&str] = &["width", "height", "id", "x", "y", "version"];

static SVG_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<svg\b([^>]*?)(/?)>").expect("svg pattern is valid"));

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("attribute pattern is valid")
});

/// Default [`SymbolCompiler`] working on markup text.
///
/// Output shape:
///
/// ```text
/// <symbol xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="0 0 24 24" id="icon-add">…</symbol>
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SymbolRenderer;

impl SymbolRenderer {
    /// Create a renderer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl SymbolCompiler for SymbolRenderer {
    fn render(&self, id: &str, markup: &str, source: &Path) -> Result<String, SymbolError> {
        let open = SVG_OPEN
            .captures(markup)
            .ok_or_else(|| SymbolError::MissingRoot(source.to_path_buf()))?;
        let whole = open.get(0).map_or(0..0, |m| m.range());
        let raw_attributes = open.get(1).map_or("", |m| m.as_str());
        let self_closing = open.get(2).is_some_and(|m| !m.as_str().is_empty());

        let inner = if self_closing {
            ""
        } else {
            let close = markup[whole.end..]
                .rfind("</svg>")
                .ok_or_else(|| SymbolError::Unclosed(source.to_path_buf()))?;
            &markup[whole.end..whole.end + close]
        };

        let attributes = symbol_attributes(raw_attributes);
        log::trace!("Rendering symbol {} from {}", id, source.display());

        let mut out = String::with_capacity(inner.len() + 160);
        out.push_str("<symbol ");
        out.push_str(XMLNS_DECL);
        out.push(' ');
        out.push_str(XMLNS_XLINK_DECL);
        for (name, value) in &attributes {
            out.push_str(&format!(" {name}=\"{value}\""));
        }
        out.push_str(&format!(" id=\"{id}\">"));
        out.push_str(inner);
        out.push_str("</symbol>");
        Ok(out)
    }
}

/// Attributes of the root `<svg>` that the symbol keeps, in source order.
///
/// A missing `viewBox` is derived from numeric `width`/`height`.
fn symbol_attributes(raw: &str) -> Vec<(String, String)> {
    let mut kept = Vec::new();
    let mut width = None;
    let mut height = None;
    let mut has_view_box = false;

    for caps in ATTRIBUTE.captures_iter(raw) {
        let name = &caps[1];
        let value = caps
            .get(2)
            .or_else(|| caps.get(3))
            .map_or("", |m| m.as_str())
            .replace('"', "&quot;");

        match name {
            "width" => width = parse_length(&value),
            "height" => height = parse_length(&value),
            "viewBox" => has_view_box = true,
            _ => {}
        }
        if name == "xmlns" || name.starts_with("xmlns:") || DROPPED_ATTRIBUTES.contains(&name) {
            continue;
        }
        kept.push((name.to_string(), value));
    }

    if !has_view_box {
        if let (Some(w), Some(h)) = (width, height) {
            kept.insert(0, ("viewBox".to_string(), format!("0 0 {w} {h}")));
        }
    }
    kept
}

/// Parse a plain or `px` length, keeping its textual form.
fn parse_length(value: &str) -> Option<String> {
    let number = value.trim().trim_end_matches("px");
    number.parse::<f64>().ok().map(|_| number.to_string())
}
