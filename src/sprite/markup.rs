//! Text-level markup transforms.
//!
//! The rest of the pipeline only calls the two functions below and never
//! inspects markup itself, so they can be replaced by a structured XML
//! rewrite without touching callers.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// SVG namespace URI.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
/// XLink namespace URI.
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
/// Default namespace declaration as emitted on rendered symbols.
pub const XMLNS_DECL: &str = r#"xmlns="http://www.w3.org/2000/svg""#;
/// XLink namespace declaration as emitted on rendered symbols.
pub const XMLNS_XLINK_DECL: &str = r#"xmlns:xlink="http://www.w3.org/1999/xlink""#;

static STROKE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"stroke="[a-zA-Z#0-9]*""#).expect("stroke pattern is valid")
});

/// Remove every literal SVG and XLink namespace declaration.
///
/// Nested symbols inherit both namespaces from the sprite container, so
/// repeating them on every fragment is redundant.
#[must_use]
pub fn strip_namespace_declarations(markup: &str) -> String {
    markup.replace(XMLNS_DECL, "").replace(XMLNS_XLINK_DECL, "")
}

/// Rewrite the first `stroke="…"` attribute to `stroke="currentColor"`.
///
/// This lets a single-colour icon inherit its stroke from CSS. Only the
/// first match is rewritten; icons with several differently stroked paths
/// keep the rest of their colours.
#[must_use]
pub fn rewrite_first_stroke_attribute(markup: &str) -> Cow<'_, str> {
    STROKE_ATTR.replace(markup, r#"stroke="currentColor""#)
}
