//! Wrapping of the fragment stream into one sprite document.

use super::markup::{strip_namespace_declarations, XMLNS_DECL, XMLNS_XLINK_DECL};

/// Inline style that takes the sprite out of layout without hiding its
/// symbols from `<use>` references.
const CONTAINER_STYLE: &str = "position:absolute;width:0;height:0";

/// An assembled sprite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    /// The whole `<svg>` document.
    pub document: String,
    /// The symbols alone, for callers injecting them into their own container.
    pub fragments: String,
}

/// Strip per-fragment namespace declarations and wrap the result in the
/// sprite container, which declares both namespaces once.
#[must_use]
pub fn assemble(fragments: &str) -> Sprite {
    let fragments = strip_namespace_declarations(fragments);
    let document = format!(
        r#"<svg {XMLNS_DECL} {XMLNS_XLINK_DECL} style="{CONTAINER_STYLE}">{fragments}</svg>"#
    );
    Sprite {
        document,
        fragments,
    }
}
