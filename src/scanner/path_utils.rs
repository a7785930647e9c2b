//! Relative icon names.
//!
//! Symbol identifiers are derived from the path of an icon relative to the
//! scan root, so the same tree must yield the same relative names on every
//! platform:
//!
//! - separators are always `/`, even on Windows
//! - names are NFC-normalized, because macOS reports NFD file names
//!   (`cafe\u{0301}.svg`) where Linux and Windows report NFC (`café.svg`)
//!
//! # Example
//!
//! ```
//! use iconsprite::scanner::path_utils::relative_name;
//! use std::path::Path;
//!
//! let name = relative_name(Path::new("/icons/inner/talk.svg"), Path::new("/icons"));
//! assert_eq!(name, "inner/talk.svg");
//! ```

use std::path::{Component, Path};
use unicode_normalization::UnicodeNormalization;

/// Normalize a path string to NFC (Composed) form.
#[must_use]
pub fn normalize_path_str(s: &str) -> String {
    s.nfc().collect()
}

/// Render a path with `/` separators.
///
/// Root and prefix components are kept as-is so absolute paths that fall
/// outside the scan root remain recognisable.
#[must_use]
pub fn to_forward_slashes(path: &Path) -> String {
    let mut out = String::new();
    for component in path.components() {
        match component {
            Component::Prefix(prefix) => out.push_str(&prefix.as_os_str().to_string_lossy()),
            Component::RootDir => out.push('/'),
            Component::CurDir => {}
            Component::ParentDir => push_segment(&mut out, ".."),
            Component::Normal(segment) => push_segment(&mut out, &segment.to_string_lossy()),
        }
    }
    out
}

fn push_segment(out: &mut String, segment: &str) {
    if !out.is_empty() && !out.ends_with('/') {
        out.push('/');
    }
    out.push_str(segment);
}

/// Name of `path` relative to `root`, `/`-separated and NFC-normalized.
///
/// A path that does not live under `root` is returned whole (still
/// normalized), so it still yields a deterministic identifier.
#[must_use]
pub fn relative_name(path: &Path, root: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    normalize_path_str(&to_forward_slashes(relative))
}
