//! Symbol identifier templating.
//!
//! An identifier is built from an icon's relative name and a template that
//! may contain the placeholders `[dir]` and `[name]`:
//!
//! | relative name    | template            | identifier        |
//! |------------------|---------------------|-------------------|
//! | `a/b/icon.svg`   | `icon-[dir]-[name]` | `icon-a-b-icon`   |
//! | `icon.svg`       | `icon-[dir]-[name]` | `icon-icon`       |
//! | `a/b/icon.svg`   | `icon-[name]`       | `icon-a/b/icon`   |
//!
//! No escaping is applied. Paths must only contain characters that are
//! valid inside an XML attribute value.

/// Placeholder replaced by the directory part, segments joined with `-`.
pub const DIR_PLACEHOLDER: &str = "[dir]";
/// Placeholder replaced by the file name (or the whole relative name).
pub const NAME_PLACEHOLDER: &str = "[name]";
/// Template used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "icon-[dir]-[name]";

/// Split a `/`-separated relative name into `(dir_name, file_name)`.
///
/// `dir_name` is every segment but the last joined with `-`, or empty for a
/// root-level file.
fn split_dir(relative_name: &str) -> (String, &str) {
    match relative_name.rsplit_once('/') {
        None => (String::new(), relative_name),
        Some((dir, file)) => (dir.split('/').collect::<Vec<_>>().join("-"), file),
    }
}

/// Extension of the last path segment including the dot, e.g. `.svg`.
fn extension_of(relative_name: &str) -> Option<&str> {
    let file = relative_name.rsplit('/').next().unwrap_or(relative_name);
    match file.rfind('.') {
        Some(0) | None => None,
        Some(idx) => Some(&file[idx..]),
    }
}

/// Build the symbol identifier for `relative_name` from `template`.
///
/// With `[dir]` in the template, `[dir]` becomes the joined directory
/// segments and `[name]` the bare file name; when the directory is empty
/// the first `--` left behind collapses to `-`. Without `[dir]`, `[name]`
/// becomes the whole relative name. The first occurrence of the file's
/// extension is then removed from the result.
#[must_use]
pub fn build_symbol_id(relative_name: &str, template: &str) -> String {
    let (dir_name, file_name) = split_dir(relative_name);

    let mut id = template.to_string();
    let mut name = relative_name;
    if template.contains(DIR_PLACEHOLDER) {
        id = id.replace(DIR_PLACEHOLDER, &dir_name);
        if dir_name.is_empty() {
            id = id.replacen("--", "-", 1);
        }
        name = file_name;
    }
    id = id.replace(NAME_PLACEHOLDER, name);

    match extension_of(relative_name) {
        Some(ext) => id.replacen(ext, "", 1),
        None => id,
    }
}
