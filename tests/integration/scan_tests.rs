use filetime::FileTime;
use iconsprite::cache::IconCache;
use iconsprite::error::SpriteError;
use iconsprite::scanner::{DiskSource, ScanError, WalkerConfig};
use iconsprite::sprite::{scan, Optimization, ScanOptions, SpriteCompiler};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

const XMLNS: &str = r#"xmlns="http://www.w3.org/2000/svg""#;
const XMLNS_XLINK: &str = r#"xmlns:xlink="http://www.w3.org/1999/xlink""#;

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/icons")
}

/// Copy the fixture icons into a scratch directory.
fn fixture_tree() -> TempDir {
    let dir = tempdir().unwrap();
    for relative in ["add.svg", "inner/talk.svg", "qrcode.svg"] {
        let target = dir.path().join(relative);
        fs::create_dir_all(target.parent().unwrap()).unwrap();
        fs::copy(fixtures().join(relative), target).unwrap();
    }
    dir
}

/// Move a file's modification time forward so it reads as changed.
fn bump_mtime(path: &Path) {
    let modified = fs::metadata(path).unwrap().modified().unwrap();
    let later = FileTime::from_system_time(modified + std::time::Duration::from_secs(10));
    filetime::set_file_mtime(path, later).unwrap();
}

fn symbol_for<'a>(fragments: &'a str, id: &str) -> &'a str {
    let marker = format!("id=\"{id}\"");
    fragments
        .split_inclusive("</symbol>")
        .find(|symbol| symbol.contains(&marker))
        .unwrap()
}

#[test]
fn test_scan_fixture_directory() {
    let result = scan(&fixtures(), &mut IconCache::new(), &ScanOptions::default()).unwrap();

    let ids: Vec<_> = result.symbol_ids.iter().map(String::as_str).collect();
    assert_eq!(ids, vec!["icon-add", "icon-inner-talk", "icon-qrcode"]);
    assert_eq!(result.summary.total_files, 3);
    assert_eq!(result.summary.compiled, 3);

    for id in ids {
        let attribute = format!("id=\"{id}\"");
        assert_eq!(result.sprite_document.matches(&attribute).count(), 1);
    }
}

#[test]
fn test_sprite_declares_namespaces_once() {
    let result = scan(&fixtures(), &mut IconCache::new(), &ScanOptions::default()).unwrap();

    assert!(result.sprite_document.starts_with("<svg "));
    assert!(result.sprite_document.ends_with("</svg>"));
    assert!(result
        .sprite_document
        .contains(r#"style="position:absolute;width:0;height:0""#));
    assert_eq!(result.sprite_document.matches(XMLNS).count(), 1);
    assert_eq!(result.sprite_document.matches(XMLNS_XLINK).count(), 1);
    assert_eq!(result.fragments.matches(XMLNS).count(), 0);
    assert_eq!(result.fragments.matches(XMLNS_XLINK).count(), 0);
}

#[test]
fn test_fragments_follow_enumeration_order() {
    let result = scan(&fixtures(), &mut IconCache::new(), &ScanOptions::default()).unwrap();

    let position = |id: &str| result.fragments.find(&format!("id=\"{id}\"")).unwrap();
    assert!(position("icon-add") < position("icon-inner-talk"));
    assert!(position("icon-inner-talk") < position("icon-qrcode"));
    assert_eq!(result.fragments.matches("<symbol").count(), 3);
}

#[test]
fn test_first_stroke_becomes_current_color() {
    let result = scan(&fixtures(), &mut IconCache::new(), &ScanOptions::default()).unwrap();

    let add = symbol_for(&result.fragments, "icon-add");
    assert!(add.contains(r#"stroke="currentColor""#));
    assert!(!add.contains("#333333"));
    assert!(add.contains(r#"stroke-width="2""#));

    let talk = symbol_for(&result.fragments, "icon-inner-talk");
    assert!(talk.contains(r#"stroke="currentColor""#));
}

#[test]
fn test_optimization_strips_comments_and_titles() {
    let result = scan(&fixtures(), &mut IconCache::new(), &ScanOptions::default()).unwrap();
    assert!(!result.fragments.contains("<!--"));
    assert!(!result.fragments.contains("<title>"));
    assert!(!result.sprite_document.contains("<?xml"));
}

#[test]
fn test_optimization_disabled_keeps_markup() {
    let options = ScanOptions::default().with_optimization(Optimization::Disabled);
    let result = scan(&fixtures(), &mut IconCache::new(), &options).unwrap();

    assert!(result.fragments.contains("<!-- speech bubble -->"));
    assert!(result.fragments.contains("<title>add</title>"));
}

#[test]
fn test_scan_is_deterministic() {
    let first = scan(&fixtures(), &mut IconCache::new(), &ScanOptions::default()).unwrap();
    let second = scan(&fixtures(), &mut IconCache::new(), &ScanOptions::default()).unwrap();

    assert_eq!(first.sprite_document, second.sprite_document);
    assert_eq!(first.symbol_ids, second.symbol_ids);
}

#[test]
fn test_warm_scan_matches_cold_scan() {
    let dir = fixture_tree();
    let mut cache = IconCache::new();

    let cold = scan(dir.path(), &mut cache, &ScanOptions::default()).unwrap();
    let warm = scan(dir.path(), &mut cache, &ScanOptions::default()).unwrap();

    assert_eq!(cold.sprite_document, warm.sprite_document);
    assert_eq!(cold.symbol_ids, warm.symbol_ids);
    assert_eq!(warm.summary.cache_hits, 3);
    assert_eq!(warm.summary.compiled, 0);
}

#[test]
fn test_modified_icon_is_recompiled() {
    let dir = fixture_tree();
    let mut cache = IconCache::new();
    let cold = scan(dir.path(), &mut cache, &ScanOptions::default()).unwrap();

    let talk = dir.path().join("inner/talk.svg");
    fs::write(
        &talk,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24"><circle r="9"/></svg>"#,
    )
    .unwrap();
    bump_mtime(&talk);

    let warm = scan(dir.path(), &mut cache, &ScanOptions::default()).unwrap();

    assert_eq!(warm.summary.compiled, 1);
    assert_eq!(warm.summary.cache_hits, 2);
    assert!(symbol_for(&warm.fragments, "icon-inner-talk").contains(r#"<circle r="9"/>"#));
    assert_eq!(
        symbol_for(&cold.fragments, "icon-add"),
        symbol_for(&warm.fragments, "icon-add")
    );
}

#[test]
fn test_touch_without_content_change_recompiles() {
    let dir = fixture_tree();
    let mut cache = IconCache::new();
    let cold = scan(dir.path(), &mut cache, &ScanOptions::default()).unwrap();

    bump_mtime(&dir.path().join("qrcode.svg"));
    let warm = scan(dir.path(), &mut cache, &ScanOptions::default()).unwrap();

    assert_eq!(warm.summary.compiled, 1);
    assert_eq!(cold.sprite_document, warm.sprite_document);
}

#[test]
fn test_new_icon_is_picked_up() {
    let dir = fixture_tree();
    let mut cache = IconCache::new();
    scan(dir.path(), &mut cache, &ScanOptions::default()).unwrap();

    fs::write(
        dir.path().join("inner/zoom.svg"),
        r#"<svg viewBox="0 0 24 24"><path d="M1 1"/></svg>"#,
    )
    .unwrap();
    let warm = scan(dir.path(), &mut cache, &ScanOptions::default()).unwrap();

    assert!(warm.symbol_ids.contains("icon-inner-zoom"));
    assert_eq!(warm.summary.compiled, 1);
    assert_eq!(warm.summary.cache_hits, 3);
}

#[test]
fn test_deleted_icon_leaves_output_but_stays_cached() {
    let dir = fixture_tree();
    let mut cache = IconCache::new();
    scan(dir.path(), &mut cache, &ScanOptions::default()).unwrap();

    fs::remove_file(dir.path().join("qrcode.svg")).unwrap();
    let warm = scan(dir.path(), &mut cache, &ScanOptions::default()).unwrap();

    assert!(!warm.symbol_ids.contains("icon-qrcode"));
    assert!(!warm.fragments.contains("icon-qrcode"));
    assert_eq!(cache.len(), 3);

    assert_eq!(cache.prune_missing(), 1);
    assert_eq!(cache.len(), 2);
}

#[test]
fn test_name_only_template() {
    let options = ScanOptions::default().with_template("[name]");
    let result = scan(&fixtures(), &mut IconCache::new(), &options).unwrap();

    let ids: Vec<_> = result.symbol_ids.iter().map(String::as_str).collect();
    assert_eq!(ids, vec!["add", "inner/talk", "qrcode"]);
}

#[test]
fn test_relative_root_is_resolved() {
    let cwd = std::env::current_dir().unwrap();
    let relative = fixtures().strip_prefix(&cwd).unwrap().to_path_buf();
    assert!(relative.is_relative());

    let mut cache = IconCache::new();
    let result = scan(&relative, &mut cache, &ScanOptions::default()).unwrap();

    let ids: Vec<_> = result.symbol_ids.iter().map(String::as_str).collect();
    assert_eq!(ids, vec!["icon-add", "icon-inner-talk", "icon-qrcode"]);
    assert_eq!(cache.len(), 3);
    for (path, entry) in cache.iter() {
        assert!(path.is_absolute());
        assert!(path.starts_with(&cwd));
        assert!(!entry.relative_name.starts_with('/'));
        assert!(!entry.relative_name.contains(".."));
    }
    assert!(cache.get(&cwd.join(&relative).join("inner/talk.svg")).is_some());
}

#[test]
fn test_hidden_entries_are_skipped_by_default() {
    let dir = fixture_tree();
    fs::write(dir.path().join(".hidden.svg"), r#"<svg viewBox="0 0 1 1"><g/></svg>"#).unwrap();
    fs::create_dir(dir.path().join(".trash")).unwrap();
    fs::write(dir.path().join(".trash/old.svg"), r#"<svg viewBox="0 0 1 1"><g/></svg>"#).unwrap();

    let result = scan(dir.path(), &mut IconCache::new(), &ScanOptions::default()).unwrap();
    let ids: Vec<_> = result.symbol_ids.iter().map(String::as_str).collect();
    assert_eq!(ids, vec!["icon-add", "icon-inner-talk", "icon-qrcode"]);

    let source = DiskSource::new(WalkerConfig {
        skip_hidden: false,
        ..WalkerConfig::default()
    });
    let result = SpriteCompiler::new()
        .with_source(source)
        .scan(dir.path(), &mut IconCache::new(), &ScanOptions::default())
        .unwrap();
    assert!(result.symbol_ids.contains("icon-.hidden"));
    assert!(result.symbol_ids.contains("icon-.trash-old"));
}

#[test]
#[cfg(unix)]
fn test_symlinked_icons_are_included() {
    let dir = fixture_tree();
    let other = tempdir().unwrap();
    fs::write(
        other.path().join("shared.svg"),
        r#"<svg viewBox="0 0 1 1"><g/></svg>"#,
    )
    .unwrap();
    std::os::unix::fs::symlink(other.path().join("shared.svg"), dir.path().join("shared.svg"))
        .unwrap();
    std::os::unix::fs::symlink(other.path(), dir.path().join("linked")).unwrap();

    let result = scan(dir.path(), &mut IconCache::new(), &ScanOptions::default()).unwrap();

    assert!(result.symbol_ids.contains("icon-shared"));
    assert!(result.symbol_ids.contains("icon-linked-shared"));
    assert_eq!(result.summary.total_files, 5);
}

#[test]
fn test_empty_directory() {
    let dir = tempdir().unwrap();
    let result = scan(dir.path(), &mut IconCache::new(), &ScanOptions::default()).unwrap();

    assert!(result.symbol_ids.is_empty());
    assert!(result.fragments.is_empty());
    assert_eq!(result.summary.total_files, 0);
    assert!(result.sprite_document.ends_with("></svg>"));
}

#[test]
fn test_missing_root() {
    let dir = tempdir().unwrap();
    let err = scan(
        &dir.path().join("nope"),
        &mut IconCache::new(),
        &ScanOptions::default(),
    )
    .unwrap_err();

    assert!(matches!(err, SpriteError::Scan(ScanError::NotFound(_))));
}

#[test]
fn test_collision_is_permissive_by_default() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("a")).unwrap();
    let svg = r#"<svg viewBox="0 0 1 1"><g/></svg>"#;
    fs::write(dir.path().join("a-b.svg"), svg).unwrap();
    fs::write(dir.path().join("a/b.svg"), svg).unwrap();

    let result = scan(dir.path(), &mut IconCache::new(), &ScanOptions::default()).unwrap();

    assert_eq!(result.symbol_ids.len(), 1);
    assert_eq!(result.summary.collisions, 1);
    assert_eq!(result.fragments.matches(r#"id="icon-a-b""#).count(), 2);
}

#[test]
fn test_collision_fails_with_strict_ids() {
    let dir = tempdir().unwrap();
    fs::create_dir(dir.path().join("a")).unwrap();
    let svg = r#"<svg viewBox="0 0 1 1"><g/></svg>"#;
    fs::write(dir.path().join("a-b.svg"), svg).unwrap();
    fs::write(dir.path().join("a/b.svg"), svg).unwrap();

    let options = ScanOptions::default().with_strict_ids(true);
    let err = scan(dir.path(), &mut IconCache::new(), &options).unwrap_err();

    match err {
        SpriteError::DuplicateSymbolId { id, .. } => assert_eq!(id, "icon-a-b"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_non_svg_files_ignored() {
    let dir = fixture_tree();
    fs::write(dir.path().join("README.md"), "# icons").unwrap();
    fs::write(dir.path().join("inner/notes.txt"), "todo").unwrap();

    let result = scan(dir.path(), &mut IconCache::new(), &ScanOptions::default()).unwrap();
    assert_eq!(result.summary.total_files, 3);
}
