use clap::Parser;
use iconsprite::cache::CacheDatabase;
use iconsprite::cli::Cli;
use iconsprite::config::Config;
use iconsprite::error::ExitCode;
use iconsprite::run_app;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempdir().unwrap();
        let icons = dir.path().join("icons");
        fs::create_dir_all(icons.join("inner")).unwrap();
        fs::write(
            icons.join("add.svg"),
            r#"<svg viewBox="0 0 24 24"><path d="M12 5v14" stroke="red"/></svg>"#,
        )
        .unwrap();
        fs::write(
            icons.join("inner/talk.svg"),
            r#"<svg viewBox="0 0 24 24"><path d="M4 4h16"/></svg>"#,
        )
        .unwrap();
        Self { dir }
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    fn arg(&self, name: &str) -> String {
        self.path(name).to_string_lossy().into_owned()
    }

    /// Run with an empty config file so user settings do not leak in.
    fn run(&self, args: &[&str]) -> anyhow::Result<ExitCode> {
        let config = self.arg("config.toml");
        let mut argv = vec!["iconsprite", "--config", config.as_str()];
        argv.extend_from_slice(args);
        run_app(Cli::try_parse_from(argv).unwrap())
    }
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

#[test]
fn test_build_writes_sprite() {
    let ws = Workspace::new();
    let code = ws
        .run(&[
            "build",
            &ws.arg("icons"),
            "-o",
            &ws.arg("out/sprite.svg"),
            "--cache",
            &ws.arg("cache.db"),
        ])
        .unwrap();

    assert_eq!(code, ExitCode::Success);
    let sprite = read(&ws.path("out/sprite.svg"));
    assert!(sprite.starts_with("<svg "));
    assert!(sprite.contains(r#"id="icon-add""#));
    assert!(sprite.contains(r#"id="icon-inner-talk""#));
    assert!(sprite.contains(r#"stroke="currentColor""#));
}

#[test]
fn test_build_persists_cache() {
    let ws = Workspace::new();
    let cache = ws.arg("cache.db");
    ws.run(&["build", &ws.arg("icons"), "-o", &ws.arg("s.svg"), "--cache", &cache])
        .unwrap();

    let db = CacheDatabase::open(&ws.path("cache.db")).unwrap();
    let fingerprint = Config::default().scan_options().fingerprint();
    assert_eq!(db.fingerprint().unwrap(), Some(fingerprint.clone()));
    assert_eq!(db.load(&fingerprint).unwrap().len(), 2);
}

#[test]
fn test_build_inner_format() {
    let ws = Workspace::new();
    ws.run(&[
        "build",
        &ws.arg("icons"),
        "--format",
        "inner",
        "-o",
        &ws.arg("inner.svg"),
        "--no-cache",
    ])
    .unwrap();

    let inner = read(&ws.path("inner.svg"));
    assert!(inner.starts_with("<symbol"));
    assert!(!inner.contains("xmlns"));
}

#[test]
fn test_build_json_format() {
    let ws = Workspace::new();
    ws.run(&[
        "build",
        &ws.arg("icons"),
        "--format",
        "json",
        "-t",
        "[name]",
        "-o",
        &ws.arg("sprite.json"),
        "--no-cache",
    ])
    .unwrap();

    let value: serde_json::Value = serde_json::from_str(&read(&ws.path("sprite.json"))).unwrap();
    assert_eq!(value["ids"], serde_json::json!(["add", "inner/talk"]));
    assert_eq!(value["summary"]["total_files"], 2);
    assert!(value["sprite"].as_str().unwrap().starts_with("<svg "));
    assert!(value["fragments"].as_str().unwrap().starts_with("<symbol"));
}

#[test]
fn test_build_honours_ignore_patterns() {
    let ws = Workspace::new();
    ws.run(&[
        "build",
        &ws.arg("icons"),
        "-i",
        "inner/",
        "-o",
        &ws.arg("s.svg"),
        "--no-cache",
    ])
    .unwrap();

    let sprite = read(&ws.path("s.svg"));
    assert!(sprite.contains(r#"id="icon-add""#));
    assert!(!sprite.contains("talk"));
}

#[test]
fn test_build_empty_directory_reports_no_icons() {
    let ws = Workspace::new();
    fs::create_dir(ws.path("empty")).unwrap();

    let code = ws
        .run(&["build", &ws.arg("empty"), "-o", &ws.arg("s.svg"), "--no-cache"])
        .unwrap();
    assert_eq!(code, ExitCode::NoIcons);
}

#[test]
fn test_build_missing_directory_fails() {
    let ws = Workspace::new();
    let err = ws
        .run(&["build", &ws.arg("missing"), "--no-cache"])
        .unwrap_err();
    assert!(format!("{err:#}").contains("Path not found"));
}

#[test]
fn test_build_uses_config_file() {
    let ws = Workspace::new();
    fs::write(
        ws.path("config.toml"),
        "symbol_id_template = \"i-[name]\"\nuse_cache = false\n",
    )
    .unwrap();

    ws.run(&["build", &ws.arg("icons"), "-o", &ws.arg("s.svg")])
        .unwrap();

    let sprite = read(&ws.path("s.svg"));
    assert!(sprite.contains(r#"id="i-add""#));
    assert!(!ws.path("cache.db").exists());
}

#[test]
fn test_ids_command() {
    let ws = Workspace::new();
    let code = ws.run(&["ids", &ws.arg("icons")]).unwrap();
    assert_eq!(code, ExitCode::Success);

    fs::create_dir(ws.path("empty")).unwrap();
    let code = ws.run(&["ids", &ws.arg("empty")]).unwrap();
    assert_eq!(code, ExitCode::NoIcons);
}

#[test]
fn test_clean_command() {
    let ws = Workspace::new();
    let cache = ws.arg("cache.db");
    ws.run(&["build", &ws.arg("icons"), "-o", &ws.arg("s.svg"), "--cache", &cache])
        .unwrap();

    let code = ws.run(&["clean", "--cache", &cache]).unwrap();
    assert_eq!(code, ExitCode::Success);

    let db = CacheDatabase::open(&ws.path("cache.db")).unwrap();
    assert_eq!(db.fingerprint().unwrap(), None);
}

#[test]
fn test_clean_without_cache_is_noop() {
    let ws = Workspace::new();
    let code = ws
        .run(&["clean", "--cache", &ws.arg("never.db")])
        .unwrap();
    assert_eq!(code, ExitCode::Success);
    assert!(!ws.path("never.db").exists());
}
