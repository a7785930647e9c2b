//! iconsprite - Incremental SVG icon sprite compiler
//!
//! Compiles a directory of SVG icons into a single sprite document of
//! `<symbol>` elements that pages reference with `<use href="#id">`.
//! Compiled fragments are cached per file and keyed on modification time,
//! so rebuilding after a change only recompiles the icons that changed.
//!
//! The library entry point is [`sprite::scan`]; the binary wraps it with
//! configuration, a persistent [`cache::CacheDatabase`] and output writing
//! in [`run_app`].

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod scanner;
pub mod sprite;

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::{BuildArgs, CleanArgs, Cli, Commands, IdsArgs, OutputFormat};
use crate::config::Config;
use crate::scanner::{relative_name, DiskSource, IconSource};
use crate::sprite::{build_symbol_id, SpriteCompiler};

pub use crate::cache::{CacheDatabase, IconCache};
pub use crate::error::{ExitCode, SpriteError};
pub use crate::sprite::{scan, ScanOptions, ScanResult};

/// Run the command described by `cli`.
///
/// Logging is expected to be initialized by the caller.
///
/// # Errors
///
/// Any failure to load the cache, scan the icons, or write the output.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let config = Config::load(cli.config.as_deref(), cli.profile.as_deref());

    match &cli.command {
        Commands::Build(args) => build(config, args),
        Commands::Ids(args) => ids(config, args),
        Commands::Clean(args) => clean(&config, args),
    }
}

fn build(mut config: Config, args: &BuildArgs) -> Result<ExitCode> {
    config.merge_build_args(args);
    let options = config.scan_options();
    let fingerprint = options.fingerprint();

    let mut database = match config.cache_file() {
        Some(path) => Some(
            CacheDatabase::open(&path)
                .with_context(|| format!("Failed to open cache {}", path.display()))?,
        ),
        None => None,
    };
    let mut cache = match &database {
        Some(db) => db.load(&fingerprint).context("Failed to load cache")?,
        None => IconCache::new(),
    };

    let compiler = SpriteCompiler::new().with_source(DiskSource::new(config.walker_config()));
    let scanned = compiler.scan(&args.path, &mut cache, &options);

    if args.prune {
        let removed = cache.prune_missing();
        if removed > 0 {
            log::info!("Pruned {} cache entries for deleted icons", removed);
        }
    }

    // Entries compiled before a failure are still worth keeping.
    if let Some(db) = database.as_mut() {
        db.store(&cache, &fingerprint)
            .with_context(|| format!("Failed to write cache {}", db.path().display()))?;
    }

    let result =
        scanned.with_context(|| format!("Failed to build sprite from {}", args.path.display()))?;

    let rendered = match config.output {
        OutputFormat::Svg => result.sprite_document.clone(),
        OutputFormat::Inner => result.fragments.clone(),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&result).context("Failed to serialize result")?
        }
    };
    write_output(args.output.as_deref(), &rendered)?;

    let summary = result.summary;
    log::info!(
        "{} icon(s): {} compiled, {} from cache",
        summary.total_files,
        summary.compiled,
        summary.cache_hits
    );
    if summary.collisions > 0 {
        log::warn!("{} duplicate symbol id(s)", summary.collisions);
    }

    if summary.total_files == 0 {
        log::warn!("No icons found under {}", args.path.display());
        return Ok(ExitCode::NoIcons);
    }
    Ok(ExitCode::Success)
}

fn ids(config: Config, args: &IdsArgs) -> Result<ExitCode> {
    let template = args
        .template
        .clone()
        .unwrap_or_else(|| config.symbol_id_template.clone());
    let root = std::path::absolute(&args.path)
        .with_context(|| format!("Invalid path {}", args.path.display()))?;

    let source = DiskSource::new(config.walker_config());
    let icons = source
        .list(&root)
        .with_context(|| format!("Failed to scan {}", root.display()))?;

    let ids: BTreeSet<String> = icons
        .iter()
        .map(|icon| build_symbol_id(&relative_name(&icon.path, &root), &template))
        .collect();

    let mut stdout = std::io::stdout().lock();
    for id in &ids {
        writeln!(stdout, "{id}").context("Failed to write to stdout")?;
    }

    if ids.is_empty() {
        log::warn!("No icons found under {}", root.display());
        return Ok(ExitCode::NoIcons);
    }
    Ok(ExitCode::Success)
}

fn clean(config: &Config, args: &CleanArgs) -> Result<ExitCode> {
    let path = args
        .cache
        .clone()
        .or_else(|| config.cache_path.clone())
        .or_else(Config::default_cache_path)
        .context("Could not determine the cache location")?;

    if !path.exists() {
        log::info!("No cache at {}", path.display());
        return Ok(ExitCode::Success);
    }

    let mut database = CacheDatabase::open(&path)
        .with_context(|| format!("Failed to open cache {}", path.display()))?;
    database.clear().context("Failed to clear cache")?;
    log::info!("Cleared cache at {}", path.display());
    Ok(ExitCode::Success)
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            fs::write(path, content)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            log::debug!("Wrote {}", path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{content}").context("Failed to write to stdout")?;
        }
    }
    Ok(())
}
