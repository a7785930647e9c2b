//! Command-line interface definitions for iconsprite.
//!
//! All arguments are declared with the clap derive API. Global options
//! (verbosity, config file, profile) apply to every subcommand.
//!
//! # Example
//!
//! ```bash
//! # Build a sprite from a directory of icons
//! iconsprite build assets/icons -o public/sprite.svg
//!
//! # Custom identifiers, symbols only
//! iconsprite build assets/icons -t "i-[name]" --format inner
//!
//! # List the identifiers a build would produce
//! iconsprite ids assets/icons
//!
//! # Verbose mode shows every cache hit and miss
//! iconsprite -vv build assets/icons
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Incremental SVG icon sprite compiler.
///
/// Turns a directory of SVG icons into one sprite of `<symbol>` elements,
/// recompiling only the icons that changed since the last build.
#[derive(Debug, Parser)]
#[command(name = "iconsprite")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(long, value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Named profile from the configuration file
    #[arg(long, value_name = "NAME", global = true)]
    pub profile: Option<String>,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compile a directory of icons into a sprite
    Build(BuildArgs),
    /// Print the symbol identifiers found under a directory
    Ids(IdsArgs),
    /// Remove the persisted cache
    Clean(CleanArgs),
}

/// Arguments for the build subcommand.
#[derive(Debug, Args)]
pub struct BuildArgs {
    /// Directory containing the icons
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Write the result to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// What to write: the full sprite, the symbols only, or JSON
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Identifier template with [dir] and [name] placeholders
    #[arg(short, long, value_name = "TEMPLATE")]
    pub template: Option<String>,

    /// Glob selecting icon files, relative to PATH
    #[arg(long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Use icons exactly as read
    #[arg(long)]
    pub no_optimize: bool,

    /// Fail when two icons produce the same identifier
    #[arg(long, overrides_with = "no_strict_ids")]
    pub strict_ids: bool,

    /// Allow duplicate identifiers (overrides config)
    #[arg(long, overrides_with = "strict_ids")]
    pub no_strict_ids: bool,

    /// Path to the cache database
    ///
    /// If not specified, a default platform-specific path is used.
    #[arg(long, value_name = "FILE")]
    pub cache: Option<PathBuf>,

    /// Compile everything and do not touch the cache database
    #[arg(long, conflicts_with = "cache")]
    pub no_cache: bool,

    /// Drop cache entries for icons that no longer exist
    #[arg(long)]
    pub prune: bool,

    /// Glob patterns to ignore (can be specified multiple times)
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Follow symbolic links during the scan (default)
    #[arg(long, overrides_with = "no_follow_symlinks")]
    pub follow_symlinks: bool,

    /// Do not follow symbolic links
    #[arg(long, overrides_with = "follow_symlinks")]
    pub no_follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .), the default
    #[arg(long, overrides_with = "no_skip_hidden")]
    pub skip_hidden: bool,

    /// Include hidden files and directories
    #[arg(long, overrides_with = "skip_hidden")]
    pub no_skip_hidden: bool,
}

/// Arguments for the ids subcommand.
#[derive(Debug, Args)]
pub struct IdsArgs {
    /// Directory containing the icons
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Identifier template with [dir] and [name] placeholders
    #[arg(short, long, value_name = "TEMPLATE")]
    pub template: Option<String>,
}

/// Arguments for the clean subcommand.
#[derive(Debug, Args)]
pub struct CleanArgs {
    /// Path to the cache database
    #[arg(long, value_name = "FILE")]
    pub cache: Option<PathBuf>,
}

/// What `build` writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Complete sprite document
    #[default]
    Svg,
    /// Symbols only, without the container
    Inner,
    /// JSON object with sprite, fragments, ids and summary
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Svg => write!(f, "svg"),
            OutputFormat::Inner => write!(f, "inner"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}
