//! Layered configuration.
//!
//! Settings are merged with figment, later layers winning:
//!
//! 1. built-in defaults
//! 2. `config.toml` (from `--config` or the platform config directory)
//! 3. the `[profile.<name>]` table selected with `--profile`
//! 4. `ICONSPRITE_*` environment variables (`__` separates nested keys)
//! 5. command-line flags, via [`Config::merge_build_args`]
//!
//! # Example
//!
//! ```toml
//! symbol_id_template = "i-[dir]-[name]"
//! ignore_patterns = ["legacy/"]
//!
//! [optimize]
//! remove_title = false
//!
//! [profile.ci]
//! strict_ids = true
//! use_cache = false
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::{BuildArgs, OutputFormat};
use crate::scanner::{WalkerConfig, DEFAULT_PATTERN};
use crate::sprite::{Optimization, ScanOptions, DEFAULT_TEMPLATE};

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "ICONSPRITE_";

const KNOWN_KEYS: &[&str] = &[
    "symbol_id_template",
    "optimize",
    "strict_ids",
    "cache_path",
    "use_cache",
    "follow_symlinks",
    "skip_hidden",
    "ignore_patterns",
    "pattern",
    "output",
    "profile",
];

const OPTIMIZER_KEYS: &[&str] = &[
    "remove_xml_declaration",
    "remove_doctype",
    "remove_comments",
    "remove_metadata",
    "remove_title",
    "remove_desc",
    "collapse_whitespace",
];

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Identifier template.
    pub symbol_id_template: String,
    /// `true`, `false`, or a table of optimizer switches.
    pub optimize: Optimization,
    /// Fail on duplicate identifiers.
    pub strict_ids: bool,
    /// Cache database location; platform cache directory when unset.
    pub cache_path: Option<PathBuf>,
    /// Load and store the cache database.
    pub use_cache: bool,
    /// Follow symbolic links while scanning.
    pub follow_symlinks: bool,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Gitignore-style exclusion patterns.
    pub ignore_patterns: Vec<String>,
    /// Glob selecting icon files.
    pub pattern: String,
    /// Default output format for `build`.
    pub output: OutputFormat,
    /// Named profiles, as written in the file.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub profile: BTreeMap<String, toml::Table>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbol_id_template: DEFAULT_TEMPLATE.to_string(),
            optimize: Optimization::default(),
            strict_ids: false,
            cache_path: None,
            use_cache: true,
            follow_symlinks: true,
            skip_hidden: true,
            ignore_patterns: Vec::new(),
            pattern: DEFAULT_PATTERN.to_string(),
            output: OutputFormat::default(),
            profile: BTreeMap::new(),
        }
    }
}

impl Config {
    /// Load from `path`, or from the platform config file when `None`.
    pub fn load(path: Option<&Path>, profile: Option<&str>) -> Self {
        match path.map(Path::to_path_buf).or_else(Self::default_config_path) {
            Some(path) => Self::load_from_path(path, profile),
            None => {
                log::debug!("No configuration directory, using defaults and environment");
                Self::extract_or_default(Self::base_figment().merge(Self::env()))
            }
        }
    }

    /// Load from a specific file. A missing file is treated as empty and
    /// an unreadable or ill-typed one falls back to defaults.
    pub fn load_from_path(path: PathBuf, profile: Option<&str>) -> Self {
        if let Ok(content) = fs::read_to_string(&path) {
            match toml::from_str::<toml::Table>(&content) {
                Ok(table) => {
                    for warning in unknown_key_warnings(&table) {
                        log::warn!("{}: {}", path.display(), warning);
                    }
                }
                Err(e) => log::warn!("Invalid configuration {}: {}", path.display(), e),
            }
        }

        let mut figment = Self::base_figment().merge(Toml::file(&path));

        if let Some(name) = profile {
            let key = format!("profile.{name}");
            let file = Figment::from(Toml::file(&path));
            if file.contains(&key) {
                log::debug!("Applying profile '{}'", name);
                figment = figment.merge(file.focus(&key));
            } else {
                log::warn!("Profile '{}' not found in {}", name, path.display());
            }
        }

        Self::extract_or_default(figment.merge(Self::env()))
    }

    fn base_figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
    }

    fn env() -> Env {
        Env::prefixed(ENV_PREFIX).split("__")
    }

    fn extract_or_default(figment: Figment) -> Self {
        match figment.extract() {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Failed to load configuration, using defaults: {}", e);
                Self::default()
            }
        }
    }

    /// Platform-specific `config.toml` location.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Platform-specific cache database location.
    pub fn default_cache_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.cache_dir().join("cache.db"))
    }

    /// The cache database to use, or `None` when caching is off.
    #[must_use]
    pub fn cache_file(&self) -> Option<PathBuf> {
        if !self.use_cache {
            return None;
        }
        self.cache_path.clone().or_else(Self::default_cache_path)
    }

    /// Names of the profiles defined in the file.
    pub fn profile_names(&self) -> impl Iterator<Item = &str> {
        self.profile.keys().map(String::as_str)
    }

    /// Apply `build` flags on top of the loaded layers.
    pub fn merge_build_args(&mut self, args: &BuildArgs) {
        if let Some(template) = &args.template {
            self.symbol_id_template.clone_from(template);
        }
        if let Some(pattern) = &args.pattern {
            self.pattern.clone_from(pattern);
        }
        if let Some(format) = args.format {
            self.output = format;
        }
        if args.no_optimize {
            self.optimize = Optimization::Disabled;
        }
        if let Some(cache) = &args.cache {
            self.cache_path = Some(cache.clone());
        }
        if args.no_cache {
            self.use_cache = false;
        }

        if args.strict_ids {
            self.strict_ids = true;
        } else if args.no_strict_ids {
            self.strict_ids = false;
        }
        if args.follow_symlinks {
            self.follow_symlinks = true;
        } else if args.no_follow_symlinks {
            self.follow_symlinks = false;
        }
        if args.skip_hidden {
            self.skip_hidden = true;
        } else if args.no_skip_hidden {
            self.skip_hidden = false;
        }

        self.ignore_patterns.extend(args.ignore_patterns.iter().cloned());
    }

    /// Options for the scan pipeline.
    #[must_use]
    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions::default()
            .with_template(self.symbol_id_template.clone())
            .with_optimization(self.optimize.clone())
            .with_strict_ids(self.strict_ids)
    }

    /// Options for the directory walker.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig {
            pattern: self.pattern.clone(),
            follow_symlinks: self.follow_symlinks,
            skip_hidden: self.skip_hidden,
            ignore_patterns: self.ignore_patterns.clone(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "iconsprite", "iconsprite")
}

/// Warnings for keys that no setting reads, with a suggestion when a
/// known key is close.
pub fn unknown_key_warnings(table: &toml::Table) -> Vec<String> {
    let mut warnings = Vec::new();
    check_keys(table, KNOWN_KEYS, "", &mut warnings);

    if let Some(toml::Value::Table(optimize)) = table.get("optimize") {
        check_keys(optimize, OPTIMIZER_KEYS, "optimize.", &mut warnings);
    }

    if let Some(toml::Value::Table(profiles)) = table.get("profile") {
        for (name, profile) in profiles {
            if let toml::Value::Table(profile) = profile {
                let prefix = format!("profile.{name}.");
                let own_keys: Vec<&str> = KNOWN_KEYS
                    .iter()
                    .copied()
                    .filter(|key| *key != "profile")
                    .collect();
                check_keys(profile, &own_keys, &prefix, &mut warnings);
            }
        }
    }

    warnings
}

fn check_keys(table: &toml::Table, known: &[&str], prefix: &str, warnings: &mut Vec<String>) {
    for key in table.keys() {
        if known.contains(&key.as_str()) {
            continue;
        }
        let warning = match suggest(key, known) {
            Some(candidate) => {
                format!("unknown key '{prefix}{key}', did you mean '{prefix}{candidate}'?")
            }
            None => format!("unknown key '{prefix}{key}'"),
        };
        warnings.push(warning);
    }
}

fn suggest<'a>(key: &str, known: &[&'a str]) -> Option<&'a str> {
    known
        .iter()
        .map(|candidate| (*candidate, strsim::jaro_winkler(key, candidate)))
        .filter(|(_, score)| *score >= 0.8)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(candidate, _)| candidate)
}
