//! Configuration for tidyfold.
//!
//! Two things are configurable:
//! - Which directories get organized. By default this is the user's Desktop
//!   and Downloads folders, overridable with the `DESKTOP_PATH` and
//!   `DOWNLOADS_PATH` environment variables.
//! - How files are classified and which files are left alone, via an
//!   optional TOML file.
//!
//! # Configuration File Format
//!
//! ```toml
//! # Replaces the Desktop/Downloads pair when present.
//! directories = ["/home/me/Desktop", "/home/me/Inbox"]
//!
//! # Replaces the built-in extension table. Order matters: first match wins.
//! [[categories]]
//! name = "Documents"
//! extensions = [".pdf", ".md"]
//!
//! [[categories]]
//! name = "Images"
//! extensions = ["png", "jpg"]
//!
//! [exclude]
//! filenames = ["desktop.ini"]
//! patterns = ["*.part"]
//! regex = ["^~\\$"]
//! ```

use crate::file_category::{Category, ExtensionTable, TableError};
use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the Desktop directory.
pub const DESKTOP_ENV: &str = "DESKTOP_PATH";
/// Environment variable overriding the Downloads directory.
pub const DOWNLOADS_ENV: &str = "DOWNLOADS_PATH";

/// Name of the per-directory configuration file.
const LOCAL_CONFIG_NAME: &str = ".tidyfold.toml";

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found at the specified path.
    #[error("Configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    /// Configuration file exists but could not be read.
    #[error("IO error reading configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Invalid TOML syntax or structure.
    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),
    /// Invalid glob pattern provided.
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidGlobPattern { pattern: String, reason: String },
    /// Invalid regex pattern provided.
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },
    /// A `[[categories]]` entry names an unknown category.
    #[error("Invalid category rule: {0}")]
    InvalidCategory(String),
    /// The category rules do not form a valid table.
    #[error("Invalid category table: {0}")]
    InvalidTable(#[from] TableError),
}

/// Configuration as read from a TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Directories to organize, in order. `None` means Desktop + Downloads.
    #[serde(default)]
    pub directories: Option<Vec<PathBuf>>,

    /// Ordered category rules. Empty means the built-in table.
    #[serde(default)]
    pub categories: Vec<CategoryRule>,

    /// Files that are never counted, previewed or moved.
    #[serde(default)]
    pub exclude: ExcludeConfig,
}

/// One `[[categories]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// Raw exclusion rules. Everything is empty by default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExcludeConfig {
    /// Exact file names (e.g. "desktop.ini").
    #[serde(default)]
    pub filenames: Vec<String>,
    /// Glob patterns matched against the file name (e.g. "*.part").
    #[serde(default)]
    pub patterns: Vec<String>,
    /// Regex patterns matched against the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

impl AppConfig {
    /// Load configuration, falling back to defaults.
    ///
    /// Lookup order:
    /// 1. `config_path`, if given (must exist)
    /// 2. `.tidyfold.toml` in the current directory
    /// 3. `<config dir>/tidyfold/config.toml`
    /// 4. Built-in defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_NAME);
        if local_config.is_file() {
            return Self::load_from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("tidyfold").join("config.toml");
            if user_config.is_file() {
                return Self::load_from_file(&user_config);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Directories to organize, in processing order.
    pub fn target_directories(&self) -> Vec<PathBuf> {
        match &self.directories {
            Some(dirs) => dirs.clone(),
            None => default_directories(),
        }
    }

    /// Builds the extension table, or the built-in one if no rules are set.
    pub fn extension_table(&self) -> Result<ExtensionTable, ConfigError> {
        if self.categories.is_empty() {
            return Ok(ExtensionTable::standard());
        }

        let rules = self
            .categories
            .iter()
            .map(|rule| {
                rule.name
                    .parse::<Category>()
                    .map(|category| (category, rule.extensions.clone()))
                    .map_err(|e| ConfigError::InvalidCategory(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ExtensionTable::from_rules(rules)?)
    }

    /// Compiles the exclusion rules.
    pub fn exclude_rules(&self) -> Result<ExcludeRules, ConfigError> {
        ExcludeRules::compile(&self.exclude)
    }
}

/// Returns the path named by `env_var`, or `default` when it is unset or empty.
pub fn get_configured_path(env_var: &str, default: PathBuf) -> PathBuf {
    match std::env::var_os(env_var) {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => default,
    }
}

/// The Desktop and Downloads directories, honoring the environment overrides.
pub fn default_directories() -> Vec<PathBuf> {
    vec![
        get_configured_path(DESKTOP_ENV, default_desktop_dir()),
        get_configured_path(DOWNLOADS_ENV, default_downloads_dir()),
    ]
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn default_desktop_dir() -> PathBuf {
    dirs::desktop_dir().unwrap_or_else(|| home_dir().join("Desktop"))
}

fn default_downloads_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| home_dir().join("Downloads"))
}

/// Compiled exclusion rules, matched against bare file names.
#[derive(Debug, Clone, Default)]
pub struct ExcludeRules {
    filenames: HashSet<String>,
    patterns: Vec<Pattern>,
    regexes: Vec<Regex>,
}

impl ExcludeRules {
    /// Compiles raw rules, validating every pattern up front.
    pub fn compile(config: &ExcludeConfig) -> Result<Self, ConfigError> {
        let patterns = config
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|e| ConfigError::InvalidGlobPattern {
                    pattern: pattern.clone(),
                    reason: e.msg.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let regexes = config
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            filenames: config.filenames.iter().cloned().collect(),
            patterns,
            regexes,
        })
    }

    /// True if the file should be left where it is.
    pub fn is_excluded(&self, filename: &str) -> bool {
        self.filenames.contains(filename)
            || self.patterns.iter().any(|p| p.matches(filename))
            || self.regexes.iter().any(|r| r.is_match(filename))
    }

    /// True if no rule is configured.
    pub fn is_empty(&self) -> bool {
        self.filenames.is_empty() && self.patterns.is_empty() && self.regexes.is_empty()
    }
}
