//! Configuration for embedding the watcher in a build orchestrator.
//!
//! Layered configuration with:
//! - Default values
//! - TOML configuration file (`docwatch.toml`)
//! - Environment variable overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `DOCWATCH_` and use double
//! underscores to separate nested levels:
//! - `DOCWATCH_WATCH__DEBOUNCE_MS=500` sets `watch.debounce_ms`
//! - `DOCWATCH_WATCH__CASE_SENSITIVE=true` sets `watch.case_sensitive`
//! - `DOCWATCH_LOGGING__DEFAULT=debug` sets `logging.default`

use std::collections::HashMap;
use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::watcher::DEFAULT_DEBOUNCE_MS;

/// Top-level settings.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    /// Watcher configuration
    #[serde(default)]
    pub watch: WatchConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Watcher configuration.
///
/// A typical documentation project watches its source tree for the
/// generator's source suffixes plus asset files, and excludes hidden and
/// underscore-prefixed names:
///
/// ```toml
/// [watch]
/// directories = ["docs"]
/// patterns = ["*.md", "*.rst", "*.py", "*.js", "*.css", "*.png"]
/// ignore_patterns = [".*", "_*"]
/// output_dir = "docs/_build"
/// ```
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WatchConfig {
    /// Directories to watch
    #[serde(default)]
    pub directories: Vec<PathBuf>,

    /// Inclusion globs matched against filenames; empty means match-all
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Exclusion globs; a matching filename is dropped even if included
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Drop directory-kind changes
    #[serde(default = "default_true")]
    pub ignore_directories: bool,

    /// Case sensitivity of glob matching
    #[serde(default = "default_false")]
    pub case_sensitive: bool,

    /// Build output directory whose own changes are suppressed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Watch roots recursively
    #[serde(default = "default_true")]
    pub recursive: bool,

    /// Debounce window in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default level filter (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub default: String,

    /// Per-module level overrides
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

// Default value functions

fn default_version() -> u32 {
    1
}

fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            watch: WatchConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            directories: Vec::new(),
            patterns: Vec::new(),
            ignore_patterns: Vec::new(),
            ignore_directories: default_true(),
            case_sensitive: default_false(),
            output_dir: None,
            recursive: default_true(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            default: default_log_level(),
            modules: HashMap::new(),
        }
    }
}

impl Settings {
    /// Load configuration from all sources.
    pub fn load() -> Result<Self, Box<figment::Error>> {
        Self::load_from(PathBuf::from("docwatch.toml"))
    }

    /// Load configuration layering defaults, the given TOML file, and
    /// `DOCWATCH_` environment variables.
    pub fn load_from(config_path: PathBuf) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            // Start with defaults
            .merge(Serialized::defaults(Settings::default()))
            // Layer in config file if it exists
            .merge(Toml::file(config_path))
            // Layer in environment variables with DOCWATCH_ prefix;
            // double underscore separates nested levels
            .merge(Env::prefixed("DOCWATCH_").split("__"))
            .extract()
            .map_err(Box::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.version, 1);
        assert!(settings.watch.directories.is_empty());
        assert!(settings.watch.patterns.is_empty());
        assert!(settings.watch.ignore_directories);
        assert!(!settings.watch.case_sensitive);
        assert!(settings.watch.recursive);
        assert_eq!(settings.watch.debounce_ms, 250);
        assert_eq!(settings.logging.default, "warn");
    }

    #[test]
    fn test_toml_overrides_defaults() {
        let toml = r#"
            [watch]
            directories = ["docs"]
            patterns = ["*.md", "*.rst"]
            ignore_patterns = [".*", "_*"]
            output_dir = "docs/_build"
            debounce_ms = 500
        "#;

        let settings: Settings = Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::string(toml))
            .extract()
            .unwrap();

        assert_eq!(settings.watch.directories, vec![PathBuf::from("docs")]);
        assert_eq!(settings.watch.patterns, vec!["*.md", "*.rst"]);
        assert_eq!(settings.watch.output_dir, Some(PathBuf::from("docs/_build")));
        assert_eq!(settings.watch.debounce_ms, 500);
        // untouched fields keep their defaults
        assert!(settings.watch.ignore_directories);
        assert!(settings.watch.recursive);
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let settings = Settings::load_from(PathBuf::from("/nonexistent/docwatch.toml")).unwrap();
        assert_eq!(settings.watch.debounce_ms, 250);
    }
}
