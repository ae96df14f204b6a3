//! Configuration file support.
//!
//! The global configuration lives at `~/.lambda-builders/config.toml`. The
//! `LAMBDA_BUILDERS_CONFIG` environment variable or the `--config` flag point
//! at a different file. A missing or broken file never blocks a build.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming an alternative config file.
pub const CONFIG_ENV: &str = "LAMBDA_BUILDERS_CONFIG";

/// Tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Executable resolution settings
    pub resolve: ResolveConfig,

    /// Logging settings
    pub log: LogConfig,
}

/// Executable resolution settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveConfig {
    /// Extra directories searched after the ones a request supplies
    pub executable_search_paths: Vec<PathBuf>,
}

/// Logging settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive, e.g. `lambda_builders=debug`
    pub level: Option<String>,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }
}

/// Get the global config directory (~/.lambda-builders).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".lambda-builders"))
}

/// Get the global config path (~/.lambda-builders/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Pick the config file to read.
///
/// Order of precedence (highest to lowest):
/// 1. An explicit path (`--config`)
/// 2. `LAMBDA_BUILDERS_CONFIG`
/// 3. The global config path
pub fn config_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    match std::env::var_os(CONFIG_ENV) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => global_config_path(),
    }
}

/// Load configuration from whichever file [`config_path`] selects.
///
/// A missing file yields defaults. A file that exists but cannot be read or
/// parsed is an error; the caller falls back to defaults and reports it once
/// logging is up.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    match config_path(explicit) {
        Some(path) if path.exists() => Config::load(&path),
        _ => Ok(Config::default()),
    }
}
