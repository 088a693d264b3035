//! Configuration file support for pdplog.
//!
//! Looked up as `--config <path>`, then `pdplog.toml` in the working
//! directory, then `pdplog/config.toml` under the user config directory.

use anyhow::{Context, Result};
use pdplog_logging::LogFormat;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The config file name in the working directory
pub const CONFIG_FILE_NAME: &str = "pdplog.toml";

/// Output path used when neither the CLI nor the config names one
pub const DEFAULT_OUTPUT: &str = "data.json";

pub const DEFAULT_LOG_LEVEL: &str = "warn";

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Default output path
    pub output: Option<PathBuf>,
    /// Console log format
    pub log_format: Option<LogFormat>,
    /// Tracing filter, e.g. "info" or "pdplog_sessions=debug"
    pub log_level: Option<String>,
    /// Append JSON log events to this file
    pub log_file: Option<PathBuf>,
    /// Indent the JSON output
    pub pretty: Option<bool>,
}

impl Config {
    /// Parse the config at `path`. A missing or malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Find and load the configuration.
    ///
    /// Returns:
    /// - `Ok(Some(config))` if a file was found and parses successfully
    /// - `Ok(None)` if no file exists in any of the searched locations
    /// - `Err(...)` if a file exists but fails to parse, or `explicit` is missing
    pub fn discover(explicit: Option<&Path>, working_dir: &Path) -> Result<Option<Self>> {
        if let Some(path) = explicit {
            return Self::load_from(path).map(Some);
        }

        let candidates = [
            Some(working_dir.join(CONFIG_FILE_NAME)),
            dirs::config_dir().map(|dir| dir.join("pdplog").join("config.toml")),
        ];

        for path in candidates.into_iter().flatten() {
            if path.exists() {
                return Self::load_from(&path).map(Some);
            }
        }

        Ok(None)
    }

    pub fn output(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }

    pub fn log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}
