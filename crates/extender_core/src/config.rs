//! Engine configuration loaded from JSON.
//!
//! # Responsibility
//! - Parse and validate deployment settings for the extender engine.
//!
//! # Invariants
//! - A loaded config always has an http(s) `site_url` and a supported level.

use crate::interchange::external_id::ExternalIds;
use crate::logging::{default_log_level, init_logging, normalize_level, LoggingError};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Deployment settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExtenderConfig {
    pub site_url: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub db_path: Option<PathBuf>,
}

impl Default for ExtenderConfig {
    fn default() -> Self {
        Self {
            site_url: "http://localhost/".to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
            db_path: None,
        }
    }
}

/// Config loading errors.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl ExtenderConfig {
    /// Parses and validates a JSON document.
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let site_url = self.site_url.trim();
        if site_url.is_empty() {
            return Err(ConfigError::Invalid("site_url cannot be empty".to_string()));
        }
        if !(site_url.starts_with("http://") || site_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "site_url must start with http:// or https://, got `{site_url}`"
            )));
        }
        normalize_level(&self.log_level).map_err(|err| ConfigError::Invalid(err.to_string()))?;
        Ok(())
    }

    /// External identifier codec for this site.
    pub fn external_ids(&self) -> ExternalIds {
        ExternalIds::new(self.site_url.trim())
    }

    /// Starts file logging when `log_dir` is configured; returns whether it did.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        match self.log_dir.as_deref() {
            Some(dir) => init_logging(&self.log_level, dir).map(|()| true),
            None => Ok(false),
        }
    }
}

/// Reads and validates the config file at `path`.
pub fn load_config(path: impl AsRef<Path>) -> Result<ExtenderConfig, ConfigError> {
    let raw = std::fs::read_to_string(path)?;
    ExtenderConfig::from_json(&raw)
}
