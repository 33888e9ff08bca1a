//! Application configuration loaded from `config.toml`.
//!
//! Every key is optional; a missing file yields [`AppConfig::default`].

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// `[database]` table
    pub database: DatabaseConfig,
    /// `[invoicing]` table
    pub invoicing: InvoicingConfig,
}

/// `[database]` table
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SeaORM` connection URL; `DATABASE_URL` takes precedence
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

/// `[invoicing]` table
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InvoicingConfig {
    /// Quiet period before a draft is auto-saved
    pub autosave_debounce_ms: u64,
    /// Days between issue date and due date on a new draft
    pub default_due_days: u64,
    /// Currency used when no business settings exist yet
    pub default_currency: String,
}

impl Default for InvoicingConfig {
    fn default() -> Self {
        Self {
            autosave_debounce_ms: 1500,
            default_due_days: 14,
            default_currency: "MYR".to_string(),
        }
    }
}

impl InvoicingConfig {
    /// Auto-save quiet window as a `Duration`
    #[must_use]
    pub const fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }
}

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from a TOML file, returning defaults if the file does not exist.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::info!("No config file at {:?}, using defaults", path);
        return Ok(AppConfig::default());
    }
    tracing::debug!("Loading configuration from {:?}", path);
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Loads configuration from the default location (./config.toml)
pub fn load_default_config() -> Result<AppConfig> {
    load_config("config.toml")
}
