//! Store configuration
//!
//! Loaded from `.planstore.toml` (CWD) or the global `config.toml`.
//!
//! ```toml
//! debounce_ms = 16
//! log_level = "debug"
//!
//! [persistence]
//! enabled = true
//! path = "/tmp/planstore-state.json"
//! debounce_ms = 500
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Store configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct StoreConfig {
    /// Debounce window of the change notification, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Log level used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub persistence: PersistenceConfig,
}

/// Settings of the state persistence collaborator
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PersistenceConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Snapshot file; defaults to `<data dir>/planstore/state.json`
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Quiet period after a change before the snapshot is written
    #[serde(default = "default_persist_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    16
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_persist_debounce_ms() -> u64 {
    500
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            log_level: default_log_level(),
            persistence: PersistenceConfig::default(),
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            path: None,
            debounce_ms: default_persist_debounce_ms(),
        }
    }
}

impl StoreConfig {
    /// Load config from CWD first, then the config directory, or use defaults
    pub fn load() -> Self {
        if let Some(content) = crate::load_config_file() {
            match Self::from_toml(&content) {
                Ok(config) => {
                    log::info!("Loaded store config from file");
                    return config;
                }
                Err(e) => {
                    log::warn!("Failed to parse config file: {:#}", e);
                }
            }
        }

        log::debug!("Using default store config");
        Self::default()
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Invalid store config")
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Parsed `log_level`, falling back to `Info`
    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or_else(|_| {
            log::warn!("Unknown log level '{}', using info", self.log_level);
            log::LevelFilter::Info
        })
    }
}

impl PersistenceConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Configured snapshot path or the default one
    pub fn state_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => crate::paths::default_state_path(),
        }
    }
}
