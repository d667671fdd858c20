//! Configuration and data directory paths
//!
//! Uses XDG directories via `dirs` crate.
//!
//! Platform-specific locations:
//! - Linux: `~/.config/planstore/`, `~/.local/share/planstore/`
//! - macOS: `~/Library/Application Support/planstore/`
//! - Windows: `%APPDATA%\planstore\`

use anyhow::{Context, Result};
use std::path::PathBuf;

pub const APP_NAME: &str = "planstore";

/// Name of the config file looked up in the current working directory
pub const LOCAL_CONFIG_FILE: &str = ".planstore.toml";

/// Get the application config directory (not created)
pub fn config_dir() -> Result<PathBuf> {
    let base = dirs::config_dir().context("Could not determine config directory")?;
    Ok(base.join(APP_NAME))
}

/// Get the application data directory, creating it if needed
pub fn data_dir() -> Result<PathBuf> {
    let base = dirs::data_dir().context("Could not determine data directory")?;
    let dir = base.join(APP_NAME);
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create data directory {:?}", dir))?;
    Ok(dir)
}

/// Get path to the global config file
pub fn global_config_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Get path to the local config file (in CWD)
pub fn local_config_path() -> Result<PathBuf> {
    Ok(std::env::current_dir()?.join(LOCAL_CONFIG_FILE))
}

/// Default location of the persisted state snapshot
pub fn default_state_path() -> Result<PathBuf> {
    Ok(data_dir()?.join("state.json"))
}
