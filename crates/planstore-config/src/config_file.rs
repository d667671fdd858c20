use std::path::Path;

use crate::paths;

/// Load config file content from CWD first, then the global config directory
///
/// Searches for:
/// 1. `.planstore.toml` in the current working directory
/// 2. `config.toml` in the planstore config directory
///
/// Returns the file content if found, None otherwise.
pub fn load_config_file() -> Option<String> {
    if let Ok(local) = paths::local_config_path() {
        if let Some(content) = read(&local) {
            return Some(content);
        }
    }

    if let Ok(global) = paths::global_config_path() {
        if let Some(content) = read(&global) {
            return Some(content);
        }
    }

    None
}

fn read(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => {
            log::debug!("Loaded config from {}", path.display());
            Some(content)
        }
        Err(_) => None,
    }
}
