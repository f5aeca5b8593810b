use std::path::PathBuf;

use crate::error::{JournalError, Result};

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "natwelch", "etu").ok_or_else(|| {
        JournalError::Config("cannot determine home directory for etu".to_string())
    })
}

/// Returns the directory holding `config.json`.
///
/// Resolution order:
/// 1. `ETU_CONFIG_DIR` environment variable (if set)
/// 2. The platform config directory for etu
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("ETU_CONFIG_DIR") {
        return Ok(PathBuf::from(dir));
    }
    Ok(project_dirs()?.config_dir().to_path_buf())
}

/// Returns the directory holding derived, disposable state such as the metrics cache.
///
/// Resolution order:
/// 1. `ETU_CACHE_DIR` environment variable (if set)
/// 2. The platform cache directory for etu
pub fn cache_dir() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var("ETU_CACHE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    Ok(project_dirs()?.cache_dir().to_path_buf())
}
