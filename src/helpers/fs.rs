//! File System Utilities
//!
//! Configuration directory management.

use crate::constants::CONFIG_FILE_NAME;
use crate::error::{Error, Result};
use directories::ProjectDirs;
use std::fs;
use std::path::PathBuf;

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("org", "referral", "referral-pager").ok_or_else(|| Error::Invalid {
        message: "Could not determine project directories".to_string(),
    })
}

/// Get or create the application's configuration directory
///
/// Platform-specific locations:
/// - **Linux**: `~/.config/referral-pager/` or `$XDG_CONFIG_HOME/referral-pager/`
/// - **macOS**: `~/Library/Application Support/org.referral.referral-pager/`
/// - **Windows**: `C:\Users\<User>\AppData\Roaming\referral\referral-pager\config\`
pub fn get_or_create_config_dir() -> Result<PathBuf> {
    let project_dirs = project_dirs()?;
    let config_dir = project_dirs.config_dir();

    if !config_dir.exists() {
        fs::create_dir_all(config_dir)?;
    }

    Ok(config_dir.to_path_buf())
}

/// Default location of `config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    Ok(get_or_create_config_dir()?.join(CONFIG_FILE_NAME))
}
