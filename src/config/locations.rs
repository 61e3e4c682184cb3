//! Config file locations: ~/.aptly.conf, then /etc/aptly.conf

use crate::error::ConfigError;
use std::path::PathBuf;

/// File name of the user-level config, relative to the home directory.
pub const USER_CONFIG_FILE: &str = ".aptly.conf";

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/aptly.conf";

/// Home directory: `$HOME` when set, otherwise the platform's notion of it.
pub fn home_dir() -> Option<PathBuf> {
    match std::env::var_os("HOME") {
        Some(home) if !home.is_empty() => Some(PathBuf::from(home)),
        _ => directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()),
    }
}

/// Ordered fallback candidates. The first entry is where a default config is created.
pub fn config_locations() -> Result<Vec<PathBuf>, ConfigError> {
    let home = home_dir().ok_or(ConfigError::Home)?;
    Ok(vec![
        home.join(USER_CONFIG_FILE),
        PathBuf::from(SYSTEM_CONFIG_PATH),
    ])
}
