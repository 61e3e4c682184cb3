//! Configuration System
//!
//! The configuration document is a JSON file (`.aptly.conf`) located through a fixed
//! fallback chain: an explicit `--config` path, then the user-level file in the home
//! directory, then the system-wide file. When no file exists at all, a default
//! document is written to the user-level location and used.

use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod loader;
mod locations;

pub use loader::{find_config, load_config, resolve_config, save_config, ConfigSource, ResolvedConfig};
pub use locations::{config_locations, home_dir, SYSTEM_CONFIG_PATH, USER_CONFIG_FILE};

/// Root configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AptlyConfig {
    /// Directory holding the database, package pool and published trees
    pub root_dir: PathBuf,

    /// Number of parallel downloads
    pub download_concurrency: usize,

    /// Default architectures to process; empty means all available
    pub architectures: Vec<String>,

    pub dependency_follow_suggests: bool,
    pub dependency_follow_recommends: bool,
    pub dependency_follow_all_variants: bool,
    pub dependency_follow_source: bool,

    pub gpg_disable_sign: bool,
    pub gpg_disable_verify: bool,
    pub download_source_packages: bool,

    /// Logging configuration
    pub logging: LoggingConfig,
}

fn default_root_dir() -> PathBuf {
    home_dir()
        .map(|home| home.join(".aptly"))
        .unwrap_or_else(|| PathBuf::from(".aptly"))
}

impl Default for AptlyConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            download_concurrency: 4,
            architectures: Vec::new(),
            dependency_follow_suggests: false,
            dependency_follow_recommends: false,
            dependency_follow_all_variants: false,
            dependency_follow_source: false,
            gpg_disable_sign: false,
            gpg_disable_verify: false,
            download_source_packages: false,
            logging: LoggingConfig::default(),
        }
    }
}

impl AptlyConfig {
    /// Validate values that the context depends on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.root_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("rootDir cannot be empty".to_string()));
        }
        if self.download_concurrency == 0 {
            return Err(ConfigError::Invalid(
                "downloadConcurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Location of the package database under the root directory
    pub fn db_path(&self) -> PathBuf {
        self.root_dir.join("db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AptlyConfig::default();
        assert_eq!(config.download_concurrency, 4);
        assert!(config.architectures.is_empty());
        assert!(!config.dependency_follow_suggests);
        assert!(config.root_dir.ends_with(".aptly"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_document_takes_defaults() {
        let config: AptlyConfig = serde_json::from_str(
            r#"{"rootDir": "/tmp/x", "dependencyFollowSuggests": true, "unknownKey": 1}"#,
        )
        .unwrap();
        assert_eq!(config.root_dir, PathBuf::from("/tmp/x"));
        assert!(config.dependency_follow_suggests);
        assert!(!config.dependency_follow_recommends);
        assert_eq!(config.download_concurrency, 4);
        assert_eq!(config.db_path(), PathBuf::from("/tmp/x/db"));
    }

    #[test]
    fn test_validation() {
        let mut config = AptlyConfig {
            download_concurrency: 0,
            ..AptlyConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert_eq!(
            err.to_string(),
            "invalid configuration: downloadConcurrency must be at least 1"
        );

        config.download_concurrency = 1;
        config.root_dir = PathBuf::new();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_serialized_keys_are_camel_case() {
        let json = serde_json::to_value(AptlyConfig::default()).unwrap();
        assert!(json.get("rootDir").is_some());
        assert!(json.get("downloadConcurrency").is_some());
        assert!(json.get("dependencyFollowAllVariants").is_some());
    }
}
