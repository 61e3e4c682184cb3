//! Loading, saving and resolving the configuration document.

use super::AptlyConfig;
use crate::error::{AptlyError, ConfigError, FatalError};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Where the resolved configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Path given with `--config`
    Explicit(PathBuf),
    /// First existing fallback candidate
    File(PathBuf),
    /// No candidate existed; a default document was written here
    Created(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::Explicit(p) | ConfigSource::File(p) | ConfigSource::Created(p) => p,
        }
    }
}

/// Configuration together with its origin
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: AptlyConfig,
    pub source: ConfigSource,
}

/// Load a configuration document from exactly `path`.
pub fn load_config(path: &Path) -> Result<AptlyConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `config` to `path` as pretty-printed JSON, creating parent directories.
pub fn save_config(path: &Path, config: &AptlyConfig) -> Result<(), ConfigError> {
    let save_err = |source| ConfigError::Save {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(save_err)?;
    }
    let mut text = serde_json::to_string_pretty(config).map_err(|e| save_err(e.into()))?;
    text.push('\n');
    std::fs::write(path, text).map_err(save_err)
}

/// Resolve the configuration through the fallback chain.
///
/// An explicit path must load. Otherwise each candidate is tried in order: a
/// missing file moves on to the next one, any other failure is fatal at once.
/// With no candidate present, a default document is persisted at the first one.
pub fn resolve_config(
    explicit: Option<&Path>,
    locations: &[PathBuf],
) -> Result<ResolvedConfig, AptlyError> {
    let resolved = match explicit {
        Some(path) => {
            let config = load_config(path).map_err(|e| FatalError::from_error(&e))?;
            ResolvedConfig {
                config,
                source: ConfigSource::Explicit(path.to_path_buf()),
            }
        }
        None => resolve_from_locations(locations)?,
    };

    resolved.config.validate().map_err(|e| {
        FatalError::new(
            1,
            format!(
                "error loading config file {}: {}",
                resolved.source.path().display(),
                e
            ),
        )
    })?;

    debug!(source = ?resolved.source, "configuration resolved");
    Ok(resolved)
}

/// Load the first of `locations` that exists.
///
/// A missing file moves on to the next candidate; any other failure stops the
/// search. `None` means no candidate exists.
pub fn find_config(locations: &[PathBuf]) -> Result<Option<(PathBuf, AptlyConfig)>, ConfigError> {
    for location in locations {
        match load_config(location) {
            Ok(config) => return Ok(Some((location.clone(), config))),
            Err(e) if e.is_not_found() => {
                debug!(path = %location.display(), "config file not present, trying next");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(None)
}

fn resolve_from_locations(locations: &[PathBuf]) -> Result<ResolvedConfig, AptlyError> {
    match find_config(locations) {
        Ok(Some((location, config))) => {
            return Ok(ResolvedConfig {
                config,
                source: ConfigSource::File(location),
            })
        }
        Ok(None) => {}
        Err(e) => {
            let path = e.path().map(Path::to_path_buf).unwrap_or_default();
            return Err(FatalError::new(
                1,
                format!("error loading config file {}: {}", path.display(), e),
            )
            .into());
        }
    }

    let target = locations
        .first()
        .ok_or_else(|| FatalError::new(1, "no configuration locations to search"))?;

    println!(
        "Config file not found, creating default config at {}\n",
        target.display()
    );
    info!(path = %target.display(), "creating default configuration");

    let config = AptlyConfig::default();
    if let Err(e) = save_config(target, &config) {
        warn!(error = %e, "unable to persist default configuration");
    }

    Ok(ResolvedConfig {
        config,
        source: ConfigSource::Created(target.clone()),
    })
}
