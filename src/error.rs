//! Error types for the aptly command execution context.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("can't read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("can't parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("can't write {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unable to determine home directory")]
    Home,

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// True when the failure only means the file is absent, so a fallback
    /// location may still be tried.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::NotFound { .. })
    }

    /// File the failure refers to, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::NotFound { path }
            | ConfigError::Io { path, .. }
            | ConfigError::Parse { path, .. }
            | ConfigError::Save { path, .. } => Some(path),
            ConfigError::Home | ConfigError::Invalid(_) => None,
        }
    }
}

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: sled::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] sled::Error),

    #[error("encoding error: {0}")]
    Codec(#[from] bincode::Error),

    #[error("key not found: {0}")]
    NotFound(String),

    #[error("storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Download errors
#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP code {status} while fetching {url}")]
    Status { url: String, status: u16 },

    #[error("can't write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("downloader is shut down")]
    Shutdown,

    #[error("failed to start download runtime: {0}")]
    Runtime(std::io::Error),
}

/// Diagnostic instrumentation errors
#[derive(Debug, Error)]
pub enum DebugError {
    #[error("can't create {}: {source}", path.display())]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("profiler error: {0}")]
    Profiler(String),

    #[error("memory stats sampler failed: {0}")]
    Sampler(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Structured unrecoverable failure: a message plus the process exit code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct FatalError {
    pub return_code: i32,
    pub message: String,
}

impl FatalError {
    pub fn new(return_code: i32, message: impl Into<String>) -> Self {
        Self {
            return_code,
            message: message.into(),
        }
    }

    /// Fatal error with the default exit code of 1.
    pub fn from_error(err: &dyn std::error::Error) -> Self {
        Self::new(1, err.to_string())
    }
}

/// Top-level error surfaced to command handlers
#[derive(Debug, Error)]
pub enum AptlyError {
    #[error(transparent)]
    Fatal(#[from] FatalError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("can't open database: {0}")]
    Database(#[source] StorageError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Download(#[from] DownloadError),

    #[error(transparent)]
    Instrumentation(#[from] DebugError),

    #[error("logging setup failed: {0}")]
    Logging(String),

    #[error("{0}")]
    Command(String),
}

impl AptlyError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            AptlyError::Fatal(fatal) => fatal.return_code,
            _ => 1,
        }
    }
}
