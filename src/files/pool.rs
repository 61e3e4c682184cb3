//! Package pool: package files stored by checksum under `<rootDir>/pool`.

use crate::error::StorageError;
use std::io::Read;
use std::path::{Path, PathBuf};

const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Content-addressed package file store
#[derive(Debug, Clone)]
pub struct PackagePool {
    root: PathBuf,
}

impl PackagePool {
    /// Pool rooted at `<root_dir>/pool`. Nothing is created until the first import.
    pub fn new(root_dir: &Path) -> Self {
        Self {
            root: root_dir.join("pool"),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<c[0..2]>/<c[2..4]>/<filename>` for a hex checksum.
    pub fn relative_path(&self, filename: &str, checksum: &str) -> Result<PathBuf, StorageError> {
        if checksum.len() < 4 || !checksum.is_ascii() {
            return Err(StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("checksum too short for pool layout: {:?}", checksum),
            )));
        }
        Ok(PathBuf::from(&checksum[0..2])
            .join(&checksum[2..4])
            .join(filename))
    }

    pub fn path(&self, filename: &str, checksum: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root.join(self.relative_path(filename, checksum)?))
    }

    /// Copy `source` into the pool and return its path relative to the pool root.
    /// Importing the same content twice is a no-op.
    pub fn import(&self, source: &Path) -> Result<PathBuf, StorageError> {
        let checksum = file_checksum(source)?;
        let filename = source
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                StorageError::IoError(std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("not a file name: {}", source.display()),
                ))
            })?;

        let relative = self.relative_path(filename, &checksum)?;
        let destination = self.root.join(&relative);
        if destination.exists() {
            return Ok(relative);
        }
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(source, &destination)?;
        tracing::debug!(file = %relative.display(), "imported into package pool");
        Ok(relative)
    }
}

/// Hex blake3 digest of a file's contents
pub fn file_checksum(path: &Path) -> Result<String, StorageError> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = blake3::Hasher::new();
    let mut buffer = vec![0u8; HASH_BUFFER_SIZE];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize().as_bytes()))
}
