//! Published repository tree under `<rootDir>/public`.

use crate::error::StorageError;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// Filesystem location that published repositories are written to
#[derive(Debug, Clone)]
pub struct PublishedStorage {
    root: PathBuf,
}

impl PublishedStorage {
    pub fn new(root_dir: &Path) -> Self {
        Self {
            root: root_dir.join("public"),
        }
    }

    pub fn public_path(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &Path) -> Result<PathBuf, StorageError> {
        let escapes = path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)));
        if escapes {
            return Err(StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("path outside published storage: {}", path.display()),
            )));
        }
        Ok(self.root.join(path))
    }

    pub fn mkdir(&self, path: &Path) -> Result<(), StorageError> {
        std::fs::create_dir_all(self.resolve(path)?)?;
        Ok(())
    }

    /// Copy `source` to `path` inside the published tree.
    pub fn put_file(&self, path: &Path, source: &Path) -> Result<(), StorageError> {
        let destination = self.resolve(path)?;
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(source, destination)?;
        Ok(())
    }

    pub fn remove(&self, path: &Path) -> Result<(), StorageError> {
        std::fs::remove_file(self.resolve(path)?)?;
        Ok(())
    }

    /// Remove a directory and everything below it. Missing directories are ignored.
    pub fn remove_dirs(&self, path: &Path) -> Result<(), StorageError> {
        match std::fs::remove_dir_all(self.resolve(path)?) {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    /// Files below `prefix`, relative to it, sorted.
    pub fn list(&self, prefix: &Path) -> Result<Vec<PathBuf>, StorageError> {
        let base = self.resolve(prefix)?;
        if !base.exists() {
            return Ok(Vec::new());
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&base).sort_by_file_name() {
            let entry = entry.map_err(|e| StorageError::IoError(e.into()))?;
            if entry.file_type().is_file() {
                if let Ok(relative) = entry.path().strip_prefix(&base) {
                    files.push(relative.to_path_buf());
                }
            }
        }
        Ok(files)
    }
}
