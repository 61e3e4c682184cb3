//! Persistent key-value database
//!
//! The database is opened once per command run by the execution context and
//! shared by every collection. The engine is `sled`.

use crate::error::StorageError;
use std::path::{Path, PathBuf};

/// Key-value storage interface used by collections
pub trait Storage: Send + Sync {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError>;
    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError>;
    fn delete(&self, key: &[u8]) -> Result<(), StorageError>;

    /// All keys starting with `prefix`, in key order.
    fn keys_with_prefix(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>, StorageError>;

    /// Flush all pending writes to disk.
    fn flush(&self) -> Result<(), StorageError>;

    /// Flush and mark the database as no longer in use by its owner.
    fn close(&self) -> Result<(), StorageError>;
}

/// Sled-based implementation of [`Storage`]
pub struct SledStorage {
    db: sled::Db,
    path: PathBuf,
}

impl SledStorage {
    /// Open (or create) the database at `path`.
    ///
    /// Fails when the location is unusable, when another process holds the
    /// database lock, or when the files are corrupted.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref().to_path_buf();
        let db = sled::open(&path).map_err(|source| StorageError::Open {
            path: path.clone(),
            source,
        })?;
        Ok(Self { db, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the underlying sled database (for advanced operations)
    pub fn db(&self) -> &sled::Db {
        &self.db
    }
}

impl Storage for SledStorage {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.db.get(key)?.map(|value| value.to_vec()))
    }

    fn put(&self, key: &[u8], value: &[u8]) -> Result<(), StorageError> {
        self.db.insert(key, value)?;
        Ok(())
    }

    fn delete(&self, key: &[u8]) -> Result<(), StorageError> {
        self.db.remove(key)?;
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>, StorageError> {
        self.db
            .scan_prefix(prefix)
            .keys()
            .map(|key| key.map(|k| k.to_vec()).map_err(StorageError::from))
            .collect()
    }

    fn flush(&self) -> Result<(), StorageError> {
        self.db.flush()?;
        Ok(())
    }

    fn close(&self) -> Result<(), StorageError> {
        self.flush()?;
        tracing::debug!(path = %self.path.display(), "database closed");
        Ok(())
    }
}
