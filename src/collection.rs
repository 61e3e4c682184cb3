//! Typed collections over the shared database.
//!
//! Every collection is a key-prefix view of the one [`Storage`] handle owned by the
//! execution context. Records are encoded with `bincode`.

use crate::database::Storage;
use crate::error::StorageError;
use chrono::{DateTime, Utc};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::sync::Arc;

/// A value stored in a collection under a unique name.
pub trait Record: Serialize + DeserializeOwned {
    /// Key prefix shared by all records of this kind.
    const PREFIX: &'static str;

    fn name(&self) -> &str;
}

/// Local package repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalRepo {
    pub name: String,
    pub comment: String,
    pub default_distribution: String,
    pub default_component: String,
    pub created_at: DateTime<Utc>,
}

impl LocalRepo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            comment: String::new(),
            default_distribution: String::new(),
            default_component: "main".to_string(),
            created_at: Utc::now(),
        }
    }
}

impl Record for LocalRepo {
    const PREFIX: &'static str = "L";

    fn name(&self) -> &str {
        &self.name
    }
}

/// Immutable snapshot of a repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub name: String,
    pub description: String,
    pub source_repos: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for Snapshot {
    const PREFIX: &'static str = "S";

    fn name(&self) -> &str {
        &self.name
    }
}

/// Records of one kind, keyed `<PREFIX><name>`.
pub struct Collection<T: Record> {
    db: Arc<dyn Storage>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> Collection<T> {
    fn new(db: Arc<dyn Storage>) -> Self {
        Self {
            db,
            _record: PhantomData,
        }
    }

    fn key(name: &str) -> Vec<u8> {
        format!("{}{}", T::PREFIX, name).into_bytes()
    }

    pub fn by_name(&self, name: &str) -> Result<T, StorageError> {
        self.find(name)?
            .ok_or_else(|| StorageError::NotFound(name.to_string()))
    }

    pub fn find(&self, name: &str) -> Result<Option<T>, StorageError> {
        match self.db.get(&Self::key(name))? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Insert or replace a record.
    #[tracing::instrument(name = "collection_put", skip_all, fields(name = record.name()))]
    pub fn put(&self, record: &T) -> Result<(), StorageError> {
        let value = bincode::serialize(record)?;
        self.db.put(&Self::key(record.name()), &value)
    }

    pub fn drop_record(&self, name: &str) -> Result<(), StorageError> {
        if self.find(name)?.is_none() {
            return Err(StorageError::NotFound(name.to_string()));
        }
        self.db.delete(&Self::key(name))
    }

    /// All records, ordered by name.
    #[tracing::instrument(name = "collection_list", skip_all, fields(prefix = T::PREFIX))]
    pub fn list(&self) -> Result<Vec<T>, StorageError> {
        let mut records = Vec::new();
        for key in self.db.keys_with_prefix(T::PREFIX.as_bytes())? {
            if let Some(bytes) = self.db.get(&key)? {
                records.push(bincode::deserialize(&bytes)?);
            }
        }
        Ok(records)
    }

    pub fn len(&self) -> Result<usize, StorageError> {
        Ok(self.db.keys_with_prefix(T::PREFIX.as_bytes())?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StorageError> {
        Ok(self.len()? == 0)
    }
}

/// Hands out collections sharing one database handle; each is created on first use.
pub struct CollectionFactory {
    db: Arc<dyn Storage>,
    local_repos: OnceCell<Collection<LocalRepo>>,
    snapshots: OnceCell<Collection<Snapshot>>,
}

impl CollectionFactory {
    pub fn new(db: Arc<dyn Storage>) -> Self {
        Self {
            db,
            local_repos: OnceCell::new(),
            snapshots: OnceCell::new(),
        }
    }

    pub fn local_repos(&self) -> &Collection<LocalRepo> {
        self.local_repos
            .get_or_init(|| Collection::new(Arc::clone(&self.db)))
    }

    pub fn snapshots(&self) -> &Collection<Snapshot> {
        self.snapshots
            .get_or_init(|| Collection::new(Arc::clone(&self.db)))
    }
}
