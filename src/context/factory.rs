//! Constructors for the context's fallible or side-effecting resources.

use crate::database::{SledStorage, Storage};
use crate::error::{DownloadError, StorageError};
use crate::http::{Downloader, HttpDownloader};
use crate::progress::{ConsoleProgress, Progress};
use std::path::Path;
use std::sync::Arc;

/// Builds the shared resources the execution context hands out.
///
/// The context decides when each is built and guarantees it happens at most once;
/// implementations only decide how.
pub trait ResourceFactory {
    fn progress(&self) -> Arc<dyn Progress>;

    fn downloader(
        &self,
        concurrency: usize,
        progress: Arc<dyn Progress>,
    ) -> Result<Arc<dyn Downloader>, DownloadError>;

    fn database(&self, path: &Path) -> Result<Arc<dyn Storage>, StorageError>;
}

/// Console progress, HTTP downloader and sled database
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardFactory;

impl ResourceFactory for StandardFactory {
    fn progress(&self) -> Arc<dyn Progress> {
        Arc::new(ConsoleProgress::new())
    }

    fn downloader(
        &self,
        concurrency: usize,
        progress: Arc<dyn Progress>,
    ) -> Result<Arc<dyn Downloader>, DownloadError> {
        Ok(Arc::new(HttpDownloader::new(concurrency, progress)?))
    }

    fn database(&self, path: &Path) -> Result<Arc<dyn Storage>, StorageError> {
        Ok(Arc::new(SledStorage::open(path)?))
    }
}
