//! HTTP downloader
//!
//! Downloads run on a private multi-threaded `tokio` runtime owned by the downloader.
//! The number of transfers in flight is capped by `downloadConcurrency`, and every
//! received chunk advances the shared progress bar.

use crate::error::DownloadError;
use crate::progress::Progress;
use futures::StreamExt;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::runtime::{Handle, Runtime};
use tokio::sync::Semaphore;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// File downloader shared by all commands of a run
pub trait Downloader: Send + Sync {
    /// Fetch `url` into `destination`, returning the number of bytes written.
    fn download(&self, url: &str, destination: &Path) -> Result<u64, DownloadError>;

    /// Fetch several files concurrently; results are in input order.
    fn download_all(&self, requests: &[(String, PathBuf)]) -> Vec<Result<u64, DownloadError>>;

    /// Stop accepting work and release the worker threads.
    fn shutdown(&self);
}

/// `reqwest`-based downloader
pub struct HttpDownloader {
    runtime: Mutex<Option<Runtime>>,
    client: reqwest::Client,
    permits: Arc<Semaphore>,
    progress: Arc<dyn Progress>,
    concurrency: usize,
}

impl HttpDownloader {
    pub fn new(concurrency: usize, progress: Arc<dyn Progress>) -> Result<Self, DownloadError> {
        Self::with_client(concurrency, progress, reqwest::Client::new())
    }

    pub fn with_client(
        concurrency: usize,
        progress: Arc<dyn Progress>,
        client: reqwest::Client,
    ) -> Result<Self, DownloadError> {
        let concurrency = concurrency.max(1);
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(concurrency)
            .thread_name("aptly-download")
            .enable_all()
            .build()
            .map_err(DownloadError::Runtime)?;

        Ok(Self {
            runtime: Mutex::new(Some(runtime)),
            client,
            permits: Arc::new(Semaphore::new(concurrency)),
            progress,
            concurrency,
        })
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    fn handle(&self) -> Result<Handle, DownloadError> {
        self.runtime
            .lock()
            .as_ref()
            .map(|rt| rt.handle().clone())
            .ok_or(DownloadError::Shutdown)
    }

    #[tracing::instrument(name = "download", skip_all, fields(url = %url))]
    async fn fetch(
        client: reqwest::Client,
        permits: Arc<Semaphore>,
        progress: Arc<dyn Progress>,
        url: String,
        destination: PathBuf,
    ) -> Result<u64, DownloadError> {
        let _permit = permits
            .acquire_owned()
            .await
            .map_err(|_| DownloadError::Shutdown)?;

        let http_err = |source| DownloadError::Http {
            url: url.clone(),
            source,
        };
        let io_err = |source| DownloadError::Io {
            path: destination.clone(),
            source,
        };

        tracing::debug!(%url, "downloading");
        let response = client.get(&url).send().await.map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status {
                url: url.clone(),
                status: status.as_u16(),
            });
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let mut file = tokio::fs::File::create(&destination)
            .await
            .map_err(io_err)?;

        let mut written = 0u64;
        let mut body = response.bytes_stream();
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(http_err)?;
            file.write_all(&chunk).await.map_err(io_err)?;
            written += chunk.len() as u64;
            progress.add_bar(chunk.len() as u64);
        }
        file.flush().await.map_err(io_err)?;

        Ok(written)
    }
}

impl Downloader for HttpDownloader {
    fn download(&self, url: &str, destination: &Path) -> Result<u64, DownloadError> {
        let handle = self.handle()?;
        handle.block_on(Self::fetch(
            self.client.clone(),
            Arc::clone(&self.permits),
            Arc::clone(&self.progress),
            url.to_string(),
            destination.to_path_buf(),
        ))
    }

    fn download_all(&self, requests: &[(String, PathBuf)]) -> Vec<Result<u64, DownloadError>> {
        let handle = match self.handle() {
            Ok(handle) => handle,
            Err(_) => return requests.iter().map(|_| Err(DownloadError::Shutdown)).collect(),
        };

        let transfers = requests.iter().map(|(url, destination)| {
            let task = handle.spawn(Self::fetch(
                self.client.clone(),
                Arc::clone(&self.permits),
                Arc::clone(&self.progress),
                url.clone(),
                destination.clone(),
            ));
            async move { task.await.unwrap_or(Err(DownloadError::Shutdown)) }
        });

        handle.block_on(futures::future::join_all(transfers))
    }

    fn shutdown(&self) {
        self.permits.close();
        if let Some(runtime) = self.runtime.lock().take() {
            runtime.shutdown_timeout(SHUTDOWN_GRACE);
            tracing::debug!("downloader shut down");
        }
    }
}
