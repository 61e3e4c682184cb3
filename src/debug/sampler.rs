//! Periodic memory statistics sampler.
//!
//! A background thread appends one tab-separated row per interval to the stats
//! file. Stopping sends an explicit signal and joins the thread before the file
//! is closed, so no row is written after [`MemStatsSampler::stop`] returns.

use super::alloc::HeapStats;
use crate::error::DebugError;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

pub const MEMSTATS_HEADER: &str = "# Time\tHeapSys\tHeapAlloc\tHeapIdle\tHeapReleased\n";

/// Background writer of heap statistics rows
pub struct MemStatsSampler {
    path: PathBuf,
    stop: Option<Sender<()>>,
    worker: Option<JoinHandle<std::io::Result<File>>>,
}

impl MemStatsSampler {
    /// Create the stats file, write the header and start sampling every `interval`.
    pub fn start<F>(path: &Path, interval: Duration, stats: F) -> Result<Self, DebugError>
    where
        F: Fn() -> HeapStats + Send + 'static,
    {
        let mut file = File::create(path).map_err(|source| DebugError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        file.write_all(MEMSTATS_HEADER.as_bytes())?;

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let worker = std::thread::Builder::new()
            .name("memstats".to_string())
            .spawn(move || -> std::io::Result<File> {
                let start = Instant::now();
                loop {
                    match stop_rx.try_recv() {
                        Ok(()) | Err(mpsc::TryRecvError::Disconnected) => break,
                        Err(mpsc::TryRecvError::Empty) => {}
                    }

                    let sample = stats();
                    writeln!(
                        file,
                        "{}\t{}\t{}\t{}\t{}",
                        start.elapsed().as_millis(),
                        sample.heap_sys,
                        sample.heap_alloc,
                        sample.heap_idle,
                        sample.heap_released
                    )?;

                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                Ok(file)
            })?;

        tracing::debug!(path = %path.display(), ?interval, "memory stats sampler started");
        Ok(Self {
            path: path.to_path_buf(),
            stop: Some(stop_tx),
            worker: Some(worker),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Signal the thread, wait for it to finish, then flush and close the file.
    /// Calling it again is a no-op.
    pub fn stop(&mut self) -> Result<(), DebugError> {
        if let Some(stop) = self.stop.take() {
            // The thread may already have exited on a write error.
            let _ = stop.send(());
        }
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        let file = worker
            .join()
            .map_err(|_| DebugError::Sampler("sampler thread panicked".to_string()))??;
        file.sync_all()?;
        tracing::debug!(path = %self.path.display(), "memory stats sampler stopped");
        Ok(())
    }
}

impl Drop for MemStatsSampler {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
