//! CPU and heap profiles.

use super::alloc::{heap_stats, HeapStats};
use crate::error::DebugError;
use crate::logging::{ProfilerLayer, ProfilerSlot};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_flame::FlushGuard;

/// Span-timing profile recorded in folded-stack format (flamegraph input).
///
/// Every span entered on any thread while recording contributes a line of the
/// form `all-threads; <outer>; <inner> <nanoseconds>`.
///
/// Recording starts when the profile is created and ends with [`CpuProfile::stop`];
/// a stopped profile cannot be restarted.
pub struct CpuProfile {
    path: PathBuf,
    slot: ProfilerSlot,
    guard: Option<FlushGuard<BufWriter<File>>>,
}

impl CpuProfile {
    pub fn start(path: &Path, slot: &ProfilerSlot) -> Result<Self, DebugError> {
        let (layer, guard) = ProfilerLayer::with_file(path).map_err(|e| {
            DebugError::Profiler(format!("can't create {}: {}", path.display(), e))
        })?;
        let layer = layer
            .with_threads_collapsed(true)
            .with_module_path(false)
            .with_file_and_line(false);
        slot.attach(layer)?;
        tracing::debug!(path = %path.display(), "CPU profile recording");

        Ok(Self {
            path: path.to_path_buf(),
            slot: slot.clone(),
            guard: Some(guard),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_recording(&self) -> bool {
        self.guard.is_some()
    }

    /// Stop recording, flush and close the profile file.
    pub fn stop(&mut self) -> Result<(), DebugError> {
        let Some(guard) = self.guard.take() else {
            return Ok(());
        };
        let detached = self.slot.detach();
        let flushed = guard
            .flush()
            .map_err(|e| DebugError::Profiler(format!("can't write {}: {}", self.path.display(), e)));
        drop(guard);
        detached?;
        flushed
    }
}

impl Drop for CpuProfile {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

/// Heap snapshot written once, when the run ends.
pub struct HeapProfile {
    path: PathBuf,
    file: Option<File>,
}

impl HeapProfile {
    /// Create the output file now so a bad path is reported before any work runs.
    pub fn create(path: &Path) -> Result<Self, DebugError> {
        let file = File::create(path).map_err(|source| DebugError::Create {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            file: Some(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_captured(&self) -> bool {
        self.file.is_none()
    }

    /// Write the current allocator counters and close the file. Later calls do nothing.
    pub fn write_snapshot(&mut self) -> Result<(), DebugError> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };
        let mut out = BufWriter::new(file);
        write_heap_snapshot(&mut out, &heap_stats())?;
        out.flush()?;
        out.get_ref().sync_all()?;
        Ok(())
    }
}

fn write_heap_snapshot(out: &mut impl Write, stats: &HeapStats) -> std::io::Result<()> {
    writeln!(out, "# heap profile")?;
    writeln!(out, "# captured_at: {}", chrono::Utc::now().to_rfc3339())?;
    writeln!(out, "heap_sys: {}", stats.heap_sys)?;
    writeln!(out, "heap_alloc: {}", stats.heap_alloc)?;
    writeln!(out, "heap_idle: {}", stats.heap_idle)?;
    writeln!(out, "heap_released: {}", stats.heap_released)?;
    writeln!(out, "allocations: {}", stats.allocations)?;
    writeln!(out, "deallocations: {}", stats.deallocations)
}
