//! Diagnostic instrumentation: CPU profile, heap profile and a periodic
//! memory statistics sampler.
//!
//! Compiled in always, honored by the execution context only when the crate is
//! built with the `debug` feature (see [`ENABLE_DEBUG`]).

use crate::error::DebugError;
use crate::logging::ProfilerSlot;
use std::path::PathBuf;
use std::time::Duration;

mod alloc;
mod profile;
mod sampler;

pub use alloc::{heap_stats, CountingAllocator, HeapStats};
pub use profile::{CpuProfile, HeapProfile};
pub use sampler::{MemStatsSampler, MEMSTATS_HEADER};

/// Build-time switch for diagnostic instrumentation.
pub const ENABLE_DEBUG: bool = cfg!(feature = "debug");

/// Default pause between memory statistics samples.
pub const DEFAULT_MEM_INTERVAL: Duration = Duration::from_millis(100);

/// Requested diagnostics; every feature is off unless its path is set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugOptions {
    pub cpu_profile: Option<PathBuf>,
    pub mem_profile: Option<PathBuf>,
    pub mem_stats: Option<PathBuf>,
    pub mem_interval: Option<Duration>,
}

impl DebugOptions {
    pub fn is_empty(&self) -> bool {
        self.cpu_profile.is_none() && self.mem_profile.is_none() && self.mem_stats.is_none()
    }
}

/// Running diagnostics owned by the execution context
#[derive(Default)]
pub struct Instrumentation {
    cpu_profile: Option<CpuProfile>,
    heap_profile: Option<HeapProfile>,
    mem_stats: Option<MemStatsSampler>,
}

impl Instrumentation {
    /// Open every requested output and start recording.
    ///
    /// Any failure is returned immediately; whatever was already started is
    /// released when the partial value is dropped.
    pub fn start(options: &DebugOptions, slot: Option<&ProfilerSlot>) -> Result<Self, DebugError> {
        let mut instrumentation = Self::default();

        if let Some(path) = &options.cpu_profile {
            let slot = slot.ok_or_else(|| {
                DebugError::Profiler("CPU profiling requires the logging subscriber".to_string())
            })?;
            instrumentation.cpu_profile = Some(CpuProfile::start(path, slot)?);
        }

        if let Some(path) = &options.mem_profile {
            instrumentation.heap_profile = Some(HeapProfile::create(path)?);
        }

        if let Some(path) = &options.mem_stats {
            let interval = options.mem_interval.unwrap_or(DEFAULT_MEM_INTERVAL);
            instrumentation.mem_stats = Some(MemStatsSampler::start(path, interval, heap_stats)?);
        }

        Ok(instrumentation)
    }

    pub fn is_active(&self) -> bool {
        self.cpu_profile.is_some() || self.heap_profile.is_some() || self.mem_stats.is_some()
    }

    pub fn is_sampling(&self) -> bool {
        self.mem_stats
            .as_ref()
            .map(MemStatsSampler::is_running)
            .unwrap_or(false)
    }

    /// Heap snapshot, then CPU profile, then the stats sampler. Every step runs even
    /// if an earlier one failed; the first error is returned.
    pub fn shutdown(&mut self) -> Result<(), DebugError> {
        let mut first_error = None;

        if let Some(mut heap) = self.heap_profile.take() {
            if let Err(e) = heap.write_snapshot() {
                first_error.get_or_insert(e);
            }
        }
        if let Some(mut cpu) = self.cpu_profile.take() {
            if let Err(e) = cpu.stop() {
                first_error.get_or_insert(e);
            }
        }
        if let Some(mut sampler) = self.mem_stats.take() {
            if let Err(e) = sampler.stop() {
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
