//! Execution context shared by every command of a run.
//!
//! The context resolves configuration on first use and builds each shared resource
//! lazily, at most once, together with whatever it depends on. It is the only owner
//! of those resources: handlers receive `Arc` handles and never release them.
//! [`Context::shutdown`] tears everything down in a fixed order.

mod factory;

pub use factory::{ResourceFactory, StandardFactory};

use crate::collection::CollectionFactory;
use crate::config::{config_locations, resolve_config, AptlyConfig, ConfigSource, ResolvedConfig};
use crate::database::Storage;
use crate::debug::{DebugOptions, Instrumentation, ENABLE_DEBUG};
use crate::error::{AptlyError, FatalError};
use crate::files::{PackagePool, PublishedStorage};
use crate::http::Downloader;
use crate::logging::ProfilerSlot;
use crate::options::{compose_dependency_options, resolve_architectures, DependencyFlags, DependencyOptions};
use crate::progress::Progress;
use once_cell::unsync::OnceCell;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Command-line values the context consumes
#[derive(Debug, Clone, Default)]
pub struct ContextFlags {
    /// Explicit configuration file; bypasses the fallback search
    pub config: Option<PathBuf>,
    pub dependency: DependencyFlags,
    /// Comma-separated architecture override
    pub architectures: Option<String>,
    pub debug: DebugOptions,
}

pub struct Context {
    flags: ContextFlags,
    factory: Box<dyn ResourceFactory>,
    config_locations: Option<Vec<PathBuf>>,

    config: OnceCell<ResolvedConfig>,
    dependency_options: OnceCell<DependencyOptions>,
    architectures: OnceCell<Vec<String>>,

    progress: OnceCell<Arc<dyn Progress>>,
    downloader: OnceCell<Arc<dyn Downloader>>,
    database: OnceCell<Arc<dyn Storage>>,
    collection_factory: OnceCell<Arc<CollectionFactory>>,
    package_pool: OnceCell<Arc<PackagePool>>,
    published_storage: OnceCell<Arc<PublishedStorage>>,

    instrumentation: Instrumentation,
}

impl Context {
    pub fn new(flags: ContextFlags, profiler: Option<&ProfilerSlot>) -> Result<Self, AptlyError> {
        Self::with_factory(flags, profiler, Box::new(StandardFactory))
    }

    /// Build a context whose resources come from `factory`.
    ///
    /// Requested diagnostics start here when instrumentation is compiled in; failing
    /// to open any of their outputs is fatal.
    pub fn with_factory(
        flags: ContextFlags,
        profiler: Option<&ProfilerSlot>,
        factory: Box<dyn ResourceFactory>,
    ) -> Result<Self, AptlyError> {
        let instrumentation = if ENABLE_DEBUG && !flags.debug.is_empty() {
            Instrumentation::start(&flags.debug, profiler)
                .map_err(|e| FatalError::from_error(&e))?
        } else {
            if !flags.debug.is_empty() {
                debug!("instrumentation not compiled in, ignoring profiling flags");
            }
            Instrumentation::default()
        };

        Ok(Self {
            flags,
            factory,
            config_locations: None,
            config: OnceCell::new(),
            dependency_options: OnceCell::new(),
            architectures: OnceCell::new(),
            progress: OnceCell::new(),
            downloader: OnceCell::new(),
            database: OnceCell::new(),
            collection_factory: OnceCell::new(),
            package_pool: OnceCell::new(),
            published_storage: OnceCell::new(),
            instrumentation,
        })
    }

    /// Search `locations` instead of the home and system configuration files.
    pub fn with_config_locations(mut self, locations: Vec<PathBuf>) -> Self {
        self.config_locations = Some(locations);
        self
    }

    pub fn flags(&self) -> &ContextFlags {
        &self.flags
    }

    pub fn is_instrumented(&self) -> bool {
        self.instrumentation.is_active()
    }

    #[instrument(name = "resolve_config", skip_all)]
    fn resolved(&self) -> Result<&ResolvedConfig, AptlyError> {
        self.config.get_or_try_init(|| match (&self.flags.config, &self.config_locations) {
            (Some(path), _) => resolve_config(Some(path.as_path()), &[]),
            (None, Some(locations)) => resolve_config(None, locations),
            (None, None) => resolve_config(None, &config_locations()?),
        })
    }

    /// The configuration document, loaded on first call.
    pub fn config(&self) -> Result<&AptlyConfig, AptlyError> {
        Ok(&self.resolved()?.config)
    }

    pub fn config_source(&self) -> Result<&ConfigSource, AptlyError> {
        Ok(&self.resolved()?.source)
    }

    #[instrument(skip_all)]
    pub fn dependency_options(&self) -> Result<DependencyOptions, AptlyError> {
        self.dependency_options
            .get_or_try_init(|| {
                Ok(compose_dependency_options(
                    self.config()?,
                    &self.flags.dependency,
                ))
            })
            .copied()
    }

    pub fn architectures(&self) -> Result<&[String], AptlyError> {
        let architectures = self.architectures.get_or_try_init(|| {
            Ok::<_, AptlyError>(resolve_architectures(
                self.config()?,
                self.flags.architectures.as_deref(),
            ))
        })?;
        Ok(architectures)
    }

    /// Shared progress reporter; started when first built.
    pub fn progress(&self) -> Arc<dyn Progress> {
        Arc::clone(self.progress.get_or_init(|| {
            let progress = self.factory.progress();
            progress.start();
            progress
        }))
    }

    #[instrument(name = "create_downloader", skip_all)]
    pub fn downloader(&self) -> Result<Arc<dyn Downloader>, AptlyError> {
        self.downloader
            .get_or_try_init(|| {
                let concurrency = self.config()?.download_concurrency;
                let progress = self.progress();
                debug!(concurrency, "creating downloader");
                Ok::<_, AptlyError>(self.factory.downloader(concurrency, progress)?)
            })
            .map(Arc::clone)
    }

    pub fn db_path(&self) -> Result<PathBuf, AptlyError> {
        Ok(self.config()?.db_path())
    }

    /// Open the database on first call. A failed open is returned to the caller and
    /// retried on the next call.
    #[instrument(name = "open_database", skip_all)]
    pub fn database(&self) -> Result<Arc<dyn Storage>, AptlyError> {
        self.database
            .get_or_try_init(|| {
                let path = self.db_path()?;
                debug!(path = %path.display(), "opening database");
                self.factory.database(&path).map_err(AptlyError::Database)
            })
            .map(Arc::clone)
    }

    /// Collections over the shared database. Nothing works without the database, so
    /// failing to open it here is fatal.
    #[instrument(skip_all)]
    pub fn collection_factory(&self) -> Result<Arc<CollectionFactory>, AptlyError> {
        self.collection_factory
            .get_or_try_init(|| {
                let db = self
                    .database()
                    .map_err(|e| AptlyError::from(FatalError::from_error(&e)))?;
                Ok::<_, AptlyError>(Arc::new(CollectionFactory::new(db)))
            })
            .map(Arc::clone)
    }

    #[instrument(skip_all)]
    pub fn package_pool(&self) -> Result<Arc<PackagePool>, AptlyError> {
        self.package_pool
            .get_or_try_init(|| Ok::<_, AptlyError>(Arc::new(PackagePool::new(&self.config()?.root_dir))))
            .map(Arc::clone)
    }

    #[instrument(skip_all)]
    pub fn published_storage(&self) -> Result<Arc<PublishedStorage>, AptlyError> {
        self.published_storage
            .get_or_try_init(|| {
                Ok::<_, AptlyError>(Arc::new(PublishedStorage::new(&self.config()?.root_dir)))
            })
            .map(Arc::clone)
    }

    /// Release everything that was built, in order: diagnostics, database,
    /// downloader, progress reporter.
    ///
    /// Resources never built are skipped. Every step runs even if an earlier one
    /// failed; the first error is returned. A second call does nothing.
    #[instrument(skip_all)]
    pub fn shutdown(&mut self) -> Result<(), AptlyError> {
        let mut first_error: Option<AptlyError> = None;

        if let Err(e) = self.instrumentation.shutdown() {
            warn!(error = %e, "failed to finish diagnostics");
            first_error.get_or_insert(e.into());
        }

        self.collection_factory.take();
        if let Some(db) = self.database.take() {
            if let Err(e) = db.close() {
                warn!(error = %e, "failed to close database");
                first_error.get_or_insert(e.into());
            }
        }

        if let Some(downloader) = self.downloader.take() {
            downloader.shutdown();
        }

        if let Some(progress) = self.progress.take() {
            progress.shutdown();
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            warn!(error = %e, "shutdown on drop failed");
        }
    }
}
