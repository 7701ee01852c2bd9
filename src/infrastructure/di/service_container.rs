//! Service container for dependency injection
//!
//! Wires settings, the pipeline service and the registered backends together.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::services::PipelineService;
use crate::application::FileTypeResolver;
use crate::config::Settings;
use crate::domain::Tree;
use crate::infrastructure::traits::{Backend, MemoryBackend};
use crate::infrastructure::{InfraError, InfraResult};

/// Container holding the pipeline and one backend per format.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Load/save transform pipeline
    pub pipeline: PipelineService,

    resolver: FileTypeResolver,
    backends: BTreeMap<String, Arc<dyn Backend>>,
}

impl ServiceContainer {
    /// Create a container with in-memory backends for every configured profile.
    pub fn new(settings: Settings) -> InfraResult<Self> {
        let backends = settings
            .profiles
            .iter()
            .map(|(id, profile)| {
                Arc::new(MemoryBackend::with_profile(id.clone(), *profile)) as Arc<dyn Backend>
            })
            .collect();
        Self::with_backends(settings, backends)
    }

    /// Create a container with custom backends.
    ///
    /// Fails when a backend has no feature profile.
    pub fn with_backends(settings: Settings, backends: Vec<Arc<dyn Backend>>) -> InfraResult<Self> {
        let pipeline = PipelineService::new(settings.feature_table());
        let mut registered = BTreeMap::new();
        for backend in backends {
            pipeline.profile(backend.id())?;
            debug!("register backend: {}", backend.id());
            registered.insert(backend.id().to_string(), backend);
        }

        Ok(Self {
            resolver: FileTypeResolver::new(&settings.extensions),
            settings: Arc::new(settings),
            pipeline,
            backends: registered,
        })
    }

    /// Backend registered under `id`.
    pub fn backend(&self, id: &str) -> InfraResult<Arc<dyn Backend>> {
        self.backends
            .get(id)
            .cloned()
            .ok_or_else(|| InfraError::NoBackend(id.to_string()))
    }

    /// Read `path` and recover the in-memory tree.
    ///
    /// `file_type` overrides detection from the file extension.
    #[instrument(level = "debug", skip(self))]
    pub fn load_file(&self, path: &Path, file_type: Option<&str>) -> InfraResult<Tree> {
        let resolved = self.resolver.resolve(path, file_type)?;
        self.pipeline.profile(&resolved.backend)?;
        let backend = self.backend(&resolved.backend)?;
        let raw = backend.read(&resolved.path).map_err(InfraError::Backend)?;
        Ok(self.pipeline.load(&resolved.backend, raw)?)
    }

    /// Prepare `tree` for the format of `path` and write it.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn save_file(&self, path: &Path, file_type: Option<&str>, tree: &Tree) -> InfraResult<()> {
        let resolved = self.resolver.resolve(path, file_type)?;
        let raw = self.pipeline.save(&resolved.backend, tree)?;
        let backend = self.backend(&resolved.backend)?;
        backend.write(&resolved.path, &raw).map_err(InfraError::Backend)
    }
}
