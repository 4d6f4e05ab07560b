use std::sync::Arc;

use crate::engine::MemoryService;
use crate::engine::errors::{PersistenceError, PlatformError};
use crate::engine::history::CleanHistory;
use crate::engine::preferences::PreferencesFile;
use crate::engine::reclaim::ReclaimEngine;
use crate::engine::sampler::{MemorySampler, SystemSampler};
use crate::logging::Diagnostics;
use crate::shared::config::Settings;

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error(transparent)]
    Platform(#[from] PlatformError),

    #[error("History log unavailable: {0}")]
    History(#[from] PersistenceError),
}

/// Everything a shell needs, assembled from settings.
#[derive(Clone)]
pub struct FrontendContext {
    pub settings: Settings,
    pub service: Arc<MemoryService>,
}

impl FrontendContext {
    /// Wires the host sampler and trimmer. Refuses to build off Windows.
    pub fn from_settings(settings: Settings) -> Result<Self, ContextError> {
        let diagnostics = Diagnostics::current();
        let sampler: Arc<dyn MemorySampler> =
            Arc::new(SystemSampler::new(diagnostics.clone()));
        let engine = ReclaimEngine::for_host(sampler, diagnostics.clone())?;
        Self::assemble(settings, engine, diagnostics)
    }

    /// Wires a caller-built engine, e.g. one with a scripted sampler.
    pub fn assemble(
        settings: Settings,
        engine: ReclaimEngine,
        diagnostics: Diagnostics,
    ) -> Result<Self, ContextError> {
        let history = CleanHistory::new(&settings.storage.history_path, diagnostics.clone())?;
        let preferences =
            PreferencesFile::new(&settings.storage.preferences_path, diagnostics.clone());
        let service = Arc::new(MemoryService::new(
            engine,
            history,
            preferences,
            diagnostics,
        ));
        Ok(Self { settings, service })
    }
}
