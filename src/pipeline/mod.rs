//! The one-shot resolution pipeline.
//!
//! ```text
//! assets → settings → normalize → merge → persist → engine
//! ```
//!
//! Each stage runs once, in order, and any failure is terminal for the attempt.
//! [`EngineCell`] memoizes the outcome for the rest of the process.

pub mod cell;
pub mod state;

pub use cell::EngineCell;
pub use state::ResolutionState;

use crate::core::assets::{AssetFetcher, AssetHealer, AssetManifest, HttpFetcher};
use crate::core::config::{
    AssetLayout, ConfigLoader, MergePolicy, ParameterAssembler, PersistedConfigHandle,
    SchemaNormalizer, defaults,
};
use crate::core::errors::{MathOcrError, OcrResult};
use crate::core::traits::{EngineArgs, EngineFactory};
use crate::predictors::Recognizer;
use state::StateMachine;
use std::sync::Arc;
use tracing::info;

/// Output of a resolution that stopped after persisting.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub manifest: AssetManifest,
    pub handle: PersistedConfigHandle,
}

/// Resolves parameters for an asset layout and builds the engine.
pub struct Pipeline {
    layout: AssetLayout,
    fetcher: Arc<dyn AssetFetcher>,
}

impl Pipeline {
    /// Creates a pipeline that heals over HTTP with the layout's timeout.
    pub fn new(layout: AssetLayout) -> Self {
        let fetcher = Arc::new(HttpFetcher::new(layout.fetch_timeout));
        Self { layout, fetcher }
    }

    /// Replaces the remote fetcher.
    pub fn with_fetcher(mut self, fetcher: Arc<dyn AssetFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn layout(&self) -> &AssetLayout {
        &self.layout
    }

    /// Verifies (and heals) the assets without touching the settings.
    pub fn verify_assets(&self) -> OcrResult<AssetManifest> {
        AssetHealer::new(self.fetcher.as_ref()).verify(&self.layout)
    }

    /// Runs every stage up to and including persisting the resolved document.
    pub fn resolve(&self) -> OcrResult<Resolution> {
        self.resolve_traced().0
    }

    /// Like [`Pipeline::resolve`], also returning the states visited.
    pub fn resolve_traced(&self) -> (OcrResult<Resolution>, Vec<ResolutionState>) {
        let mut machine = StateMachine::new();
        let result = self.resolve_with(&mut machine);
        (result, machine.into_history())
    }

    /// Runs the full pipeline and builds the engine.
    pub fn run<F: EngineFactory>(&self, factory: &F) -> OcrResult<Recognizer<F::Engine>> {
        let mut machine = StateMachine::new();
        let resolution = self.resolve_with(&mut machine)?;
        let recognizer = machine.step(ResolutionState::EngineReady, || {
            Self::build_engine(resolution, factory)
        })?;
        info!(config = %recognizer.config_path().display(), "engine ready");
        Ok(recognizer)
    }

    fn resolve_with(&self, machine: &mut StateMachine) -> OcrResult<Resolution> {
        let manifest = machine.step(ResolutionState::AssetsVerified, || self.verify_assets())?;
        let raw = machine.step(ResolutionState::RawLoaded, || {
            ConfigLoader::load(self.layout.settings_path())
        })?;
        let normalized = machine.step(ResolutionState::Normalized, || {
            debug_assert!(manifest.is_intact());
            Ok(SchemaNormalizer::default().normalize(&raw, manifest.vocab_size))
        })?;
        let resolved = machine.step(ResolutionState::Merged, || {
            MergePolicy::merge(defaults(), normalized)
        })?;
        let handle = machine.step(ResolutionState::Persisted, || {
            ParameterAssembler::assemble(resolved, self.layout.resolved_path())
        })?;
        Ok(Resolution { manifest, handle })
    }

    fn build_engine<F: EngineFactory>(
        resolution: Resolution,
        factory: &F,
    ) -> OcrResult<Recognizer<F::Engine>> {
        let Resolution { manifest, handle } = resolution;
        // snapshot for diagnostics; the handle itself goes to the factory
        let parameters = handle
            .config()
            .to_yaml()
            .unwrap_or_else(|e| format!("<unrenderable: {e}>"));
        let config_path = handle.path().to_path_buf();
        let args = EngineArgs::new(manifest.weights.path, manifest.resizer.path, handle);
        let engine = factory
            .build(args)
            .map_err(|e| MathOcrError::engine_init(parameters, e))?;
        Ok(Recognizer::new(engine, config_path))
    }
}
