//! Seams to the external recognition engine.
//!
//! The engine itself is not part of this crate. It is built by an
//! [`EngineFactory`] from [`EngineArgs`] and used through [`FormulaEngine`].

use crate::core::config::{PersistedConfigHandle, ResolvedConfig};
use crate::core::errors::BoxError;
use image::RgbImage;
use std::path::{Path, PathBuf};

/// A constructed formula recognition engine.
pub trait FormulaEngine: Send + Sync {
    /// Returns the LaTeX source for a formula image.
    fn recognize(&self, image: &RgbImage) -> Result<String, BoxError>;
}

/// Builds the engine from resolved parameters.
///
/// Called at most once per successful resolution, after the resolved document
/// has been written.
pub trait EngineFactory: Send + Sync {
    type Engine: FormulaEngine;

    fn build(&self, args: EngineArgs) -> Result<Self::Engine, BoxError>;
}

/// Everything the engine receives.
///
/// The factory takes ownership; the pipeline keeps no reference to the
/// resolved parameters once the engine is ready.
#[derive(Debug, Clone)]
pub struct EngineArgs {
    /// Model weights checkpoint.
    pub checkpoint: PathBuf,
    /// Image resizer checkpoint.
    pub resizer: PathBuf,
    /// Persisted resolved document; the engine may re-read it.
    pub config: PersistedConfigHandle,
    pub no_cuda: bool,
    pub no_gui: bool,
}

impl EngineArgs {
    pub fn new(checkpoint: PathBuf, resizer: PathBuf, config: PersistedConfigHandle) -> Self {
        Self {
            checkpoint,
            resizer,
            config,
            no_cuda: true,
            no_gui: true,
        }
    }

    pub fn parameters(&self) -> &ResolvedConfig {
        self.config.config()
    }

    pub fn config_path(&self) -> &Path {
        self.config.path()
    }
}
