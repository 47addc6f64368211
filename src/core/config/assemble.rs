//! Persisting the resolved config for the engine.

use super::resolved::ResolvedConfig;
use crate::core::errors::{MathOcrError, OcrResult};
use crate::utils::write_atomic;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// On-disk location of a resolved config together with the in-memory value.
///
/// The file is written before the handle exists, so any holder of a handle may
/// re-read the document.
#[derive(Debug, Clone)]
pub struct PersistedConfigHandle {
    path: PathBuf,
    config: Arc<ResolvedConfig>,
}

impl PersistedConfigHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn shared_config(&self) -> Arc<ResolvedConfig> {
        Arc::clone(&self.config)
    }

    /// Re-reads the persisted document.
    pub fn reload(&self) -> OcrResult<ResolvedConfig> {
        ResolvedConfig::from_file(&self.path)
    }
}

/// Writes resolved configs in the settings document format.
pub struct ParameterAssembler;

impl ParameterAssembler {
    pub fn assemble(resolved: ResolvedConfig, target: impl AsRef<Path>) -> OcrResult<PersistedConfigHandle> {
        let target = target.as_ref();
        let document = resolved.to_yaml()?;
        write_atomic(target, document.as_bytes()).map_err(|source| MathOcrError::Persist {
            path: target.to_path_buf(),
            source,
        })?;
        info!(path = %target.display(), "persisted resolved config");
        Ok(PersistedConfigHandle {
            path: target.to_path_buf(),
            config: Arc::new(resolved),
        })
    }
}
