//! Asset directory layout and healing policy.

use crate::core::constants::{
    DEFAULT_FETCH_TIMEOUT, RESIZER_FILE, RESOLVED_FILE, SETTINGS_FILE, VOCABULARY_FILE,
    VOCABULARY_URL, WEIGHTS_FILE,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where the pipeline finds its inputs and writes its output.
///
/// Relative file entries are resolved against `asset_dir`; absolute entries are
/// used as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetLayout {
    /// Directory holding all assets.
    pub asset_dir: PathBuf,

    /// Model weights checkpoint (required, never healed).
    #[serde(default = "AssetLayout::default_weights")]
    pub weights: PathBuf,

    /// Image resizer checkpoint (required, never healed).
    #[serde(default = "AssetLayout::default_resizer")]
    pub resizer: PathBuf,

    /// Vocabulary index (required, healed from `vocabulary_url`).
    #[serde(default = "AssetLayout::default_vocabulary")]
    pub vocabulary: PathBuf,

    /// User settings document (optional).
    #[serde(default = "AssetLayout::default_settings")]
    pub settings: PathBuf,

    /// Persisted resolved document.
    #[serde(default = "AssetLayout::default_resolved")]
    pub resolved: PathBuf,

    /// Known-good vocabulary source. `None` disables healing.
    #[serde(default = "AssetLayout::default_vocabulary_url")]
    pub vocabulary_url: Option<String>,

    /// Bound for the single healing fetch.
    #[serde(default = "AssetLayout::default_fetch_timeout")]
    pub fetch_timeout: Duration,
}

impl AssetLayout {
    /// Creates the default layout rooted at `asset_dir`.
    pub fn new(asset_dir: impl Into<PathBuf>) -> Self {
        Self {
            asset_dir: asset_dir.into(),
            weights: Self::default_weights(),
            resizer: Self::default_resizer(),
            vocabulary: Self::default_vocabulary(),
            settings: Self::default_settings(),
            resolved: Self::default_resolved(),
            vocabulary_url: Self::default_vocabulary_url(),
            fetch_timeout: Self::default_fetch_timeout(),
        }
    }

    pub fn with_weights(mut self, path: impl Into<PathBuf>) -> Self {
        self.weights = path.into();
        self
    }

    pub fn with_resizer(mut self, path: impl Into<PathBuf>) -> Self {
        self.resizer = path.into();
        self
    }

    pub fn with_vocabulary(mut self, path: impl Into<PathBuf>) -> Self {
        self.vocabulary = path.into();
        self
    }

    pub fn with_settings(mut self, path: impl Into<PathBuf>) -> Self {
        self.settings = path.into();
        self
    }

    pub fn with_resolved(mut self, path: impl Into<PathBuf>) -> Self {
        self.resolved = path.into();
        self
    }

    /// Sets the vocabulary source; `None` turns healing off.
    pub fn with_vocabulary_url(mut self, url: Option<String>) -> Self {
        self.vocabulary_url = url;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn weights_path(&self) -> PathBuf {
        self.resolve(&self.weights)
    }

    pub fn resizer_path(&self) -> PathBuf {
        self.resolve(&self.resizer)
    }

    pub fn vocabulary_path(&self) -> PathBuf {
        self.resolve(&self.vocabulary)
    }

    pub fn settings_path(&self) -> PathBuf {
        self.resolve(&self.settings)
    }

    pub fn resolved_path(&self) -> PathBuf {
        self.resolve(&self.resolved)
    }

    fn resolve(&self, entry: &Path) -> PathBuf {
        if entry.is_absolute() {
            entry.to_path_buf()
        } else {
            self.asset_dir.join(entry)
        }
    }

    fn default_weights() -> PathBuf {
        PathBuf::from(WEIGHTS_FILE)
    }

    fn default_resizer() -> PathBuf {
        PathBuf::from(RESIZER_FILE)
    }

    fn default_vocabulary() -> PathBuf {
        PathBuf::from(VOCABULARY_FILE)
    }

    fn default_settings() -> PathBuf {
        PathBuf::from(SETTINGS_FILE)
    }

    fn default_resolved() -> PathBuf {
        PathBuf::from(RESOLVED_FILE)
    }

    fn default_vocabulary_url() -> Option<String> {
        Some(VOCABULARY_URL.to_string())
    }

    fn default_fetch_timeout() -> Duration {
        DEFAULT_FETCH_TIMEOUT
    }
}

impl Default for AssetLayout {
    fn default() -> Self {
        Self::new("assets")
    }
}
