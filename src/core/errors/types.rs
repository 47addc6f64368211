//! Core error types for the resolution pipeline.
//!
//! This module defines the error taxonomy used from asset verification through
//! engine construction and prediction, together with the [`FailureKind`] tag
//! that callers and the pipeline state machine use to classify a failure.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Boxed error returned by external collaborators (fetchers, engine factories, engines).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Classification of a [`MathOcrError`].
///
/// Every variant except [`FailureKind::Prediction`] is fatal: it aborts the
/// resolution attempt and no engine is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// A required asset is absent and cannot be repaired.
    AssetMissing,
    /// An asset is present but invalid and no remote source was available.
    AssetCorrupted,
    /// A repair attempt ran and did not restore a valid asset.
    HealFailed,
    /// The settings document exists but could not be parsed.
    ConfigParse,
    /// The merged parameters could not be turned into a typed config.
    InvalidParameters,
    /// Writing the resolved document failed.
    Persist,
    /// Reading a file failed for a reason other than absence.
    Io,
    /// The external engine factory rejected the resolved parameters.
    EngineInit,
    /// A single prediction call failed.
    Prediction,
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::AssetMissing => write!(f, "asset missing"),
            FailureKind::AssetCorrupted => write!(f, "asset corrupted"),
            FailureKind::HealFailed => write!(f, "heal failed"),
            FailureKind::ConfigParse => write!(f, "config parse"),
            FailureKind::InvalidParameters => write!(f, "invalid parameters"),
            FailureKind::Persist => write!(f, "persist"),
            FailureKind::Io => write!(f, "io"),
            FailureKind::EngineInit => write!(f, "engine init"),
            FailureKind::Prediction => write!(f, "prediction"),
        }
    }
}

/// Errors raised by the resolution pipeline and the recognizer.
#[derive(Error, Debug)]
pub enum MathOcrError {
    /// A required asset does not exist.
    #[error("required asset '{asset}' not found at '{}'{suggestion}", .path.display())]
    AssetMissing {
        /// Logical asset name (e.g. "weights").
        asset: String,
        /// Expected location.
        path: PathBuf,
        /// Optional recovery hint (prefixed with '; ' when present).
        suggestion: String,
    },

    /// An asset exists but failed its integrity check and cannot be repaired.
    #[error("asset '{asset}' at '{}' is corrupted: {reason}", .path.display())]
    AssetCorrupted {
        /// Logical asset name.
        asset: String,
        /// Location of the corrupted file.
        path: PathBuf,
        /// What the integrity check rejected.
        reason: String,
    },

    /// A repair was attempted and the asset is still unusable.
    #[error("healing asset '{asset}' at '{}' from '{url}' failed: {reason}", .path.display())]
    HealFailed {
        /// Logical asset name.
        asset: String,
        /// Location that was being repaired.
        path: PathBuf,
        /// Remote source the replacement was fetched from.
        url: String,
        /// Short reason string.
        reason: String,
        /// Underlying fetch or I/O error, when there is one.
        #[source]
        source: Option<BoxError>,
    },

    /// The settings document is present but malformed.
    #[error("settings document '{}' could not be parsed: {reason}", .path.display())]
    ConfigParse {
        /// Location of the settings document.
        path: PathBuf,
        /// Short reason string.
        reason: String,
        /// Underlying YAML error, when there is one.
        #[source]
        source: Option<serde_yaml::Error>,
    },

    /// The merged parameter set does not form a valid typed config.
    #[error("invalid parameters: {message}")]
    InvalidParameters {
        /// A message describing the structural problem.
        message: String,
        /// Underlying (de)serialization error.
        #[source]
        source: Option<serde_yaml::Error>,
    },

    /// Writing the resolved document failed.
    #[error("persisting resolved config to '{}' failed", .path.display())]
    Persist {
        /// Target location.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// IO error with context.
    #[error("io: {context}")]
    Io {
        /// What was being done when the error occurred.
        context: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The engine factory failed to construct an engine.
    #[error("engine initialization failed; resolved parameters:\n{parameters}")]
    EngineInit {
        /// The full resolved parameter set, rendered as YAML.
        parameters: String,
        /// The factory's error.
        #[source]
        source: BoxError,
    },

    /// A prediction call failed.
    #[error("prediction failed: {context}")]
    Prediction {
        /// Additional context about the failure.
        context: String,
        /// The engine's error, when there is one.
        #[source]
        source: Option<BoxError>,
    },
}

impl MathOcrError {
    /// Returns the classification of this error.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::AssetMissing { .. } => FailureKind::AssetMissing,
            Self::AssetCorrupted { .. } => FailureKind::AssetCorrupted,
            Self::HealFailed { .. } => FailureKind::HealFailed,
            Self::ConfigParse { .. } => FailureKind::ConfigParse,
            Self::InvalidParameters { .. } => FailureKind::InvalidParameters,
            Self::Persist { .. } => FailureKind::Persist,
            Self::Io { .. } => FailureKind::Io,
            Self::EngineInit { .. } => FailureKind::EngineInit,
            Self::Prediction { .. } => FailureKind::Prediction,
        }
    }

    /// Whether this error must abort startup.
    pub fn is_fatal(&self) -> bool {
        self.kind() != FailureKind::Prediction
    }

    /// Creates an error for a missing required asset.
    ///
    /// # Arguments
    ///
    /// * `asset` - Logical asset name
    /// * `path` - Expected location
    /// * `suggestion` - Optional hint for how to recover
    pub fn asset_missing(
        asset: impl Into<String>,
        path: impl AsRef<Path>,
        suggestion: Option<&str>,
    ) -> Self {
        Self::AssetMissing {
            asset: asset.into(),
            path: path.as_ref().to_path_buf(),
            suggestion: suggestion.map(|s| format!("; {s}")).unwrap_or_default(),
        }
    }

    /// Creates an error for an asset that failed its integrity check.
    pub fn asset_corrupted(
        asset: impl Into<String>,
        path: impl AsRef<Path>,
        reason: impl Into<String>,
    ) -> Self {
        Self::AssetCorrupted {
            asset: asset.into(),
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
        }
    }

    /// Creates an error for a failed repair attempt.
    pub fn heal_failed(
        asset: impl Into<String>,
        path: impl AsRef<Path>,
        url: impl Into<String>,
        reason: impl Into<String>,
        source: Option<BoxError>,
    ) -> Self {
        Self::HealFailed {
            asset: asset.into(),
            path: path.as_ref().to_path_buf(),
            url: url.into(),
            reason: reason.into(),
            source,
        }
    }

    /// Creates a settings parse error.
    pub fn config_parse(
        path: impl AsRef<Path>,
        reason: impl Into<String>,
        source: Option<serde_yaml::Error>,
    ) -> Self {
        Self::ConfigParse {
            path: path.as_ref().to_path_buf(),
            reason: reason.into(),
            source,
        }
    }

    /// Creates an invalid parameters error.
    pub fn invalid_parameters(
        message: impl Into<String>,
        source: Option<serde_yaml::Error>,
    ) -> Self {
        Self::InvalidParameters {
            message: message.into(),
            source,
        }
    }

    /// Creates an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Wraps an engine factory failure together with the parameters it was given.
    pub fn engine_init(parameters: impl Into<String>, source: BoxError) -> Self {
        Self::EngineInit {
            parameters: parameters.into(),
            source,
        }
    }

    /// Creates a prediction error.
    pub fn prediction(context: impl Into<String>, source: Option<BoxError>) -> Self {
        Self::Prediction {
            context: context.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_missing_suggestion_formatting() {
        let err = MathOcrError::asset_missing("weights", "assets/weights.pth", Some("run git lfs pull"));
        assert_eq!(
            err.to_string(),
            "required asset 'weights' not found at 'assets/weights.pth'; run git lfs pull"
        );

        let err = MathOcrError::asset_missing("resizer", "assets/resizer.pth", None);
        assert_eq!(
            err.to_string(),
            "required asset 'resizer' not found at 'assets/resizer.pth'"
        );
    }

    #[test]
    fn test_kind_and_fatality() {
        let err = MathOcrError::prediction("empty image", None);
        assert_eq!(err.kind(), FailureKind::Prediction);
        assert!(!err.is_fatal());

        let err = MathOcrError::config_parse("settings.yaml", "not a mapping", None);
        assert_eq!(err.kind(), FailureKind::ConfigParse);
        assert!(err.is_fatal());
    }

    #[test]
    fn test_engine_init_carries_parameters() {
        let err = MathOcrError::engine_init("heads: 8\n", "unexpected keyword".into());
        assert_eq!(err.kind(), FailureKind::EngineInit);
        assert!(err.to_string().contains("heads: 8"));
    }
}
