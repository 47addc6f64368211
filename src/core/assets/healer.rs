//! Asset verification and one-shot repair.

use super::fetch::AssetFetcher;
use super::integrity::{Integrity, IntegrityCheck, VocabularyIntegrity, vocabulary_size};
use crate::core::config::AssetLayout;
use crate::core::constants::LARGE_FILE_HINT;
use crate::core::errors::{MathOcrError, OcrResult};
use crate::utils::write_atomic;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Result of [`AssetHealer::ensure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    /// Already valid; no network access happened.
    Intact,
    /// Replaced by the remote copy and now valid.
    Healed,
}

/// Role of a required asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetRole {
    Weights,
    Resizer,
    Vocabulary,
}

impl std::fmt::Display for AssetRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetRole::Weights => write!(f, "weights"),
            AssetRole::Resizer => write!(f, "resizer"),
            AssetRole::Vocabulary => write!(f, "vocabulary"),
        }
    }
}

/// Verification state of one asset.
#[derive(Debug, Clone, Serialize)]
pub struct AssetRecord {
    pub role: AssetRole,
    pub path: PathBuf,
    pub exists: bool,
    pub intact: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AssetStatus>,
}

/// Every required asset, verified.
///
/// Only [`AssetHealer::verify`] builds a manifest, and it fails instead of
/// returning one with a missing or damaged asset.
#[derive(Debug, Clone, Serialize)]
pub struct AssetManifest {
    pub weights: AssetRecord,
    pub resizer: AssetRecord,
    pub vocabulary: AssetRecord,
    /// Entry count of the (healed) vocabulary index.
    pub vocab_size: usize,
}

impl AssetManifest {
    pub fn records(&self) -> [&AssetRecord; 3] {
        [&self.weights, &self.resizer, &self.vocabulary]
    }

    pub fn is_intact(&self) -> bool {
        self.records().iter().all(|record| record.exists && record.intact)
    }
}

/// Verifies assets and repairs the vocabulary index from a remote source.
pub struct AssetHealer<'a> {
    fetcher: &'a dyn AssetFetcher,
}

impl<'a> AssetHealer<'a> {
    pub fn new(fetcher: &'a dyn AssetFetcher) -> Self {
        Self { fetcher }
    }

    /// Makes sure the artifact at `path` passes `check`.
    ///
    /// A missing or rejected artifact is fetched from `remote` exactly once,
    /// written over `path` and checked again. Without a remote source the
    /// artifact cannot be repaired and the call fails.
    pub fn ensure(
        &self,
        path: &Path,
        check: &dyn IntegrityCheck,
        remote: Option<&str>,
    ) -> OcrResult<AssetStatus> {
        let asset = check.asset_name();
        let before = inspect(path, check);
        if before.is_valid() {
            return Ok(AssetStatus::Intact);
        }

        let Some(url) = remote else {
            return Err(match before {
                Integrity::Missing => MathOcrError::asset_missing(asset, path, Some(LARGE_FILE_HINT)),
                other => MathOcrError::asset_corrupted(asset, path, other.to_string()),
            });
        };

        warn!(asset, path = %path.display(), state = %before, url, "healing asset from remote source");
        let body = self
            .fetcher
            .fetch(url)
            .map_err(|e| MathOcrError::heal_failed(asset, path, url, "fetch failed", Some(e)))?;
        write_atomic(path, &body).map_err(|e| {
            MathOcrError::heal_failed(asset, path, url, "could not overwrite local copy", Some(e.into()))
        })?;

        match inspect(path, check) {
            Integrity::Valid => {
                info!(asset, path = %path.display(), "asset healed");
                Ok(AssetStatus::Healed)
            }
            after => Err(MathOcrError::heal_failed(
                asset,
                path,
                url,
                format!("replacement is {after}"),
                None,
            )),
        }
    }

    /// Existence check for assets that must never be substituted.
    pub fn require(role: AssetRole, path: &Path) -> OcrResult<AssetRecord> {
        if !path.exists() {
            return Err(MathOcrError::asset_missing(role.to_string(), path, Some(LARGE_FILE_HINT)));
        }
        Ok(AssetRecord {
            role,
            path: path.to_path_buf(),
            exists: true,
            intact: true,
            status: None,
        })
    }

    /// Verifies every asset of `layout`, healing the vocabulary when needed.
    ///
    /// Required binaries are checked first so a missing checkpoint fails before
    /// any network access.
    pub fn verify(&self, layout: &AssetLayout) -> OcrResult<AssetManifest> {
        let weights = Self::require(AssetRole::Weights, &layout.weights_path())?;
        let resizer = Self::require(AssetRole::Resizer, &layout.resizer_path())?;

        let vocabulary_path = layout.vocabulary_path();
        let status = self.ensure(
            &vocabulary_path,
            &VocabularyIntegrity,
            layout.vocabulary_url.as_deref(),
        )?;
        let content = std::fs::read(&vocabulary_path).map_err(|e| {
            MathOcrError::io(format!("reading vocabulary '{}'", vocabulary_path.display()), e)
        })?;
        let vocab_size = vocabulary_size(&content)
            .map_err(|reason| MathOcrError::asset_corrupted("vocabulary", &vocabulary_path, reason))?;

        let manifest = AssetManifest {
            weights,
            resizer,
            vocabulary: AssetRecord {
                role: AssetRole::Vocabulary,
                path: vocabulary_path,
                exists: true,
                intact: true,
                status: Some(status),
            },
            vocab_size,
        };
        info!(vocab_size, healed = status == AssetStatus::Healed, "assets verified");
        Ok(manifest)
    }
}

fn inspect(path: &Path, check: &dyn IntegrityCheck) -> Integrity {
    if !path.exists() {
        return Integrity::Missing;
    }
    match std::fs::read(path) {
        Ok(content) => check.check(&content),
        Err(e) => Integrity::Corrupted(format!("unreadable: {e}")),
    }
}
