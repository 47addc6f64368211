//! Integrity predicates for auxiliary artifacts.

use crate::core::constants::{STORAGE_POINTER_MARKER, STORAGE_POINTER_MAX_LEN};
use serde_json::Value;

/// Outcome of inspecting an artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Integrity {
    /// Present and well formed.
    Valid,
    /// The path does not exist.
    Missing,
    /// A storage pointer stub sits where the real content should be.
    Placeholder,
    /// Present but unusable.
    Corrupted(String),
}

impl Integrity {
    pub fn is_valid(&self) -> bool {
        matches!(self, Integrity::Valid)
    }
}

impl std::fmt::Display for Integrity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Integrity::Valid => write!(f, "valid"),
            Integrity::Missing => write!(f, "missing"),
            Integrity::Placeholder => write!(f, "a storage pointer placeholder"),
            Integrity::Corrupted(reason) => write!(f, "corrupted ({reason})"),
        }
    }
}

/// Distinguishes a usable artifact from a damaged or placeholder one.
pub trait IntegrityCheck: Send + Sync {
    /// Logical asset name used in logs and errors.
    fn asset_name(&self) -> &str;

    /// Judges the artifact's content.
    fn check(&self, content: &[u8]) -> Integrity;
}

/// Whether `content` is a large-file storage pointer instead of real data.
pub fn is_storage_pointer(content: &[u8]) -> bool {
    content.len() <= STORAGE_POINTER_MAX_LEN
        && std::str::from_utf8(content)
            .map(|text| text.trim_start().starts_with(STORAGE_POINTER_MARKER))
            .unwrap_or(false)
}

/// Counts the entries of the vocabulary collection in a tokenizer document.
///
/// The collection is `model.vocab` (or a top-level `vocab`), either a mapping
/// from token to id or a list of entries.
pub fn vocabulary_size(content: &[u8]) -> Result<usize, String> {
    let document: Value =
        serde_json::from_slice(content).map_err(|e| format!("invalid JSON: {e}"))?;
    let vocab = document
        .get("model")
        .and_then(|model| model.get("vocab"))
        .or_else(|| document.get("vocab"))
        .ok_or_else(|| "no vocabulary collection found".to_string())?;
    let size = match vocab {
        Value::Object(entries) => entries.len(),
        Value::Array(entries) => entries.len(),
        _ => return Err("vocabulary is neither a mapping nor a list".to_string()),
    };
    if size == 0 {
        return Err("vocabulary is empty".to_string());
    }
    Ok(size)
}

/// Integrity predicate for the tokenizer vocabulary index.
#[derive(Debug, Clone, Copy, Default)]
pub struct VocabularyIntegrity;

impl IntegrityCheck for VocabularyIntegrity {
    fn asset_name(&self) -> &str {
        "vocabulary"
    }

    fn check(&self, content: &[u8]) -> Integrity {
        // the stub is not JSON either, so test for it first
        if is_storage_pointer(content) {
            return Integrity::Placeholder;
        }
        match vocabulary_size(content) {
            Ok(_) => Integrity::Valid,
            Err(reason) => Integrity::Corrupted(reason),
        }
    }
}
