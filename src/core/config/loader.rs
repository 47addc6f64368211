//! Reading the external settings document.

use super::value::{ParameterMap, RawConfig};
use crate::core::errors::{MathOcrError, OcrResult};
use serde_yaml::Value;
use std::path::Path;
use tracing::{info, warn};

/// Loads the user settings document into an untyped mapping.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads `path` into a [`RawConfig`].
    ///
    /// A missing file yields an empty config. A present file that is not a
    /// YAML mapping is a [`MathOcrError::ConfigParse`].
    pub fn load(path: impl AsRef<Path>) -> OcrResult<RawConfig> {
        let path = path.as_ref();
        if !path.exists() {
            warn!(
                path = %path.display(),
                "settings document not found, continuing with defaults"
            );
            return Ok(RawConfig::empty());
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            MathOcrError::io(format!("reading settings document '{}'", path.display()), e)
        })?;
        let raw = Self::parse(path, &text)?;
        info!(path = %path.display(), entries = raw.len(), "loaded settings document");
        Ok(raw)
    }

    /// Parses settings text; `origin` is only used in error messages.
    pub fn parse(origin: &Path, text: &str) -> OcrResult<RawConfig> {
        if text.trim().is_empty() {
            return Ok(RawConfig::empty());
        }
        let document: Value = serde_yaml::from_str(text)
            .map_err(|e| MathOcrError::config_parse(origin, "invalid YAML", Some(e)))?;

        let mapping = match document {
            Value::Null => return Ok(RawConfig::empty()),
            Value::Mapping(mapping) => mapping,
            other => {
                return Err(MathOcrError::config_parse(
                    origin,
                    format!("expected a mapping at the top level, found {}", describe(&other)),
                    None,
                ));
            }
        };

        let mut entries = ParameterMap::new();
        for (key, value) in mapping {
            match key {
                Value::String(key) => {
                    entries.insert(key, value);
                }
                other => warn!(key = ?other, "ignoring settings entry with a non-string key"),
            }
        }
        Ok(RawConfig::new(entries))
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
