//! Precedence between defaults and user settings.

use super::defaults::DefaultParameterSet;
use super::resolved::ResolvedConfig;
use super::value::{NormalizedFields, ParameterMap};
use crate::core::constants::{NESTED_BLOCK_KEY, SHARED_PARAMETERS};
use crate::core::errors::OcrResult;
use serde_yaml::{Mapping, Value};
use tracing::debug;

/// Combines the defaults with normalized user fields.
///
/// Top-level keys: user value if present, default otherwise. The nested decoder
/// block starts from the default block, takes user entries on top, and then
/// loses every shared parameter, whatever its origin.
pub struct MergePolicy;

impl MergePolicy {
    pub fn merge(defaults: &DefaultParameterSet, normalized: NormalizedFields) -> OcrResult<ResolvedConfig> {
        let merged = Self::merge_parameters(defaults, normalized);
        let mapping: Mapping = merged
            .into_iter()
            .map(|(key, value)| (Value::String(key), value))
            .collect();
        ResolvedConfig::from_value(Value::Mapping(mapping))
    }

    /// Untyped merge; the key set always equals the defaults' key set.
    pub fn merge_parameters(defaults: &DefaultParameterSet, normalized: NormalizedFields) -> ParameterMap {
        let mut user = normalized.into_entries();
        let user_nested = user.remove(NESTED_BLOCK_KEY);

        let mut merged = ParameterMap::new();
        for (key, default) in defaults.parameters() {
            if key == NESTED_BLOCK_KEY {
                continue;
            }
            let value = user.remove(key).unwrap_or_else(|| default.clone());
            merged.insert(key.clone(), value);
        }

        let mut nested = defaults.nested();
        if let Some(Value::Mapping(overrides)) = user_nested {
            for (key, value) in overrides {
                if let Value::String(key) = key {
                    nested.insert(key, value);
                }
            }
        }
        for key in SHARED_PARAMETERS {
            if nested.remove(key).is_some() {
                debug!(key, top_level = ?merged.get(key), "top-level value wins over nested duplicate");
            }
        }
        let nested: Mapping = nested
            .into_iter()
            .map(|(key, value)| (Value::String(key), value))
            .collect();
        merged.insert(NESTED_BLOCK_KEY.to_string(), Value::Mapping(nested));

        if !user.is_empty() {
            debug!(ignored = ?user.keys().collect::<Vec<_>>(), "fields outside the default schema ignored");
        }
        merged
    }
}
