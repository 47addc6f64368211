//! Shape and type normalization of raw settings.
//!
//! The rules are table driven: the defaults decide which keys exist and which
//! kind each key must have, and a single suffix rule decides which keys are
//! list-encoded dimension pairs.
//!
//! 1. `<prefix>_dimensions: [H, W]` expands to `<prefix>_height: H` and
//!    `<prefix>_width: W` when the defaults know both scalar keys.
//! 2. Any other key survives only if the defaults contain it with a compatible
//!    kind. Explicit scalar dimensions override list-derived ones.
//! 3. The nested decoder block is filtered entry by entry.
//! 4. The vocabulary size is injected when the settings do not provide one.
//!
//! Rejected fields are dropped and logged, never reported as errors.

use super::defaults::{DefaultParameterSet, defaults};
use super::value::{NormalizedFields, ParamKind, ParameterMap, RawConfig};
use crate::core::constants::{DIMENSION_PAIR_SUFFIX, NESTED_BLOCK_KEY, VOCAB_SIZE_KEY};
use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

/// Validates raw settings against the default parameter set.
#[derive(Debug, Clone, Copy)]
pub struct SchemaNormalizer<'a> {
    defaults: &'a DefaultParameterSet,
}

impl Default for SchemaNormalizer<'static> {
    fn default() -> Self {
        Self::new(defaults())
    }
}

impl<'a> SchemaNormalizer<'a> {
    pub fn new(defaults: &'a DefaultParameterSet) -> Self {
        Self { defaults }
    }

    /// Normalizes `raw`, injecting `vocab_size` when the vocabulary size is absent.
    ///
    /// Pure and deterministic; normalizing the output again yields the same fields.
    pub fn normalize(&self, raw: &RawConfig, vocab_size: usize) -> NormalizedFields {
        let mut fields = ParameterMap::new();
        let mut dropped = 0usize;

        for (key, value) in raw.iter() {
            let Some(prefix) = key.strip_suffix(DIMENSION_PAIR_SUFFIX) else {
                continue;
            };
            let height_key = format!("{prefix}_height");
            let width_key = format!("{prefix}_width");
            if !self.defaults.contains_key(&height_key) || !self.defaults.contains_key(&width_key) {
                drop_field(key, "unknown dimension pair", &mut dropped);
                continue;
            }
            match split_pair(value) {
                Some((height, width)) => {
                    fields.insert(height_key, height);
                    fields.insert(width_key, width);
                }
                None => drop_field(key, "expected a [height, width] pair of integers", &mut dropped),
            }
        }

        for (key, value) in raw.iter() {
            if key.ends_with(DIMENSION_PAIR_SUFFIX) {
                continue;
            }
            if key == NESTED_BLOCK_KEY {
                match self.normalize_nested(value, &mut dropped) {
                    Some(nested) => {
                        fields.insert(key.clone(), Value::Mapping(nested));
                    }
                    None => drop_field(key, "expected a mapping", &mut dropped),
                }
                continue;
            }
            match self.defaults.kind_of(key) {
                None => drop_field(key, "unknown parameter", &mut dropped),
                Some(expected) if ParamKind::of(value).accepts_as(&expected) => {
                    fields.insert(key.clone(), value.clone());
                }
                Some(_) => drop_field(key, "type mismatch", &mut dropped),
            }
        }

        match fields.get(VOCAB_SIZE_KEY).and_then(Value::as_u64) {
            None => {
                fields.insert(VOCAB_SIZE_KEY.to_string(), Value::from(vocab_size as u64));
            }
            Some(configured) if configured != vocab_size as u64 => {
                warn!(
                    configured,
                    vocabulary = vocab_size,
                    "configured {VOCAB_SIZE_KEY} disagrees with the vocabulary artifact"
                );
            }
            Some(_) => {}
        }

        if dropped > 0 {
            debug!(dropped, kept = fields.len(), "normalized settings");
        }
        NormalizedFields::new(fields)
    }

    fn normalize_nested(&self, value: &Value, dropped: &mut usize) -> Option<Mapping> {
        let Value::Mapping(entries) = value else {
            return None;
        };
        let expected = self.defaults.nested();
        let mut nested = Mapping::new();
        for (key, value) in entries {
            let Some(name) = key.as_str() else {
                drop_field(&format!("{NESTED_BLOCK_KEY}.{key:?}"), "non-string key", dropped);
                continue;
            };
            let kind = ParamKind::of(value);
            let keep = match expected.get(name) {
                Some(default) => kind.accepts_as(&ParamKind::of(default)),
                None => kind.is_scalar(),
            };
            if keep {
                nested.insert(Value::from(name), value.clone());
            } else {
                drop_field(&format!("{NESTED_BLOCK_KEY}.{name}"), "type mismatch", dropped);
            }
        }
        Some(nested)
    }
}

fn split_pair(value: &Value) -> Option<(Value, Value)> {
    match value.as_sequence()?.as_slice() {
        [height, width] => {
            let height = height.as_u64()?;
            let width = width.as_u64()?;
            Some((Value::from(height), Value::from(width)))
        }
        _ => None,
    }
}

fn drop_field(key: &str, reason: &str, dropped: &mut usize) {
    debug!(key, reason, "dropping settings field");
    *dropped += 1;
}
