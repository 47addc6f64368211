//! The versioned default parameter set.

use super::resolved::ResolvedConfig;
use super::value::{ParamKind, ParameterMap};
use crate::core::constants::NESTED_BLOCK_KEY;
use once_cell::sync::Lazy;
use serde_yaml::Value;

/// Version of the baseline below. Bump whenever a key, a kind or a value changes.
pub const DEFAULTS_VERSION: &str = "2024.2";

static DEFAULTS: Lazy<DefaultParameterSet> = Lazy::new(DefaultParameterSet::build);

/// Returns the process-wide default parameter set.
pub fn defaults() -> &'static DefaultParameterSet {
    &DEFAULTS
}

/// Complete baseline mapping from every engine parameter to a safe value.
///
/// Its key set is the authoritative list of parameters the engine requires.
#[derive(Debug, Clone)]
pub struct DefaultParameterSet {
    version: &'static str,
    typed: ResolvedConfig,
    parameters: ParameterMap,
}

impl DefaultParameterSet {
    fn build() -> Self {
        let typed = ResolvedConfig::baseline();
        let parameters = match serde_yaml::to_value(&typed) {
            Ok(Value::Mapping(mapping)) => mapping
                .into_iter()
                .filter_map(|(key, value)| key.as_str().map(|k| (k.to_string(), value)))
                .collect(),
            // A struct always serializes to a mapping.
            _ => ParameterMap::new(),
        };
        Self {
            version: DEFAULTS_VERSION,
            typed,
            parameters,
        }
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    /// The baseline as a typed config.
    pub fn typed(&self) -> &ResolvedConfig {
        &self.typed
    }

    /// The baseline as an untyped mapping.
    pub fn parameters(&self) -> &ParameterMap {
        &self.parameters
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.parameters.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.parameters.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.parameters.keys().map(String::as_str)
    }

    /// Expected kind of a top-level key, if the key is known.
    pub fn kind_of(&self, key: &str) -> Option<ParamKind> {
        self.parameters.get(key).map(ParamKind::of)
    }

    /// The default nested block.
    pub fn nested(&self) -> ParameterMap {
        match self.parameters.get(NESTED_BLOCK_KEY) {
            Some(Value::Mapping(mapping)) => mapping
                .iter()
                .filter_map(|(key, value)| key.as_str().map(|k| (k.to_string(), value.clone())))
                .collect(),
            _ => ParameterMap::new(),
        }
    }
}
