//! Strongly typed resolved parameters handed to the recognition engine.

use crate::core::constants::SHARED_PARAMETERS;
use crate::core::errors::{MathOcrError, OcrResult};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Nested decoder sub-schema.
///
/// Shared parameters are stripped on every construction path, including
/// deserialization, so a `DecoderArgs` never carries a second value for a
/// parameter owned by the top level.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, Value>", into = "BTreeMap<String, Value>")]
pub struct DecoderArgs {
    entries: BTreeMap<String, Value>,
}

impl DecoderArgs {
    pub fn new(entries: BTreeMap<String, Value>) -> Self {
        let mut entries = entries;
        for key in SHARED_PARAMETERS {
            if entries.remove(key).is_some() {
                tracing::debug!(key, "dropping shared parameter from decoder_args");
            }
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sets a boolean flag (builder style).
    pub fn with_flag(mut self, key: &str, enabled: bool) -> Self {
        if !SHARED_PARAMETERS.contains(&key) {
            self.entries.insert(key.to_string(), Value::Bool(enabled));
        }
        self
    }
}

impl From<BTreeMap<String, Value>> for DecoderArgs {
    fn from(entries: BTreeMap<String, Value>) -> Self {
        Self::new(entries)
    }
}

impl From<DecoderArgs> for BTreeMap<String, Value> {
    fn from(args: DecoderArgs) -> Self {
        args.entries
    }
}

/// Complete parameter set for the formula recognition engine.
///
/// Every field is required when deserializing and unknown keys are rejected, so
/// a value of this type always carries exactly the default key set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolvedConfig {
    /// Layer counts of the ResNet backbone stages.
    pub backbone_layers: Vec<usize>,
    pub bos_token: usize,
    /// Input image channels.
    pub channels: usize,
    pub decoder_args: DecoderArgs,
    /// Embedding dimension.
    pub dim: usize,
    pub encoder_depth: usize,
    pub encoder_structure: String,
    pub eos_token: usize,
    /// Convert input to grayscale before encoding.
    pub gray: bool,
    /// Attention head count.
    pub heads: usize,
    pub max_height: usize,
    pub max_seq_len: usize,
    pub max_width: usize,
    pub min_height: usize,
    pub min_width: usize,
    /// Decoder layer count.
    pub num_layers: usize,
    /// Vocabulary size.
    pub num_tokens: usize,
    pub pad: bool,
    pub pad_token: usize,
    pub patch_size: usize,
    pub temperature: f64,
}

impl ResolvedConfig {
    /// The hand-maintained baseline every resolution starts from.
    pub fn baseline() -> Self {
        Self {
            backbone_layers: vec![2, 3, 7],
            bos_token: 1,
            channels: 1,
            decoder_args: DecoderArgs::default()
                .with_flag("attn_on_attn", true)
                .with_flag("cross_attend", true)
                .with_flag("ff_glu", true)
                .with_flag("rel_pos_bias", false)
                .with_flag("use_scalenorm", false),
            dim: 256,
            encoder_depth: 4,
            encoder_structure: "hybrid".to_string(),
            eos_token: 2,
            gray: true,
            heads: 8,
            max_height: 512,
            max_seq_len: 512,
            max_width: 1024,
            min_height: 32,
            min_width: 32,
            num_layers: 4,
            num_tokens: 8000,
            pad: false,
            pad_token: 0,
            patch_size: 16,
            temperature: 0.00001,
        }
    }

    /// Builds a typed config from a complete parameter mapping.
    pub fn from_value(value: Value) -> OcrResult<Self> {
        serde_yaml::from_value(value).map_err(|e| {
            MathOcrError::invalid_parameters("merged parameters do not match the engine schema", Some(e))
        })
    }

    /// Converts the config into an untyped mapping value.
    pub fn to_value(&self) -> OcrResult<Value> {
        serde_yaml::to_value(self).map_err(|e| {
            MathOcrError::invalid_parameters("failed to encode resolved parameters", Some(e))
        })
    }

    /// Renders the config as a YAML document.
    pub fn to_yaml(&self) -> OcrResult<String> {
        serde_yaml::to_string(self).map_err(|e| {
            MathOcrError::invalid_parameters("failed to render resolved parameters", Some(e))
        })
    }

    /// Reads a persisted resolved document back.
    pub fn from_file(path: impl AsRef<Path>) -> OcrResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| MathOcrError::io(format!("reading resolved config '{}'", path.display()), e))?;
        serde_yaml::from_str(&text).map_err(|e| {
            MathOcrError::invalid_parameters(
                format!("resolved config '{}' does not match the engine schema", path.display()),
                Some(e),
            )
        })
    }
}
