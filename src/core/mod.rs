//! The core module of the resolution pipeline.
//!
//! This module contains the building blocks the pipeline is assembled from:
//! - Asset verification and healing
//! - Configuration loading, normalization, merging and persistence
//! - Constants used throughout the crate
//! - Error handling
//! - Traits at the engine boundary

pub mod assets;
pub mod config;
pub mod constants;
pub mod errors;
pub mod traits;

pub use assets::{AssetFetcher, AssetHealer, AssetManifest, HttpFetcher, IntegrityCheck};
pub use config::{
    AssetLayout, ConfigLoader, DecoderArgs, MergePolicy, NormalizedFields, ParameterAssembler,
    PersistedConfigHandle, RawConfig, ResolvedConfig, SchemaNormalizer, defaults,
};
pub use errors::{FailureKind, MathOcrError, OcrResult};
pub use traits::{EngineArgs, EngineFactory, FormulaEngine};
