//! Configuration resolution.
//!
//! This module turns the loosely typed settings document into the complete,
//! typed parameter set the engine requires:
//!
//! - [`ConfigLoader`] reads the settings document
//! - [`SchemaNormalizer`] expands dimension pairs and filters by type
//! - [`defaults`] provides the versioned baseline
//! - [`MergePolicy`] applies precedence and nested de-duplication
//! - [`ParameterAssembler`] persists the result

pub mod assemble;
pub mod defaults;
pub mod layout;
pub mod loader;
pub mod merge;
pub mod normalize;
pub mod resolved;
pub mod value;

pub use assemble::{ParameterAssembler, PersistedConfigHandle};
pub use defaults::{DEFAULTS_VERSION, DefaultParameterSet, defaults};
pub use layout::AssetLayout;
pub use loader::ConfigLoader;
pub use merge::MergePolicy;
pub use normalize::SchemaNormalizer;
pub use resolved::{DecoderArgs, ResolvedConfig};
pub use value::{NormalizedFields, ParamKind, ParameterMap, RawConfig};
