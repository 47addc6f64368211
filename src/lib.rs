//! # mathocr
//!
//! Configuration resolution for a LaTeX formula recognizer.
//!
//! Before a recognition engine can be built, its on-disk assets must be
//! present and intact, and a loosely typed settings document must be turned
//! into the complete, typed parameter set the engine expects. This crate does
//! both, once per process:
//!
//! 1. verify required assets and heal a damaged vocabulary index,
//! 2. load and normalize the user settings,
//! 3. merge them over a versioned baseline,
//! 4. persist the resolved document and hand it to an [`EngineFactory`].
//!
//! ```ignore
//! use mathocr::{AssetLayout, EngineCell, Pipeline};
//!
//! let cell = EngineCell::new(Pipeline::new(AssetLayout::new("assets")), MyFactory);
//! let latex = cell.predict(&image);
//! ```
//!
//! [`EngineFactory`]: core::traits::EngineFactory

pub mod core;
pub mod pipeline;
pub mod predictors;
pub mod utils;

pub use crate::core::config::{AssetLayout, ResolvedConfig, defaults};
pub use crate::core::errors::{MathOcrError, OcrResult};
pub use crate::core::traits::{EngineArgs, EngineFactory, FormulaEngine};
pub use pipeline::{EngineCell, Pipeline, Resolution, ResolutionState};
pub use predictors::Recognizer;
