//! Error handling for the resolution pipeline.

mod types;

pub use types::{BoxError, FailureKind, MathOcrError};

/// Result alias used throughout the crate.
pub type OcrResult<T> = std::result::Result<T, MathOcrError>;
