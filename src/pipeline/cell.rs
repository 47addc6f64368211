//! Process-wide single-flight engine initialization.

use super::Pipeline;
use crate::core::errors::MathOcrError;
use crate::core::traits::EngineFactory;
use crate::predictors::Recognizer;
use image::RgbImage;
use once_cell::sync::OnceCell;

/// Lazily resolved engine, shared by every caller.
///
/// The first call to [`EngineCell::get`] runs the pipeline; concurrent
/// callers block until it finishes and then observe the same outcome. A
/// failed resolution is kept as well, so the pipeline never runs twice.
///
/// ```ignore
/// static ENGINE: Lazy<EngineCell<MyFactory>> =
///     Lazy::new(|| EngineCell::new(Pipeline::new(AssetLayout::default()), MyFactory));
/// ```
pub struct EngineCell<F: EngineFactory> {
    pipeline: Pipeline,
    factory: F,
    slot: OnceCell<Result<Recognizer<F::Engine>, MathOcrError>>,
}

impl<F: EngineFactory> EngineCell<F> {
    pub fn new(pipeline: Pipeline, factory: F) -> Self {
        Self {
            pipeline,
            factory,
            slot: OnceCell::new(),
        }
    }

    /// Returns the engine, resolving it on first use.
    pub fn get(&self) -> Result<&Recognizer<F::Engine>, &MathOcrError> {
        self.slot
            .get_or_init(|| self.pipeline.run(&self.factory))
            .as_ref()
    }

    /// Whether a resolution (successful or not) has completed.
    pub fn is_resolved(&self) -> bool {
        self.slot.get().is_some()
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Predicts with the shared engine; an unavailable engine is reported inline.
    pub fn predict(&self, image: &RgbImage) -> String {
        match self.get() {
            Ok(recognizer) => recognizer.predict(image),
            Err(e) => format!("[engine unavailable: {e}]"),
        }
    }
}
