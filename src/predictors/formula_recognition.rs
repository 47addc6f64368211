//! Formula Recognition Predictor
//!
//! This module provides the prediction API on top of a ready engine. Prediction
//! never fails from the caller's point of view: errors, including an engine
//! panic, are rendered as an inline diagnostic so that a UI always has a string
//! to display.

use crate::core::errors::{MathOcrError, OcrResult};
use crate::core::traits::FormulaEngine;
use crate::utils::validate_image_dimensions;
use image::RgbImage;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Formula recognizer wrapping a constructed engine.
pub struct Recognizer<E: FormulaEngine> {
    engine: E,
    config_path: PathBuf,
}

impl<E: FormulaEngine> Recognizer<E> {
    pub(crate) fn new(engine: E, config_path: PathBuf) -> Self {
        Self {
            engine,
            config_path,
        }
    }

    /// Location of the resolved document the engine was built from.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Recognizes a formula and returns it as inline math (`$...$`).
    pub fn try_predict(&self, image: &RgbImage) -> OcrResult<String> {
        validate_image_dimensions(image.width(), image.height())
            .map_err(|message| MathOcrError::prediction(message, None))?;

        let context = || format!("engine failed on {}x{} image", image.width(), image.height());
        let latex = catch_unwind(AssertUnwindSafe(|| self.engine.recognize(image)))
            .map_err(|payload| {
                MathOcrError::prediction(context(), Some(panic_message(payload.as_ref()).into()))
            })?
            .map_err(|e| MathOcrError::prediction(context(), Some(e)))?;
        debug!(chars = latex.len(), "formula recognized");
        Ok(format!("${}$", latex.trim()))
    }

    /// Like [`Recognizer::try_predict`], but failures come back as display text.
    pub fn predict(&self, image: &RgbImage) -> String {
        match self.try_predict(image) {
            Ok(latex) => latex,
            Err(e) => {
                error!(error = %e, "prediction failed");
                format!("[{}]", describe(&e))
            }
        }
    }

    /// Predicts each image independently; one bad input does not affect the others.
    pub fn predict_batch(&self, images: &[RgbImage]) -> Vec<String> {
        images.iter().map(|image| self.predict(image)).collect()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    let message = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown cause".to_string());
    format!("engine panicked: {message}")
}

fn describe(err: &MathOcrError) -> String {
    let mut text = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::BoxError;

    struct FixedEngine(Result<&'static str, &'static str>);

    impl FormulaEngine for FixedEngine {
        fn recognize(&self, _image: &RgbImage) -> Result<String, BoxError> {
            self.0.map(str::to_string).map_err(|e| e.into())
        }
    }

    fn recognizer(result: Result<&'static str, &'static str>) -> Recognizer<FixedEngine> {
        Recognizer::new(FixedEngine(result), PathBuf::from("resolved.yaml"))
    }

    #[test]
    fn test_predict_wraps_inline_math() {
        let image = RgbImage::new(32, 32);
        assert_eq!(recognizer(Ok(" \\frac{1}{2} ")).predict(&image), "$\\frac{1}{2}$");
    }

    #[test]
    fn test_engine_failure_becomes_inline_text() {
        let image = RgbImage::new(32, 32);
        let text = recognizer(Err("out of memory")).predict(&image);
        assert!(text.starts_with("[prediction failed"));
        assert!(text.contains("out of memory"));
    }

    struct PanickingEngine;

    impl FormulaEngine for PanickingEngine {
        fn recognize(&self, _image: &RgbImage) -> Result<String, BoxError> {
            panic!("index out of bounds");
        }
    }

    #[test]
    fn test_engine_panic_becomes_inline_text() {
        let rec = Recognizer::new(PanickingEngine, PathBuf::from("resolved.yaml"));
        let image = RgbImage::new(32, 32);
        let err = rec.try_predict(&image).unwrap_err();
        assert!(!err.is_fatal());

        let text = rec.predict(&image);
        assert!(text.starts_with("[prediction failed"));
        assert!(text.contains("engine panicked: index out of bounds"));
        // still usable afterwards
        assert_eq!(rec.predict_batch(&[image.clone(), image]).len(), 2);
    }

    #[test]
    fn test_empty_image_is_rejected_inline() {
        let rec = recognizer(Ok("x"));
        let err = rec.try_predict(&RgbImage::new(0, 0)).unwrap_err();
        assert!(!err.is_fatal());
        assert!(rec.predict(&RgbImage::new(0, 4)).contains("empty dimensions"));
    }

    #[test]
    fn test_batch_isolates_failures() {
        let rec = recognizer(Ok("x^2"));
        let out = rec.predict_batch(&[RgbImage::new(8, 8), RgbImage::new(0, 8)]);
        assert_eq!(out[0], "$x^2$");
        assert!(out[1].starts_with('['));
    }
}
