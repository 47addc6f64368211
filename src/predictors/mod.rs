//! High-level prediction API.

pub mod formula_recognition;

pub use formula_recognition::Recognizer;
