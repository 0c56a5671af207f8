//! OCR engine implementations
//!
//! Implementations of the OcrEngine trait, conditionally compiled based on
//! feature flags.

#[cfg(feature = "engine-tesseract")]
pub mod tesseract;
