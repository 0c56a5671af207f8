//! Image preprocessing for handwriting OCR
//!
//! Turns a photographed or scanned page into a clean two-level image:
//! grayscale, contrast stretch, 3x3 sharpen, then binarization at a fixed or
//! Otsu-derived threshold. The OCR engine itself sits behind [`OcrEngine`].

pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod preprocessing;
pub mod recognition;

pub use config::{PreprocessingConfig, Threshold};
pub use engine::{OcrEngine, OcrResult, Progress};
pub use error::{OcrError, PreprocessingError, Stage};
pub use preprocessing::{Pipeline, PixelBuffer, PreprocessingResult};
