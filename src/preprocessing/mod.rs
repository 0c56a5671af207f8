//! Image preprocessing module for OCR enhancement
//!
//! Conditions a photographed or scanned page of handwriting so the OCR engine
//! sees clean, two-level strokes: grayscale, contrast stretch, sharpen, binarize.

pub mod buffer;
pub mod pipeline;
pub mod steps;

pub use buffer::{Histogram, PixelBuffer};
pub use pipeline::{Pipeline, PreprocessingResult, StepTiming};
