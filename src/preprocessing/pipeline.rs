use crate::config::PreprocessingConfig;
use crate::engine::Progress;
use crate::error::{PreprocessingError, Stage};
use serde::Serialize;
use std::time::Instant;

use super::buffer::PixelBuffer;
use super::steps;

/// Timing information for a single preprocessing step
#[derive(Debug, Clone, Serialize)]
pub struct StepTiming {
    pub name: String,
    pub time_ms: u64,
}

/// Result of preprocessing including timing stats
#[derive(Debug, Clone, Serialize)]
pub struct PreprocessingResult {
    /// Preprocessed image (not serialized)
    #[serde(skip)]
    pub buffer: PixelBuffer,
    /// Binarization cut-off actually applied
    pub threshold: u8,
    pub width: u32,
    pub height: u32,
    /// Total preprocessing time in milliseconds
    pub total_time_ms: u64,
    /// Individual step timings
    pub steps: Vec<StepTiming>,
}

/// Runs grayscale, contrast, sharpen and binarize, always in that order.
///
/// The pipeline owns no image state: each call consumes its input buffer and
/// either returns the fully processed buffer or an error, never a partially
/// processed one. A single `Pipeline` can serve many threads at once.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PreprocessingConfig,
}

impl Pipeline {
    /// Validate the config up front so bad parameters fail before any pixel work
    pub fn new(config: PreprocessingConfig) -> Result<Self, PreprocessingError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    /// Process an image according to the configured parameters
    pub fn process(&self, buffer: PixelBuffer) -> Result<PreprocessingResult, PreprocessingError> {
        self.process_with_progress(buffer, |_| {})
    }

    /// Process an image, reporting after each completed stage
    pub fn process_with_progress<F>(
        &self,
        buffer: PixelBuffer,
        mut on_progress: F,
    ) -> Result<PreprocessingResult, PreprocessingError>
    where
        F: FnMut(Progress),
    {
        let start = Instant::now();
        let (width, height) = buffer.dimensions();

        let mut timings = Vec::with_capacity(4);
        let config = &self.config;

        let img = self.run_step(Stage::Grayscale, buffer, &mut timings, steps::grayscale::apply)?;
        on_progress(Progress::new(25, Stage::Grayscale.as_str()));

        let img = self.run_step(Stage::Contrast, img, &mut timings, |b| {
            steps::contrast::apply(b, config.contrast_strength)
        })?;
        on_progress(Progress::new(50, Stage::Contrast.as_str()));

        let img = self.run_step(Stage::Sharpen, img, &mut timings, |b| {
            steps::sharpen::apply(b, &config.sharpen_kernel)
        })?;
        on_progress(Progress::new(75, Stage::Sharpen.as_str()));

        let (img, threshold) = self.run_step(Stage::Binarize, img, &mut timings, |b| {
            steps::threshold::apply(b, config.binarize_threshold)
        })?;
        on_progress(Progress::new(100, Stage::Binarize.as_str()));

        let total_time_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Preprocessed {}x{} image in {}ms (threshold {} -> {})",
            width,
            height,
            total_time_ms,
            config.binarize_threshold,
            threshold
        );

        Ok(PreprocessingResult {
            buffer: img,
            threshold,
            width,
            height,
            total_time_ms,
            steps: timings,
        })
    }

    /// Decode image bytes, process them and encode the result as PNG
    pub fn process_bytes(&self, bytes: &[u8]) -> Result<Vec<u8>, PreprocessingError> {
        let buffer = PixelBuffer::decode(bytes)?;
        self.process(buffer)?.buffer.encode_png()
    }

    fn run_step<F, T>(
        &self,
        stage: Stage,
        img: PixelBuffer,
        timings: &mut Vec<StepTiming>,
        step_fn: F,
    ) -> Result<T, PreprocessingError>
    where
        F: FnOnce(PixelBuffer) -> Result<T, PreprocessingError>,
    {
        let step_start = Instant::now();
        let result = step_fn(img).inspect_err(|e| {
            tracing::warn!("Preprocessing step {} failed: {}", stage, e);
        })?;
        let time_ms = step_start.elapsed().as_millis() as u64;
        tracing::debug!("Step {} finished in {}ms", stage, time_ms);
        timings.push(StepTiming {
            name: stage.as_str().to_string(),
            time_ms,
        });
        Ok(result)
    }
}
