//! Recognition workflow: decode, preprocess, then hand the result to an OCR engine.
//!
//! Pixel work and recognition both block, so each runs on tokio's blocking
//! pool. Progress from both phases is folded into a single 0-100 scale and
//! sent over an unbounded channel; a dropped receiver is not an error.

use crate::engine::{OcrEngine, Progress};
use crate::error::OcrError;
use crate::preprocessing::{Pipeline, PixelBuffer};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;

/// Share of the overall progress bar covered by preprocessing
const PREPROCESS_SHARE: u16 = 30;

/// Outcome of a full recognize run
#[derive(Debug, Clone, Serialize)]
pub struct Recognition {
    pub text: String,
    pub confidence: f32,
    /// Binarization cut-off used during preprocessing
    pub threshold: u8,
    pub processing_time_ms: u64,
    /// PNG of the image the engine actually saw
    #[serde(skip)]
    pub preprocessed_png: Vec<u8>,
}

/// Forwards progress into the channel, if there is one
#[derive(Clone)]
struct ProgressSink {
    tx: Option<UnboundedSender<Progress>>,
}

impl ProgressSink {
    fn send(&self, progress: Progress) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(progress);
        }
    }

    /// Map a phase-local percentage into `[offset, offset + span]`
    fn scaled(&self, progress: Progress, offset: u16, span: u16) {
        let percent = offset + progress.percent as u16 * span / 100;
        self.send(Progress::new(percent as u8, progress.phase));
    }
}

/// Preprocess `image_bytes` with `pipeline` and recognize the result.
pub async fn recognize(
    engine: Arc<dyn OcrEngine>,
    image_bytes: Vec<u8>,
    pipeline: Pipeline,
    language: String,
    progress: Option<UnboundedSender<Progress>>,
) -> Result<Recognition, OcrError> {
    let start = Instant::now();

    if !engine
        .supported_languages()
        .iter()
        .any(|l| l == &language)
    {
        return Err(OcrError::UnsupportedLanguage(language));
    }

    let sink = ProgressSink { tx: progress };
    sink.send(Progress::new(0, "decoding"));

    let preprocess_sink = sink.clone();
    let prepared = tokio::task::spawn_blocking(move || {
        let buffer = PixelBuffer::decode(&image_bytes)?;
        let result = pipeline.process_with_progress(buffer, |p| {
            preprocess_sink.scaled(p, 0, PREPROCESS_SHARE)
        })?;
        let png = result.buffer.encode_png()?;
        Ok::<_, OcrError>((result, png))
    })
    .await
    .map_err(|e| OcrError::Internal(format!("Preprocessing task failed: {}", e)))?;
    let (prepared, preprocessed_png) = prepared?;

    tracing::debug!(
        "Handing {}x{} image to {} engine (language: {})",
        prepared.width,
        prepared.height,
        engine.name(),
        language
    );

    let recognize_sink = sink.clone();
    let buffer = prepared.buffer;
    let result = tokio::task::spawn_blocking(move || {
        engine.recognize(&buffer, &language, &mut |p| {
            recognize_sink.scaled(p, PREPROCESS_SHARE, 100 - PREPROCESS_SHARE)
        })
    })
    .await
    .map_err(|e| OcrError::Internal(format!("Recognition task failed: {}", e)))??;

    sink.send(Progress::new(100, "done"));

    let processing_time_ms = start.elapsed().as_millis() as u64;
    let text = result.text.trim().to_string();
    let confidence = if result.confidence.is_finite() {
        result.confidence.clamp(0.0, 100.0)
    } else {
        0.0
    };

    tracing::info!(
        "OCR completed in {}ms, confidence: {:.2}, text length: {}",
        processing_time_ms,
        confidence,
        text.len()
    );

    Ok(Recognition {
        text,
        confidence,
        threshold: prepared.threshold,
        processing_time_ms,
        preprocessed_png,
    })
}
