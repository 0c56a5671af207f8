use crate::error::OcrError;
use crate::preprocessing::PixelBuffer;
use serde::Serialize;

/// OCR processing result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OcrResult {
    pub text: String,
    /// Mean confidence on a 0-100 scale
    pub confidence: f32,
}

/// Incremental progress notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// 0-100
    pub percent: u8,
    pub phase: String,
}

impl Progress {
    pub fn new(percent: u8, phase: impl Into<String>) -> Self {
        Self {
            percent: percent.min(100),
            phase: phase.into(),
        }
    }
}

/// Trait that all OCR engines must implement
pub trait OcrEngine: Send + Sync {
    /// Returns the engine identifier (e.g., "tesseract")
    fn name(&self) -> &'static str;

    /// Language identifiers this engine can recognize
    fn supported_languages(&self) -> Vec<String>;

    /// Recognize text in an already preprocessed image.
    ///
    /// `on_progress` may be called any number of times with percentages local
    /// to the recognition phase.
    fn recognize(
        &self,
        image: &PixelBuffer,
        language: &str,
        on_progress: &mut dyn FnMut(Progress),
    ) -> Result<OcrResult, OcrError>;
}
