use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Pipeline stage that produced an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Decode,
    Grayscale,
    Contrast,
    Sharpen,
    Binarize,
    Encode,
}

impl Stage {
    /// Get the stage name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Decode => "decode",
            Self::Grayscale => "grayscale",
            Self::Contrast => "contrast",
            Self::Sharpen => "sharpen",
            Self::Binarize => "binarize",
            Self::Encode => "encode",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PreprocessingError {
    #[error("{stage}: invalid dimensions {width}x{height}")]
    InvalidDimensions {
        stage: Stage,
        width: u32,
        height: u32,
    },

    #[error("{stage}: invalid config: {reason}")]
    InvalidConfig { stage: Stage, reason: String },

    #[error("decode: failed to decode image: {0}")]
    DecodeFailure(String),

    #[error("encode: failed to encode image: {0}")]
    EncodeFailure(String),
}

impl PreprocessingError {
    pub fn invalid_config(stage: Stage, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            stage,
            reason: reason.into(),
        }
    }

    /// The stage that failed
    pub fn stage(&self) -> Stage {
        match self {
            Self::InvalidDimensions { stage, .. } | Self::InvalidConfig { stage, .. } => *stage,
            Self::DecodeFailure(_) => Stage::Decode,
            Self::EncodeFailure(_) => Stage::Encode,
        }
    }
}

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Failed to initialize OCR engine: {0}")]
    InitializationError(String),

    #[error("Failed to recognize image: {0}")]
    ProcessingError(String),

    #[error("Unsupported language: {0}")]
    UnsupportedLanguage(String),

    #[error("Preprocessing failed at {0}")]
    Preprocessing(#[from] PreprocessingError),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_reports_failing_stage() {
        let err = PreprocessingError::invalid_config(Stage::Contrast, "singular factor");
        assert_eq!(err.stage(), Stage::Contrast);
        assert_eq!(err.to_string(), "contrast: invalid config: singular factor");

        let err = PreprocessingError::DecodeFailure("truncated".to_string());
        assert_eq!(err.stage(), Stage::Decode);
    }

    #[test]
    fn test_ocr_error_wraps_preprocessing_error() {
        let err: OcrError = PreprocessingError::InvalidDimensions {
            stage: Stage::Decode,
            width: 0,
            height: 4,
        }
        .into();
        assert!(err.to_string().starts_with("Preprocessing failed at decode"));
    }
}
