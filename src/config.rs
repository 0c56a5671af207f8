use crate::error::{PreprocessingError, Stage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Laplacian-based sharpening kernel, row-major.
/// Center weight 5, direct neighbors -1 each.
pub const SHARPEN_KERNEL: [i32; 9] = [0, -1, 0, -1, 5, -1, 0, -1, 0];

/// Default contrast strength
pub const DEFAULT_CONTRAST_STRENGTH: f32 = 50.0;

/// Default binarization cut-off
pub const DEFAULT_THRESHOLD: u8 = 128;

/// Contrast strengths at or above this make the scaling factor singular or negative
pub const MAX_CONTRAST_STRENGTH: f32 = 259.0;

/// How the binarizer picks its cut-off
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Threshold {
    /// Pixels brighter than this become white
    Fixed(u8),
    /// Derive the cut-off from the luminance histogram (Otsu)
    Auto,
}

impl Default for Threshold {
    fn default() -> Self {
        Self::Fixed(DEFAULT_THRESHOLD)
    }
}

impl Threshold {
    /// Build a fixed threshold from an unchecked integer
    pub fn fixed(value: i64) -> Result<Self, PreprocessingError> {
        u8::try_from(value).map(Self::Fixed).map_err(|_| {
            PreprocessingError::invalid_config(
                Stage::Binarize,
                format!("threshold {} is outside 0..=255", value),
            )
        })
    }
}

impl FromStr for Threshold {
    type Err = PreprocessingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") || s.eq_ignore_ascii_case("otsu") {
            return Ok(Self::Auto);
        }
        let value: i64 = s.parse().map_err(|_| {
            PreprocessingError::invalid_config(
                Stage::Binarize,
                format!("threshold must be 'auto' or an integer, got '{}'", s),
            )
        })?;
        Self::fixed(value)
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(value) => write!(f, "{}", value),
            Self::Auto => f.write_str("auto"),
        }
    }
}

/// Parameters shared by every stage of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    pub contrast_strength: f32,
    pub sharpen_kernel: [i32; 9],
    pub binarize_threshold: Threshold,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            contrast_strength: DEFAULT_CONTRAST_STRENGTH,
            sharpen_kernel: SHARPEN_KERNEL,
            binarize_threshold: Threshold::default(),
        }
    }
}

impl PreprocessingConfig {
    pub fn with_contrast_strength(mut self, strength: f32) -> Self {
        self.contrast_strength = strength;
        self
    }

    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.binarize_threshold = threshold;
        self
    }

    /// Check every parameter before any pixel is touched
    pub fn validate(&self) -> Result<(), PreprocessingError> {
        let strength = self.contrast_strength;
        if !strength.is_finite() {
            return Err(PreprocessingError::invalid_config(
                Stage::Contrast,
                format!("contrast strength must be finite, got {}", strength),
            ));
        }
        if strength >= MAX_CONTRAST_STRENGTH {
            return Err(PreprocessingError::invalid_config(
                Stage::Contrast,
                format!(
                    "contrast strength {} must be below {}",
                    strength, MAX_CONTRAST_STRENGTH
                ),
            ));
        }
        if !(-255.0..=255.0).contains(&strength) {
            tracing::warn!(
                "Contrast strength {} is outside -255..=255, output will clip heavily",
                strength
            );
        }
        if self.sharpen_kernel != SHARPEN_KERNEL {
            return Err(PreprocessingError::invalid_config(
                Stage::Sharpen,
                format!(
                    "sharpen kernel must be {:?}, got {:?}",
                    SHARPEN_KERNEL, self.sharpen_kernel
                ),
            ));
        }
        Ok(())
    }
}
