//! Tesseract engine implementation
//!
//! Uses tesseract-static for static linking (no system dependencies).
//! Traineddata files must already be present locally; nothing is downloaded.

use crate::engine::{OcrEngine, OcrResult, Progress};
use crate::error::OcrError;
use crate::preprocessing::PixelBuffer;
use std::path::{Path, PathBuf};
use tesseract_static::tesseract::Tesseract;

/// Tesseract OCR Engine
pub struct TesseractEngine {
    /// Path to tessdata directory
    tessdata_path: String,
    /// Languages with a traineddata file in `tessdata_path`
    languages: Vec<String>,
}

impl TesseractEngine {
    /// Create an engine over a tessdata directory.
    ///
    /// The directory is taken from `tessdata`, then `TESSDATA_PREFIX`, then
    /// `<data dir>/handwriting-prep/tessdata`.
    pub fn new(tessdata: Option<&Path>, language: &str) -> Result<Self, OcrError> {
        let dir = resolve_tessdata_dir(tessdata)?;
        let languages = installed_languages(&dir)?;

        if !languages.iter().any(|l| l == language) {
            return Err(OcrError::InitializationError(format!(
                "No {}.traineddata in {}",
                language,
                dir.display()
            )));
        }

        let tessdata_path = dir
            .to_str()
            .map(|s| s.to_string())
            .ok_or_else(|| OcrError::InitializationError("Invalid tessdata path".to_string()))?;

        // Validate that tessdata is accessible by doing a test initialization
        let test_tess = Tesseract::new(Some(&tessdata_path), Some(language)).map_err(|e| {
            OcrError::InitializationError(format!("Failed to initialize Tesseract: {}", e))
        })?;
        drop(test_tess);

        tracing::info!(
            "Tesseract engine initialized (tessdata: {}, languages: {})",
            tessdata_path,
            languages.join(",")
        );

        Ok(Self {
            tessdata_path,
            languages,
        })
    }
}

impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn supported_languages(&self) -> Vec<String> {
        self.languages.clone()
    }

    fn recognize(
        &self,
        buffer: &PixelBuffer,
        language: &str,
        on_progress: &mut dyn FnMut(Progress),
    ) -> Result<OcrResult, OcrError> {
        on_progress(Progress::new(0, "initializing tesseract"));

        // BMP is always supported by leptonica
        let rgb = buffer.clone().into_image().into_rgb8();
        let (width, height) = rgb.dimensions();
        let mut bmp_data = Vec::new();
        rgb.write_to(&mut std::io::Cursor::new(&mut bmp_data), image::ImageFormat::Bmp)
            .map_err(|e| OcrError::ProcessingError(format!("Failed to convert to BMP: {}", e)))?;

        tracing::debug!(
            "Recognizing image: {}x{}, BMP size: {} bytes",
            width,
            height,
            bmp_data.len()
        );

        let mut tess = Tesseract::new(Some(&self.tessdata_path), Some(language))
            .map_err(|e| OcrError::ProcessingError(format!("Failed to create Tesseract: {}", e)))?;

        tess = tess.set_image_from_mem(&bmp_data).map_err(|e| {
            OcrError::ProcessingError(format!(
                "Failed to set image ({}x{}, {} bytes): {}",
                width,
                height,
                bmp_data.len(),
                e
            ))
        })?;

        on_progress(Progress::new(10, "recognizing text"));
        tess = tess
            .recognize()
            .map_err(|e| OcrError::ProcessingError(format!("Failed to recognize text: {}", e)))?;

        let text = tess
            .get_text()
            .map_err(|e| OcrError::ProcessingError(format!("Failed to get text: {}", e)))?;
        let confidence = tess.mean_text_conf() as f32;
        on_progress(Progress::new(100, "recognizing text"));

        Ok(OcrResult { text, confidence })
    }
}

fn resolve_tessdata_dir(explicit: Option<&Path>) -> Result<PathBuf, OcrError> {
    if let Some(path) = explicit {
        return Ok(path.to_path_buf());
    }
    if let Some(prefix) = std::env::var_os("TESSDATA_PREFIX") {
        return Ok(PathBuf::from(prefix));
    }
    dirs::data_dir()
        .map(|dir| dir.join("handwriting-prep").join("tessdata"))
        .ok_or_else(|| {
            OcrError::InitializationError("Could not determine a tessdata directory".to_string())
        })
}

/// Languages are named after their `<lang>.traineddata` files
fn installed_languages(dir: &Path) -> Result<Vec<String>, OcrError> {
    let entries = std::fs::read_dir(dir).map_err(|e| {
        OcrError::InitializationError(format!("Failed to read {}: {}", dir.display(), e))
    })?;

    let mut languages: Vec<String> = entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| {
            let path = entry.path();
            if path.extension()? != "traineddata" {
                return None;
            }
            path.file_stem()?.to_str().map(|s| s.to_string())
        })
        .collect();
    languages.sort();
    Ok(languages)
}
