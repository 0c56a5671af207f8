use crate::error::{PreprocessingError, Stage};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use imageproc::stats::histogram;
use std::io::Cursor;
use std::path::Path;

/// Number of luminance levels in a histogram
pub const LEVELS: usize = 256;

/// 256-bin luminance histogram
pub type Histogram = [u32; LEVELS];

/// RGBA8 image that every preprocessing step reads and writes.
///
/// Width and height are always non-zero and the sample vector always holds
/// `4 * width * height` bytes. No step modifies the alpha channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    image: RgbaImage,
}

impl PixelBuffer {
    /// Build a buffer from raw RGBA samples
    pub fn new(width: u32, height: u32, samples: Vec<u8>) -> Result<Self, PreprocessingError> {
        check_dimensions(Stage::Decode, width, height)?;
        let expected = 4 * width as usize * height as usize;
        if samples.len() != expected {
            return Err(PreprocessingError::DecodeFailure(format!(
                "expected {} samples for {}x{} RGBA, got {}",
                expected,
                width,
                height,
                samples.len()
            )));
        }
        let image = RgbaImage::from_raw(width, height, samples)
            .ok_or_else(|| PreprocessingError::DecodeFailure("sample buffer too small".to_string()))?;
        Ok(Self { image })
    }

    /// A buffer with every pixel set to the same RGBA value
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, PreprocessingError> {
        check_dimensions(Stage::Decode, width, height)?;
        Ok(Self {
            image: RgbaImage::from_pixel(width, height, Rgba(rgba)),
        })
    }

    /// Wrap an already-decoded image, converting it to RGBA8
    pub fn from_image(image: DynamicImage) -> Result<Self, PreprocessingError> {
        check_dimensions(Stage::Decode, image.width(), image.height())?;
        Ok(Self {
            image: image.into_rgba8(),
        })
    }

    /// Decode encoded image bytes (PNG, JPEG, BMP, ...)
    pub fn decode(bytes: &[u8]) -> Result<Self, PreprocessingError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| PreprocessingError::DecodeFailure(e.to_string()))?;
        Self::from_image(image)
    }

    /// Load and decode an image file
    pub fn open(path: &Path) -> Result<Self, PreprocessingError> {
        let image = image::open(path).map_err(|e| {
            PreprocessingError::DecodeFailure(format!("{}: {}", path.display(), e))
        })?;
        Self::from_image(image)
    }

    /// Encode as PNG, the representation handed to the OCR engine
    pub fn encode_png(&self) -> Result<Vec<u8>, PreprocessingError> {
        let mut bytes = Vec::new();
        self.image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|e| PreprocessingError::EncodeFailure(e.to_string()))?;
        Ok(bytes)
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Raw samples in R, G, B, A order
    pub fn as_raw(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.image.get_pixel(x, y).0
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub(crate) fn as_image_mut(&mut self) -> &mut RgbaImage {
        &mut self.image
    }

    pub fn into_image(self) -> DynamicImage {
        DynamicImage::ImageRgba8(self.image)
    }

    /// Luminance histogram, read from the red channel.
    /// Only meaningful once grayscale has made R == G == B.
    pub fn histogram(&self) -> Histogram {
        let mut channels = histogram(&self.image).channels;
        channels.swap_remove(0)
    }

    /// Total pixel count
    pub fn pixel_count(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }
}

pub(crate) fn check_dimensions(
    stage: Stage,
    width: u32,
    height: u32,
) -> Result<(), PreprocessingError> {
    if width == 0 || height == 0 {
        return Err(PreprocessingError::InvalidDimensions {
            stage,
            width,
            height,
        });
    }
    Ok(())
}
