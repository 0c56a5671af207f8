use crate::error::PreprocessingError;
use crate::preprocessing::PixelBuffer;

/// ITU-R BT.601 luma weights
const RED_WEIGHT: f32 = 0.299;
const GREEN_WEIGHT: f32 = 0.587;
const BLUE_WEIGHT: f32 = 0.114;

/// Luminance of one RGB sample, rounded to the nearest level
pub fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let luma = RED_WEIGHT * r as f32 + GREEN_WEIGHT * g as f32 + BLUE_WEIGHT * b as f32;
    luma.round().clamp(0.0, 255.0) as u8
}

/// Convert image to grayscale
/// Luminance is written back into R, G and B so later steps can read any channel
pub fn apply(mut buffer: PixelBuffer) -> Result<PixelBuffer, PreprocessingError> {
    for pixel in buffer.as_image_mut().pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let luma = luminance(r, g, b);
        pixel.0[0] = luma;
        pixel.0[1] = luma;
        pixel.0[2] = luma;
    }
    Ok(buffer)
}
