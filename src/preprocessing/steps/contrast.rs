use crate::config::MAX_CONTRAST_STRENGTH;
use crate::error::{PreprocessingError, Stage};
use crate::preprocessing::PixelBuffer;

/// Mid-gray, the fixed point of the contrast stretch
const MIDPOINT: f32 = 128.0;

/// Scaling factor for a contrast strength
///
/// factor = 259 * (strength + 255) / (255 * (259 - strength))
///
/// A strength of 0 gives exactly 1.0. Strengths at or above 259 are rejected:
/// 259 makes the denominator zero and anything larger inverts the image.
pub fn factor(strength: f32) -> Result<f32, PreprocessingError> {
    if !strength.is_finite() || strength >= MAX_CONTRAST_STRENGTH {
        return Err(PreprocessingError::invalid_config(
            Stage::Contrast,
            format!("contrast strength {} gives a singular scaling factor", strength),
        ));
    }
    Ok((259.0 * (strength + 255.0)) / (255.0 * (259.0 - strength)))
}

/// Stretch contrast linearly around mid-gray
pub fn apply(mut buffer: PixelBuffer, strength: f32) -> Result<PixelBuffer, PreprocessingError> {
    let factor = factor(strength)?;
    let lut = lookup_table(factor);

    for pixel in buffer.as_image_mut().pixels_mut() {
        for channel in &mut pixel.0[..3] {
            *channel = lut[*channel as usize];
        }
    }
    Ok(buffer)
}

/// Every sample maps independently, so precompute all 256 outputs
fn lookup_table(factor: f32) -> [u8; 256] {
    let mut lut = [0u8; 256];
    for (value, out) in lut.iter_mut().enumerate() {
        let stretched = factor * (value as f32 - MIDPOINT) + MIDPOINT;
        *out = stretched.round().clamp(0.0, 255.0) as u8;
    }
    lut
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn gradient() -> PixelBuffer {
        let mut buffer = PixelBuffer::filled(256, 1, [0, 0, 0, 255]).unwrap();
        for x in 0..256u32 {
            let v = x as u8;
            buffer.as_image_mut().put_pixel(x, 0, Rgba([v, v, v, 200]));
        }
        buffer
    }

    #[test]
    fn test_zero_strength_is_identity() {
        assert_eq!(factor(0.0).unwrap(), 1.0);

        let original = gradient();
        let result = apply(original.clone(), 0.0).unwrap();
        assert_eq!(result, original);
    }

    #[test]
    fn test_midpoint_is_fixed() {
        for strength in [-200.0, -50.0, 50.0, 128.0, 250.0] {
            let buffer = PixelBuffer::filled(2, 2, [128, 128, 128, 255]).unwrap();
            let result = apply(buffer, strength).unwrap();
            assert_eq!(result.pixel(1, 1), [128, 128, 128, 255], "strength {}", strength);
        }
    }

    #[test]
    fn test_positive_strength_spreads_values() {
        let result = apply(gradient(), 50.0).unwrap();

        // factor(50) = 259 * 305 / (255 * 209) ~= 1.4822
        assert_eq!(result.pixel(100, 0)[0], 86);
        assert_eq!(result.pixel(160, 0)[0], 175);
        // Extremes clip rather than wrap
        assert_eq!(result.pixel(0, 0)[0], 0);
        assert_eq!(result.pixel(255, 0)[0], 255);
        // Alpha untouched
        assert_eq!(result.pixel(10, 0)[3], 200);
    }

    #[test]
    fn test_output_stays_in_range_for_extreme_strength() {
        let result = apply(gradient(), 258.0).unwrap();
        for pixel in result.as_image().pixels() {
            assert!(pixel.0[0] == 0 || pixel.0[0] == 255 || pixel.0[0] == 128);
        }
    }

    #[test]
    fn test_singular_strength_is_rejected() {
        let err = apply(gradient(), 259.0).unwrap_err();
        assert_eq!(err.stage(), Stage::Contrast);
        assert!(factor(f32::INFINITY).is_err());
    }
}
