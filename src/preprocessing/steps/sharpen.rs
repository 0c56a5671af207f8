use crate::error::PreprocessingError;
use crate::preprocessing::PixelBuffer;
use image::RgbaImage;

/// Apply a 3x3 convolution to R, G and B of every interior pixel.
///
/// All sums are read from a snapshot of the input taken before any output is
/// written, so the result does not depend on sweep order. The outermost rows
/// and columns are copied through untouched, which also means images narrower
/// or shorter than 3 pixels come back unchanged.
pub fn apply(buffer: PixelBuffer, kernel: &[i32; 9]) -> Result<PixelBuffer, PreprocessingError> {
    let (width, height) = buffer.dimensions();
    if width < 3 || height < 3 {
        return Ok(buffer);
    }

    let source = buffer.as_image();
    let sharpened = RgbaImage::from_fn(width, height, |x, y| {
        let original = *source.get_pixel(x, y);
        if x == 0 || y == 0 || x == width - 1 || y == height - 1 {
            return original;
        }
        let mut out = original;
        for (channel, sample) in out.0[..3].iter_mut().enumerate() {
            *sample = convolve_at(source, kernel, x, y, channel);
        }
        out
    });

    let mut buffer = buffer;
    *buffer.as_image_mut() = sharpened;
    Ok(buffer)
}

/// Weighted 3x3 neighborhood sum for one channel, clamped to a sample
fn convolve_at(source: &RgbaImage, kernel: &[i32; 9], x: u32, y: u32, channel: usize) -> u8 {
    let mut sum = 0i64;
    for ky in 0..3u32 {
        for kx in 0..3u32 {
            let weight = kernel[(ky * 3 + kx) as usize];
            if weight == 0 {
                continue;
            }
            let neighbor = source.get_pixel(x + kx - 1, y + ky - 1);
            sum += weight as i64 * neighbor.0[channel] as i64;
        }
    }
    sum.clamp(0, 255) as u8
}
