use crate::config::Threshold;
use crate::error::PreprocessingError;
use crate::preprocessing::buffer::{Histogram, LEVELS};
use crate::preprocessing::PixelBuffer;

/// Binarize the image: luminance above the cut-off becomes white, the rest black.
///
/// With `Threshold::Auto` the cut-off is chosen by Otsu's method over the
/// buffer's current histogram. Returns the image and the cut-off that was used.
pub fn apply(
    mut buffer: PixelBuffer,
    threshold: Threshold,
) -> Result<(PixelBuffer, u8), PreprocessingError> {
    let level = match threshold {
        Threshold::Fixed(level) => level,
        Threshold::Auto => otsu_level(&buffer.histogram()),
    };

    for pixel in buffer.as_image_mut().pixels_mut() {
        let binary = if pixel.0[0] > level { 255 } else { 0 };
        pixel.0[0] = binary;
        pixel.0[1] = binary;
        pixel.0[2] = binary;
    }

    Ok((buffer, level))
}

/// Otsu's method: the level that maximizes inter-class variance.
///
/// Background is every level `<= t`, foreground every level `> t`. Candidates
/// are scanned in ascending order and only a strictly larger variance replaces
/// the current best, so plateaus resolve to their lowest level.
///
/// A histogram with a single occupied level has zero variance everywhere; that
/// level is returned so the image lands entirely on the ink side. An empty
/// histogram returns 0.
pub fn otsu_level(histogram: &Histogram) -> u8 {
    let total: u64 = histogram.iter().map(|&c| c as u64).sum();
    if total == 0 {
        return 0;
    }

    let mut occupied = histogram.iter().enumerate().filter(|(_, count)| **count > 0);
    if let (Some((only, _)), None) = (occupied.next(), occupied.next()) {
        return only as u8;
    }

    let total = total as f64;
    let weighted_total: f64 = histogram
        .iter()
        .enumerate()
        .map(|(level, &count)| level as f64 * count as f64)
        .sum();

    let mut background = 0f64;
    let mut background_sum = 0f64;
    let mut best_variance = 0f64;
    let mut best_level = 0u8;

    for level in 0..LEVELS {
        let count = histogram[level] as f64;
        background += count;
        background_sum += level as f64 * count;
        if background == 0.0 {
            continue;
        }
        let foreground = total - background;
        if foreground == 0.0 {
            break;
        }

        let weight_bg = background / total;
        let weight_fg = foreground / total;
        let mean_bg = background_sum / background;
        let mean_fg = (weighted_total - background_sum) / foreground;
        let variance = weight_bg * weight_fg * (mean_bg - mean_fg).powi(2);

        if variance > best_variance {
            best_variance = variance;
            best_level = level as u8;
        }
    }

    best_level
}
