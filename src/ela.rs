//! Error level analysis.
//!
//! Re-encodes the decoded image as JPEG at a fixed quality and measures the
//! per-pixel difference against the original. Uniform error levels are
//! typical of a straight-from-camera file; localized differences can point
//! at edited regions. The output is advisory, never a verdict.

use crate::config::ElaConfig;
use crate::error::AppError;
use crate::metadata::ElaResult;
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, GrayImage, ImageFormat};

pub struct ElaOutcome {
    pub result: ElaResult,
    pub visualization: GrayImage,
}

/// Run the recompression-difference analysis. Deterministic for a fixed
/// image and quality setting.
pub fn analyze(original: &DynamicImage, config: &ElaConfig) -> Result<ElaOutcome, AppError> {
    let rgb = original.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(AppError::Generic("empty image".to_string()));
    }

    let mut recompressed_bytes = Vec::new();
    let mut encoder = JpegEncoder::new_with_quality(&mut recompressed_bytes, config.quality);
    encoder.encode(rgb.as_raw(), width, height, ColorType::Rgb8)?;

    let recompressed =
        image::load_from_memory_with_format(&recompressed_bytes, ImageFormat::Jpeg)?.to_rgb8();

    let mut sum: u64 = 0;
    let mut sum_sq: u64 = 0;
    let mut max_diff: u8 = 0;
    let mut visualization = GrayImage::new(width, height);

    for (x, y, out) in visualization.enumerate_pixels_mut() {
        let a = rgb.get_pixel(x, y);
        let b = recompressed.get_pixel(x, y);
        let mut pixel_max = 0u8;
        for c in 0..3 {
            let diff = a[c].abs_diff(b[c]);
            sum += diff as u64;
            sum_sq += (diff as u64) * (diff as u64);
            pixel_max = pixel_max.max(diff);
        }
        max_diff = max_diff.max(pixel_max);
        let amplified = (pixel_max as u32) * (config.amplification as u32);
        out[0] = amplified.min(255) as u8;
    }

    let samples = (width as u64) * (height as u64) * 3;
    let mean = sum as f64 / samples as f64;
    let rms = (sum_sq as f64 / samples as f64).sqrt();

    Ok(ElaOutcome {
        result: ElaResult {
            quality: config.quality,
            mean_difference: (mean * 1000.0).round() / 1000.0,
            rms_difference: (rms * 1000.0).round() / 1000.0,
            max_difference: max_diff,
            assessment: assess(mean, config),
        },
        visualization,
    })
}

/// Advisory assessment text for a mean difference, using configured
/// thresholds.
pub fn assess(mean: f64, config: &ElaConfig) -> String {
    if mean >= config.high_threshold {
        "High error level variance detected; parts of the image may have been altered"
            .to_string()
    } else if mean >= config.low_threshold {
        "Moderate error level variance detected".to_string()
    } else {
        "Low error level variance; no obvious recompression artifacts".to_string()
    }
}
