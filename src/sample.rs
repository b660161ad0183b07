//! Pixel sampling: reduce a raw RGBA buffer to a bounded list of opaque,
//! mid-brightness RGB samples suitable for clustering.

use image::{DynamicImage, GenericImageView, imageops::FilterType};
use palette::Srgb;

use crate::error::{PaletteError, Result};
use crate::swatch::Swatch;

/// Filtering and downsampling policy applied before quantization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplerConfig {
    /// Pixels with alpha below this are skipped.
    pub min_alpha: u8,
    /// Exclusive lower bound on `r + g + b` (drops near-black).
    pub min_brightness: u16,
    /// Exclusive upper bound on `r + g + b` (drops near-white).
    pub max_brightness: u16,
    /// Visit every `stride`-th pixel.
    pub stride: usize,
    /// Upper bound on the number of retained samples.
    pub max_samples: usize,
    /// Longest image side after downscaling, for the decoded-image path.
    pub max_side: u32,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            min_alpha: 200,
            min_brightness: 15,
            max_brightness: 750,
            stride: 2,
            max_samples: 90_000,
            max_side: 300,
        }
    }
}

impl SamplerConfig {
    #[inline]
    fn accepts(&self, px: &[u8]) -> bool {
        if px[3] < self.min_alpha {
            return false;
        }
        let brightness = px[0] as u16 + px[1] as u16 + px[2] as u16;
        brightness > self.min_brightness && brightness < self.max_brightness
    }
}

/// Collect RGB samples from a flat RGBA buffer (4 bytes per pixel).
///
/// The stride is widened when needed so that at most `max_samples` pixels are
/// visited, which keeps the samples spread over the whole image instead of
/// truncating at the top rows.
pub fn sample_rgba(raw: &[u8], config: &SamplerConfig) -> Result<Vec<Srgb<u8>>> {
    if raw.len() % 4 != 0 {
        return Err(PaletteError::InvalidBufferLength(raw.len()));
    }
    let pixel_count = raw.len() / 4;
    if pixel_count == 0 || config.max_samples == 0 {
        return Ok(Vec::new());
    }

    let stride = config
        .stride
        .max(1)
        .max(pixel_count.div_ceil(config.max_samples));

    let samples: Vec<Srgb<u8>> = raw
        .chunks_exact(4)
        .step_by(stride)
        .filter(|px| config.accepts(px))
        .map(|px| Srgb::new(px[0], px[1], px[2]))
        .take(config.max_samples)
        .collect();

    log::debug!(
        "sampled {} of {} pixels (stride {})",
        samples.len(),
        pixel_count,
        stride
    );
    Ok(samples)
}

/// Downscale so the longest side is at most `max_side`, keeping the aspect
/// ratio. Smaller images are returned unchanged.
pub fn downscale(img: &DynamicImage, max_side: u32) -> DynamicImage {
    let (orig_w, orig_h) = img.dimensions();
    let longest = orig_w.max(orig_h);
    if max_side == 0 || longest <= max_side {
        return img.clone();
    }
    let ratio = max_side as f32 / longest as f32;
    let w = ((orig_w as f32) * ratio).round().max(1.0) as u32;
    let h = ((orig_h as f32) * ratio).round().max(1.0) as u32;
    DynamicImage::ImageRgba8(image::imageops::resize(img, w, h, FilterType::Triangle))
}

/// Downscale a decoded image and sample its pixels.
pub fn sample_image(img: &DynamicImage, config: &SamplerConfig) -> Result<Vec<Srgb<u8>>> {
    let raw = downscale(img, config.max_side).to_rgba8().into_raw();
    sample_rgba(&raw, config)
}

/// Color of the single pixel at `(x, y)`.
pub fn swatch_at(img: &DynamicImage, x: u32, y: u32) -> Result<Swatch> {
    let (width, height) = img.dimensions();
    if x >= width || y >= height {
        return Err(PaletteError::PixelOutOfBounds {
            x,
            y,
            width,
            height,
        });
    }
    let px = img.get_pixel(x, y).0;
    Ok(Swatch::new(Srgb::new(px[0], px[1], px[2])))
}
