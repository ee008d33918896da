use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma};
use serde::{Deserialize, Serialize};
use std::io::Cursor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to decode image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Tuning knobs for the normalizer. Defaults suit phone screenshots of slips.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeOptions {
    /// Images wider than this are scaled down; narrower ones are left alone.
    pub max_width: u32,
    /// Gaussian sigma of the unsharp mask.
    pub sharpen_sigma: f32,
    /// Minimum brightness difference the unsharp mask will act on.
    pub sharpen_threshold: i32,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self { max_width: 1200, sharpen_sigma: 1.0, sharpen_threshold: 0 }
    }
}

/// Decode raw image bytes (JPEG / PNG / WEBP / …) and return normalized PNG bytes.
pub fn prepare_for_ocr_from_bytes(
    data: &[u8],
    opts: &NormalizeOptions,
) -> Result<Vec<u8>, PreprocessError> {
    let img = image::load_from_memory(data)?;
    encode_as_png(normalize(img, opts))
}

/// Resize → grayscale → contrast stretch → sharpen. The order matters.
fn normalize(img: DynamicImage, opts: &NormalizeOptions) -> DynamicImage {
    let img = limit_width(img, opts.max_width);
    let gray = stretch_contrast(img.to_luma8());
    let sharpened: GrayImage = imageops::unsharpen(&gray, opts.sharpen_sigma, opts.sharpen_threshold);
    DynamicImage::ImageLuma8(sharpened)
}

fn limit_width(img: DynamicImage, max_width: u32) -> DynamicImage {
    let (w, h) = (img.width(), img.height());
    if max_width == 0 || w <= max_width {
        return img;
    }
    let new_h = ((h as u64 * max_width as u64) / w as u64).max(1) as u32;
    img.resize_exact(max_width, new_h, FilterType::Lanczos3)
}

fn stretch_contrast(gray: GrayImage) -> GrayImage {
    let (min_px, max_px) = gray
        .pixels()
        .fold((255u8, 0u8), |(mn, mx), p| (mn.min(p[0]), mx.max(p[0])));

    if max_px <= min_px {
        // Uniform (or empty) image: nothing to stretch.
        return gray;
    }

    let range = (max_px - min_px) as u32;
    ImageBuffer::from_fn(gray.width(), gray.height(), |x, y| {
        let p = gray.get_pixel(x, y)[0];
        Luma([((p - min_px) as u32 * 255 / range) as u8])
    })
}

fn encode_as_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}
