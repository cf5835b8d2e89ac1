//! Lossy JPEG recompression.
//!
//! Binary search over the configured quality range: each pass encodes at the
//! midpoint, decodes the candidate and compares its luma channel with the
//! source using mean SSIM over 8x8 blocks. The lowest quality reaching the
//! target wins; when no pass reaches it the upper bound is used.

use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, DynamicImage, GrayImage, ImageFormat};
use spout_config::ImageOptions;

use super::{Compressor, ImageKind};
use crate::error::{PipelineError, Result};

const BLOCK: u32 = 8;
const C1: f64 = (0.01 * 255.0) * (0.01 * 255.0);
const C2: f64 = (0.03 * 255.0) * (0.03 * 255.0);

#[derive(Debug, Clone)]
pub struct JpegCompressor {
    loops: u32,
    min: u8,
    max: u8,
    target: f64,
}

impl JpegCompressor {
    pub fn new(options: &ImageOptions) -> Self {
        Self {
            loops: options.loops,
            min: options.min,
            max: options.max,
            target: options.quality.ssim_target(),
        }
    }

    fn search(&self, path: &Path, image: &DynamicImage) -> Result<Vec<u8>> {
        let reference = image.to_luma8();
        let (mut lo, mut hi) = (self.min, self.max);
        let mut best = None;

        for _ in 0..self.loops {
            if lo > hi {
                break;
            }
            let quality = lo + (hi - lo) / 2;
            let candidate = encode(path, image, quality)?;
            let decoded = decode(path, &candidate)?.to_luma8();
            let score = mean_ssim(&reference, &decoded);
            tracing::trace!(quality, score, "{}", path.display());

            if score >= self.target {
                best = Some(candidate);
                match quality.checked_sub(1) {
                    Some(next) => hi = next,
                    None => break,
                }
            } else {
                lo = quality + 1;
            }
        }

        match best {
            Some(bytes) => Ok(bytes),
            None => encode(path, image, self.max),
        }
    }
}

impl Compressor for JpegCompressor {
    fn name(&self) -> &'static str {
        "jpeg"
    }

    fn accepts(&self, kind: ImageKind) -> bool {
        kind == ImageKind::Jpeg
    }

    fn compress(&self, path: &Path, bytes: &[u8]) -> Result<Vec<u8>> {
        let image = decode(path, bytes)?;
        self.search(path, &image)
    }
}

fn decode(path: &Path, bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory_with_format(bytes, ImageFormat::Jpeg).map_err(|e| PipelineError::Image {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn encode(path: &Path, image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let result = {
        let mut encoder = JpegEncoder::new_with_quality(&mut out, quality);
        match image {
            DynamicImage::ImageLuma8(gray) => {
                encoder.encode(gray.as_raw(), gray.width(), gray.height(), ColorType::L8)
            }
            other => {
                let rgb = other.to_rgb8();
                encoder.encode(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
            }
        }
    };
    result.map_err(|e| PipelineError::Image {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(out)
}

/// Mean structural similarity of two equally sized grayscale images.
pub(crate) fn mean_ssim(a: &GrayImage, b: &GrayImage) -> f64 {
    if a.dimensions() != b.dimensions() {
        return 0.0;
    }
    let (width, height) = a.dimensions();
    let mut total = 0.0;
    let mut blocks = 0u32;

    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let w = BLOCK.min(width - x);
            let h = BLOCK.min(height - y);
            total += block_ssim(a, b, x, y, w, h);
            blocks += 1;
            x += BLOCK;
        }
        y += BLOCK;
    }

    if blocks == 0 {
        1.0
    } else {
        total / f64::from(blocks)
    }
}

fn block_ssim(a: &GrayImage, b: &GrayImage, x0: u32, y0: u32, w: u32, h: u32) -> f64 {
    let n = f64::from(w * h);
    let (mut sum_a, mut sum_b) = (0.0, 0.0);
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            sum_a += f64::from(a.get_pixel(x, y)[0]);
            sum_b += f64::from(b.get_pixel(x, y)[0]);
        }
    }
    let (mean_a, mean_b) = (sum_a / n, sum_b / n);

    let (mut var_a, mut var_b, mut cov) = (0.0, 0.0, 0.0);
    for y in y0..y0 + h {
        for x in x0..x0 + w {
            let da = f64::from(a.get_pixel(x, y)[0]) - mean_a;
            let db = f64::from(b.get_pixel(x, y)[0]) - mean_b;
            var_a += da * da;
            var_b += db * db;
            cov += da * db;
        }
    }
    var_a /= n;
    var_b /= n;
    cov /= n;

    ((2.0 * mean_a * mean_b + C1) * (2.0 * cov + C2))
        / ((mean_a * mean_a + mean_b * mean_b + C1) * (var_a + var_b + C2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgb, RgbImage};

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8])
        }))
    }

    #[test]
    fn identical_images_score_one() {
        let img = gradient(20, 12).to_luma8();
        assert!((mean_ssim(&img, &img) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn different_images_score_lower() {
        let a = GrayImage::from_fn(16, 16, |x, _| Luma([(x * 16) as u8]));
        let b = GrayImage::from_fn(16, 16, |_, y| Luma([(y * 16) as u8]));
        assert!(mean_ssim(&a, &b) < 0.9);
    }

    #[test]
    fn mismatched_sizes_score_zero() {
        let a = GrayImage::new(8, 8);
        let b = GrayImage::new(4, 4);
        assert_eq!(mean_ssim(&a, &b), 0.0);
    }

    #[test]
    fn recompressed_output_is_a_jpeg() {
        let source = encode(Path::new("src.jpg"), &gradient(64, 48), 100).unwrap();
        let compressor = JpegCompressor::new(&ImageOptions::default());
        let out = compressor.compress(Path::new("src.jpg"), &source).unwrap();

        let decoded = decode(Path::new("out.jpg"), &out).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
        assert!(out.len() < source.len());
    }

    #[test]
    fn invalid_jpeg_is_an_error() {
        let compressor = JpegCompressor::new(&ImageOptions::default());
        let err = compressor
            .compress(Path::new("broken.jpg"), b"not a jpeg")
            .unwrap_err();
        assert!(matches!(err, PipelineError::Image { .. }));
    }
}
