//! Lossless PNG re-encoding.

use std::path::Path;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ImageEncoder, ImageFormat};

use super::{Compressor, ImageKind};
use crate::error::{PipelineError, Result};

/// Decodes and re-encodes at the best zlib level with adaptive filtering.
///
/// Pixels are preserved exactly; ancillary chunks are dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct PngCompressor;

impl Compressor for PngCompressor {
    fn name(&self) -> &'static str {
        "png"
    }

    fn accepts(&self, kind: ImageKind) -> bool {
        kind == ImageKind::Png
    }

    fn compress(&self, path: &Path, bytes: &[u8]) -> Result<Vec<u8>> {
        let image_error = |message: String| PipelineError::Image {
            path: path.to_path_buf(),
            message,
        };

        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)
            .map_err(|e| image_error(e.to_string()))?;

        let mut out = Vec::new();
        PngEncoder::new_with_quality(&mut out, CompressionType::Best, FilterType::Adaptive)
            .write_image(image.as_bytes(), image.width(), image.height(), image.color())
            .map_err(|e| image_error(e.to_string()))?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    fn fast_png(image: &RgbaImage) -> Vec<u8> {
        let mut out = Vec::new();
        PngEncoder::new_with_quality(&mut out, CompressionType::Fast, FilterType::NoFilter)
            .write_image(image.as_raw(), image.width(), image.height(), image::ColorType::Rgba8)
            .unwrap();
        out
    }

    #[test]
    fn pixels_survive_reencoding() {
        let source = RgbaImage::from_fn(32, 32, |x, y| Rgba([x as u8 * 8, y as u8 * 8, 0, 255]));
        let out = PngCompressor
            .compress(Path::new("a.png"), &fast_png(&source))
            .unwrap();

        let decoded = image::load_from_memory(&out).unwrap().to_rgba8();
        assert_eq!(decoded, source);
    }

    #[test]
    fn garbage_is_an_error() {
        assert!(PngCompressor.compress(Path::new("a.png"), b"\x89PNG nope").is_err());
    }
}
