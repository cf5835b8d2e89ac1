//! Lossless GIF optimization at the block level.
//!
//! The stream is walked block by block and copied, except for comment
//! extensions, which are dropped. Pixel data is never decoded, so frames,
//! palettes and timing are untouched.

use std::path::Path;

use super::{Compressor, ImageKind};
use crate::error::{PipelineError, Result};

const EXTENSION: u8 = 0x21;
const IMAGE_DESCRIPTOR: u8 = 0x2C;
const TRAILER: u8 = 0x3B;
const COMMENT_LABEL: u8 = 0xFE;

#[derive(Debug, Default, Clone, Copy)]
pub struct GifCompressor;

impl Compressor for GifCompressor {
    fn name(&self) -> &'static str {
        "gif"
    }

    fn accepts(&self, kind: ImageKind) -> bool {
        kind == ImageKind::Gif
    }

    fn compress(&self, path: &Path, bytes: &[u8]) -> Result<Vec<u8>> {
        strip_comments(bytes).map_err(|message| PipelineError::Image {
            path: path.to_path_buf(),
            message: message.to_string(),
        })
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> std::result::Result<&'a [u8], &'static str> {
        let end = self.pos.checked_add(len).ok_or("truncated GIF stream")?;
        let slice = self.bytes.get(self.pos..end).ok_or("truncated GIF stream")?;
        self.pos = end;
        Ok(slice)
    }

    fn byte(&mut self) -> std::result::Result<u8, &'static str> {
        Ok(self.take(1)?[0])
    }

    /// A run of length-prefixed sub-blocks, including the zero terminator.
    fn sub_blocks(&mut self) -> std::result::Result<&'a [u8], &'static str> {
        let start = self.pos;
        loop {
            let len = self.byte()?;
            if len == 0 {
                return Ok(&self.bytes[start..self.pos]);
            }
            self.take(usize::from(len))?;
        }
    }
}

/// Size in bytes of a color table announced by a packed field, if any.
fn color_table_len(packed: u8) -> usize {
    if packed & 0x80 == 0 {
        0
    } else {
        3 * (1 << ((packed & 0x07) + 1))
    }
}

pub(crate) fn strip_comments(bytes: &[u8]) -> std::result::Result<Vec<u8>, &'static str> {
    let mut reader = Reader { bytes, pos: 0 };
    let mut out = Vec::with_capacity(bytes.len());

    let header = reader.take(6)?;
    if header != b"GIF87a" && header != b"GIF89a" {
        return Err("not a GIF file");
    }
    out.extend_from_slice(header);

    let screen = reader.take(7)?;
    out.extend_from_slice(screen);
    out.extend_from_slice(reader.take(color_table_len(screen[4]))?);

    loop {
        let start = reader.pos;
        match reader.byte()? {
            EXTENSION => {
                let label = reader.byte()?;
                reader.sub_blocks()?;
                if label != COMMENT_LABEL {
                    out.extend_from_slice(&bytes[start..reader.pos]);
                }
            }
            IMAGE_DESCRIPTOR => {
                let descriptor = reader.take(9)?;
                reader.take(color_table_len(descriptor[8]))?;
                // LZW minimum code size, then the data sub-blocks.
                reader.byte()?;
                reader.sub_blocks()?;
                out.extend_from_slice(&bytes[start..reader.pos]);
            }
            TRAILER => {
                out.push(TRAILER);
                return Ok(out);
            }
            _ => return Err("unknown GIF block"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::gif::{GifDecoder, GifEncoder};
    use image::{AnimationDecoder, Frame, Rgba, RgbaImage};

    fn sample_gif() -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut encoder = GifEncoder::new(&mut out);
            let image = RgbaImage::from_fn(4, 4, |x, y| {
                if (x + y) % 2 == 0 {
                    Rgba([255, 0, 0, 255])
                } else {
                    Rgba([0, 0, 255, 255])
                }
            });
            encoder.encode_frame(Frame::new(image)).unwrap();
        }
        out
    }

    /// Insert a comment extension right before the trailer.
    fn with_comment(gif: &[u8], text: &[u8]) -> Vec<u8> {
        let (body, trailer) = gif.split_at(gif.len() - 1);
        let mut out = body.to_vec();
        out.extend_from_slice(&[EXTENSION, COMMENT_LABEL, text.len() as u8]);
        out.extend_from_slice(text);
        out.push(0);
        out.extend_from_slice(trailer);
        out
    }

    fn frames(bytes: &[u8]) -> Vec<RgbaImage> {
        GifDecoder::new(bytes)
            .unwrap()
            .into_frames()
            .map(|frame| frame.unwrap().into_buffer())
            .collect()
    }

    #[test]
    fn comments_are_removed() {
        let plain = sample_gif();
        let commented = with_comment(&plain, b"made with love");
        let out = strip_comments(&commented).unwrap();

        assert!(out.len() < commented.len());
        assert!(!out.windows(4).any(|w| w == b"love"));
        assert_eq!(frames(&out), frames(&plain));
    }

    #[test]
    fn gif_without_comments_is_unchanged() {
        let plain = sample_gif();
        assert_eq!(strip_comments(&plain).unwrap(), plain);
    }

    #[test]
    fn truncated_stream_is_rejected() {
        let plain = sample_gif();
        assert!(strip_comments(&plain[..plain.len() / 2]).is_err());
        assert_eq!(strip_comments(b"PNG...").unwrap_err(), "not a GIF file");
    }
}
