//! Image optimization.
//!
//! Every matched file runs through an ordered list of [`Compressor`]s. Each
//! compressor only touches the kinds it accepts, and a result replaces the
//! current bytes only when it is strictly smaller, so an output is never
//! larger than its source. Files of unknown type are copied unchanged.

mod gif;
mod jpeg;
mod png;
mod svg;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use spout_config::{Category, ImageOptions};

use crate::context::BuildContext;
use crate::error::Result;
use crate::file::{glob_entries, SourceEntry};
use crate::steps::blocking;
use crate::task::{StepReport, Task};

pub use gif::GifCompressor;
pub use jpeg::JpegCompressor;
pub use png::PngCompressor;
pub use svg::SvgCompressor;

/// Image types with a dedicated compressor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
    Gif,
    Svg,
    Other,
}

impl ImageKind {
    /// Classify by file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "jpg" | "jpeg" => ImageKind::Jpeg,
            "png" => ImageKind::Png,
            "gif" => ImageKind::Gif,
            "svg" => ImageKind::Svg,
            _ => ImageKind::Other,
        }
    }
}

/// One optimizer in the image chain.
pub trait Compressor: Send + Sync {
    fn name(&self) -> &'static str;

    fn accepts(&self, kind: ImageKind) -> bool;

    /// Produce a candidate encoding. The caller decides whether to keep it.
    fn compress(&self, path: &Path, bytes: &[u8]) -> Result<Vec<u8>>;
}

/// The default chain: JPEG, GIF, PNG, SVG.
pub fn default_compressors(options: &ImageOptions) -> Vec<Arc<dyn Compressor>> {
    vec![
        Arc::new(JpegCompressor::new(options)),
        Arc::new(GifCompressor),
        Arc::new(PngCompressor),
        Arc::new(SvgCompressor),
    ]
}

/// Run `bytes` through every compressor that accepts `kind`.
pub fn optimize(compressors: &[Arc<dyn Compressor>], path: &Path, bytes: Vec<u8>) -> Result<Vec<u8>> {
    let kind = ImageKind::from_path(path);
    let mut current = bytes;
    for compressor in compressors.iter().filter(|c| c.accepts(kind)) {
        let candidate = compressor.compress(path, &current)?;
        if candidate.len() < current.len() {
            tracing::debug!(
                "{} {}: {} -> {} bytes",
                compressor.name(),
                path.display(),
                current.len(),
                candidate.len()
            );
            current = candidate;
        } else {
            tracing::debug!("{} {}: kept original", compressor.name(), path.display());
        }
    }
    Ok(current)
}

/// Optimizes the files directly under the image directory.
#[derive(Debug, Default, Clone, Copy)]
pub struct ImageStep;

#[async_trait]
impl Task for ImageStep {
    fn name(&self) -> &'static str {
        "images"
    }

    async fn run(&self, ctx: &BuildContext) -> Result<StepReport> {
        let paths = ctx.paths();
        let out_dir = paths.output_for(Category::Images);
        let compressors: Arc<[Arc<dyn Compressor>]> =
            default_compressors(&ctx.config().images).into();

        let entries: Vec<SourceEntry> = glob_entries(paths.root(), paths.patterns_for(Category::Images))?
            .into_iter()
            .filter(|entry| !entry.is_dir)
            .collect();

        let written = try_join_all(entries.iter().map(|entry| {
            let compressors = Arc::clone(&compressors);
            let out_dir = &out_dir;
            async move {
                let mut item = entry.load().await?;
                let path = entry.path.clone();
                let contents = std::mem::take(&mut item.contents);
                item.contents = blocking(move || optimize(&compressors, &path, contents)).await?;
                item.write_to(out_dir).await
            }
        }))
        .await?;

        let mut report = StepReport::new(self.name());
        report.outputs = written;
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;

    struct Fixed(Vec<u8>);

    impl Compressor for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn accepts(&self, kind: ImageKind) -> bool {
            kind == ImageKind::Png
        }

        fn compress(&self, _path: &Path, _bytes: &[u8]) -> Result<Vec<u8>> {
            Ok(self.0.clone())
        }
    }

    struct Broken;

    impl Compressor for Broken {
        fn name(&self) -> &'static str {
            "broken"
        }

        fn accepts(&self, _kind: ImageKind) -> bool {
            true
        }

        fn compress(&self, path: &Path, _bytes: &[u8]) -> Result<Vec<u8>> {
            Err(PipelineError::Image {
                path: path.to_path_buf(),
                message: "cannot decode".to_string(),
            })
        }
    }

    #[test]
    fn kind_from_extension() {
        assert_eq!(ImageKind::from_path(Path::new("a/logo.JPG")), ImageKind::Jpeg);
        assert_eq!(ImageKind::from_path(Path::new("photo.jpeg")), ImageKind::Jpeg);
        assert_eq!(ImageKind::from_path(Path::new("icon.svg")), ImageKind::Svg);
        assert_eq!(ImageKind::from_path(Path::new("anim.gif")), ImageKind::Gif);
        assert_eq!(ImageKind::from_path(Path::new("favicon.ico")), ImageKind::Other);
        assert_eq!(ImageKind::from_path(Path::new("README")), ImageKind::Other);
    }

    #[test]
    fn smaller_candidate_replaces_source() {
        let chain: Vec<Arc<dyn Compressor>> = vec![Arc::new(Fixed(vec![1]))];
        let out = optimize(&chain, Path::new("a.png"), vec![1, 2, 3]).unwrap();
        assert_eq!(out, [1]);
    }

    #[test]
    fn larger_candidate_is_discarded() {
        let chain: Vec<Arc<dyn Compressor>> = vec![Arc::new(Fixed(vec![0; 10]))];
        let out = optimize(&chain, Path::new("a.png"), vec![1, 2, 3]).unwrap();
        assert_eq!(out, [1, 2, 3]);
    }

    #[test]
    fn compressors_skip_other_kinds() {
        let chain: Vec<Arc<dyn Compressor>> = vec![Arc::new(Fixed(vec![]))];
        let out = optimize(&chain, Path::new("a.webp"), vec![9, 9]).unwrap();
        assert_eq!(out, [9, 9]);
    }

    #[test]
    fn compressor_failure_propagates() {
        let chain: Vec<Arc<dyn Compressor>> = vec![Arc::new(Broken)];
        let err = optimize(&chain, Path::new("a.jpg"), vec![0]).unwrap_err();
        assert!(err.to_string().contains("cannot decode"));
    }
}
