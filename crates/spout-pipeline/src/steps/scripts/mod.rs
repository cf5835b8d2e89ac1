//! Script optimization and minification.
//!
//! Top-level files go straight through a [`ScriptPipeline`]. A top-level
//! directory is first concatenated into one `<dir>.js` bundle made of the
//! `*.js` files directly inside it, in file name order.

mod minify;
mod optimize;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::future::join_all;
use oxc_allocator::Allocator;
use oxc_ast::ast::Program;
use oxc_parser::Parser;
use oxc_span::SourceType;
use spout_config::Category;

use crate::context::BuildContext;
use crate::error::{PipelineError, Result};
use crate::file::{glob_entries, FileItem, SourceEntry};
use crate::steps::blocking;
use crate::task::{StepReport, Task};

pub use minify::minify_script;
pub use optimize::optimize_iifes;

/// Parse a classic (non-module) script.
pub(crate) fn parse_program<'a>(allocator: &'a Allocator, source: &'a str) -> Result<Program<'a>, String> {
    let ret = Parser::new(allocator, source, SourceType::cjs()).parse();
    if let Some(error) = ret.errors.first() {
        return Err(error.to_string());
    }
    if ret.panicked {
        return Err("parser gave up".to_string());
    }
    Ok(ret.program)
}

/// The chain every script goes through:
///
/// optimize → write → rename `.min` → minify → optimize → write
///
/// The value only carries its destination and can be reused for any number of
/// items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPipeline {
    out_dir: PathBuf,
}

impl ScriptPipeline {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
        }
    }

    pub fn out_dir(&self) -> &Path {
        &self.out_dir
    }

    /// Run one item through the chain, returning both written paths.
    pub async fn run(&self, item: FileItem) -> Result<Vec<PathBuf>> {
        let source = item.source.clone();
        let text = item.text()?.to_string();

        let optimized = script_stage(&source, move || optimize_iifes(&text)).await?;
        let plain = FileItem {
            contents: optimized.clone().into_bytes(),
            ..item
        };
        let plain_path = plain.write_to(&self.out_dir).await?;

        let minified = script_stage(&source, move || {
            let minified = minify_script(&optimized)?;
            optimize_iifes(&minified)
        })
        .await?;
        let min = FileItem {
            contents: minified.into_bytes(),
            ..plain
        }
        .with_suffix(".min");
        let min_path = min.write_to(&self.out_dir).await?;

        Ok(vec![plain_path, min_path])
    }
}

async fn script_stage<F>(source: &Path, work: F) -> Result<String>
where
    F: FnOnce() -> std::result::Result<String, String> + Send + 'static,
{
    let path = source.to_path_buf();
    blocking(move || work().map_err(|message| PipelineError::Script { path, message })).await
}

/// Concatenate the `*.js` files directly inside `dir`, sorted by file name.
pub async fn concat_directory(entry: &SourceEntry) -> Result<FileItem> {
    let dir = &entry.path;
    let mut reader = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| PipelineError::io(dir, e))?;

    let mut files = Vec::new();
    while let Some(child) = reader
        .next_entry()
        .await
        .map_err(|e| PipelineError::io(dir, e))?
    {
        let path = child.path();
        let is_file = child
            .file_type()
            .await
            .map_err(|e| PipelineError::io(&path, e))?
            .is_file();
        if is_file && path.extension().is_some_and(|ext| ext == "js") {
            files.push(path);
        }
    }
    files.sort();

    let mut parts = Vec::with_capacity(files.len());
    for file in &files {
        parts.push(
            tokio::fs::read_to_string(file)
                .await
                .map_err(|e| PipelineError::io(file, e))?,
        );
    }
    tracing::debug!("concatenated {} file(s) from {}", files.len(), dir.display());

    let mut relative = entry.relative().to_path_buf();
    relative.as_mut_os_string().push(".js");
    Ok(FileItem::new(dir, relative, parts.join("\n").into_bytes()))
}

/// Optimizes and minifies every top-level script entry.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptStep;

#[async_trait]
impl Task for ScriptStep {
    fn name(&self) -> &'static str {
        "scripts"
    }

    async fn run(&self, ctx: &BuildContext) -> Result<StepReport> {
        let paths = ctx.paths();
        let pipeline = ScriptPipeline::new(paths.output_for(Category::Scripts));
        let entries = glob_entries(paths.root(), paths.patterns_for(Category::Scripts))?;

        let results = join_all(entries.iter().map(|entry| {
            let pipeline = &pipeline;
            async move {
                let item = if entry.is_dir {
                    concat_directory(entry).await?
                } else {
                    entry.load().await?
                };
                pipeline.run(item).await
            }
        }))
        .await;

        let mut report = StepReport::new(self.name());
        let mut first_error = None;
        for result in results {
            match result {
                Ok(written) => report.outputs.extend(written),
                Err(err) => {
                    tracing::error!("{}", err);
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(report),
        }
    }
}
