//! Sass compilation, vendor prefixing and minification.
//!
//! Each stylesheet goes through `grass` in expanded style, then through
//! `lightningcss`, which adds the prefixes the configured browser range needs
//! and drops the ones it does not.
//!
//! The expanded file keeps the compiler's layout: top-level comments are
//! copied through and every top-level statement is prefixed on its own, so
//! rules are never merged. The `<name>.min.css` copy is minified as a whole
//! with every comment removed.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::future::join_all;
use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use spout_config::Category;

use crate::context::BuildContext;
use crate::error::{PipelineError, Result};
use crate::file::{glob_entries, FileItem, SourceEntry};
use crate::notice::FileNotice;
use crate::steps::blocking;
use crate::task::{StepReport, Task};

/// Compiles every non-partial stylesheet matched by the style patterns.
#[derive(Debug, Default, Clone, Copy)]
pub struct StyleStep;

#[async_trait]
impl Task for StyleStep {
    fn name(&self) -> &'static str {
        "styles"
    }

    async fn run(&self, ctx: &BuildContext) -> Result<StepReport> {
        let paths = ctx.paths();
        let out_dir = paths.output_for(Category::Styles);
        let targets = resolve_targets(&ctx.config().styles.browsers)?;

        let entries: Vec<SourceEntry> = glob_entries(paths.root(), paths.patterns_for(Category::Styles))?
            .into_iter()
            .filter(|entry| !entry.is_dir && !is_partial(&entry.path))
            .collect();
        tracing::debug!("compiling {} stylesheet(s)", entries.len());

        let results = join_all(
            entries
                .iter()
                .map(|entry| compile_entry(entry, targets, &out_dir)),
        )
        .await;

        let mut report = StepReport::new(self.name());
        for result in results {
            match result? {
                Ok(written) => report.outputs.extend(written),
                Err(notice) => {
                    ctx.notifier().notify(&notice);
                    report.notices.push(notice);
                }
            }
        }
        Ok(report)
    }
}

/// Outer error aborts the step; inner error is a per-file notice.
async fn compile_entry(
    entry: &SourceEntry,
    targets: Targets,
    out_dir: &Path,
) -> Result<std::result::Result<Vec<PathBuf>, FileNotice>> {
    let source = entry.path.clone();
    let compiled = blocking(move || Ok(compile_stylesheet(&source, targets))).await?;

    let compiled = match compiled {
        Ok(compiled) => compiled,
        Err(message) => {
            return Ok(Err(FileNotice {
                step: "styles",
                path: entry.path.clone(),
                message,
            }));
        }
    };

    let relative = entry.relative().to_path_buf();
    let expanded = FileItem::new(&entry.path, relative, compiled.expanded.into_bytes())
        .with_extension("css");
    let minified = FileItem {
        contents: compiled.minified.into_bytes(),
        ..expanded.clone()
    }
    .with_suffix(".min");

    Ok(Ok(vec![
        expanded.write_to(out_dir).await?,
        minified.write_to(out_dir).await?,
    ]))
}

/// Both renditions of one stylesheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CompiledStyle {
    pub expanded: String,
    pub minified: String,
}

/// Compile a Sass file and produce its expanded and minified CSS.
///
/// Errors are human readable messages; callers turn them into notices.
pub(crate) fn compile_stylesheet(
    path: &Path,
    targets: Targets,
) -> std::result::Result<CompiledStyle, String> {
    let options = grass::Options::default().style(grass::OutputStyle::Expanded);
    let css = grass::from_path(path, &options).map_err(|e| e.to_string())?;
    prefix_and_minify(&css, &path.to_string_lossy(), targets)
}

fn prefix_and_minify(
    css: &str,
    filename: &str,
    targets: Targets,
) -> std::result::Result<CompiledStyle, String> {
    let mut expanded = String::with_capacity(css.len());
    for chunk in top_level_chunks(css) {
        let text = match chunk {
            Chunk::Comment(comment) => comment.to_string(),
            Chunk::Statement(statement) => {
                let printed = process(statement, filename, targets, false)?;
                printed.trim().to_string()
            }
        };
        if text.is_empty() {
            continue;
        }
        if !expanded.is_empty() {
            expanded.push('\n');
        }
        expanded.push_str(&text);
        expanded.push('\n');
    }

    let minified = process(css, filename, targets, true)?;
    Ok(CompiledStyle { expanded, minified })
}

/// Parse, prefix for `targets` and print. Comments are dropped.
fn process(
    css: &str,
    filename: &str,
    targets: Targets,
    minify: bool,
) -> std::result::Result<String, String> {
    let mut stylesheet = StyleSheet::parse(
        css,
        ParserOptions {
            filename: filename.to_string(),
            ..Default::default()
        },
    )
    .map_err(|e| e.to_string())?;

    stylesheet
        .minify(MinifyOptions {
            targets,
            ..Default::default()
        })
        .map_err(|e| e.to_string())?;
    stylesheet.license_comments.clear();

    let printed = stylesheet
        .to_css(PrinterOptions {
            minify,
            targets,
            ..Default::default()
        })
        .map_err(|e| e.to_string())?;
    Ok(printed.code)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chunk<'a> {
    Comment(&'a str),
    Statement(&'a str),
}

/// Split CSS into top-level comments and statements (rules, at-rule blocks
/// and `;`-terminated at-rules). Strings and nested blocks are skipped over.
fn top_level_chunks(css: &str) -> Vec<Chunk<'_>> {
    let bytes = css.as_bytes();
    let mut chunks = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let end = css[i + 2..]
                    .find("*/")
                    .map(|p| i + 2 + p + 2)
                    .unwrap_or(bytes.len());
                if depth == 0 && css[start..i].trim().is_empty() {
                    chunks.push(Chunk::Comment(&css[i..end]));
                    start = end;
                }
                i = end;
                continue;
            }
            quote @ (b'"' | b'\'') => {
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    if bytes[i] == b'\\' {
                        i += 1;
                    }
                    i += 1;
                }
            }
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    push_statement(&mut chunks, &css[start..=i]);
                    start = i + 1;
                }
            }
            b';' if depth == 0 => {
                push_statement(&mut chunks, &css[start..=i]);
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }
    push_statement(&mut chunks, &css[start..]);
    chunks
}

fn push_statement<'a>(chunks: &mut Vec<Chunk<'a>>, text: &'a str) {
    let text = text.trim();
    if !text.is_empty() {
        chunks.push(Chunk::Statement(text));
    }
}

pub(crate) fn resolve_targets(browsers: &[String]) -> Result<Targets> {
    let browsers = Browsers::from_browserslist(browsers.iter())
        .map_err(|e| PipelineError::Browsers(e.to_string()))?;
    Ok(Targets {
        browsers,
        ..Targets::default()
    })
}

/// Sass partials are only compiled through the sheets that load them.
fn is_partial(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().starts_with('_'))
        .unwrap_or(false)
}
