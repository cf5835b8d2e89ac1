//! Per-step options and the top-level [`SiteConfig`].

use crate::paths::PathTable;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete pipeline configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct SiteConfig {
    pub paths: PathTable,
    pub styles: StyleOptions,
    pub images: ImageOptions,
    pub serve: ServeOptions,
    pub deploy: DeployOptions,
}

/// Style compilation and prefixing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct StyleOptions {
    /// Browserslist queries used for vendor prefixing.
    pub browsers: Vec<String>,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self {
            browsers: vec!["last 2 versions".to_string(), "> 0.25%".to_string()],
        }
    }
}

/// Target similarity for the lossy JPEG search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JpegQuality {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl JpegQuality {
    /// Minimum mean structural similarity a candidate encoding must reach.
    pub fn ssim_target(&self) -> f64 {
        match self {
            JpegQuality::Low => 0.90,
            JpegQuality::Medium => 0.94,
            JpegQuality::High => 0.97,
            JpegQuality::VeryHigh => 0.99,
        }
    }
}

/// Image compression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ImageOptions {
    /// Binary-search passes over the JPEG quality range.
    pub loops: u32,
    /// Lowest JPEG quality the search may pick.
    pub min: u8,
    /// Highest JPEG quality the search may pick.
    pub max: u8,
    pub quality: JpegQuality,
}

impl Default for ImageOptions {
    fn default() -> Self {
        Self {
            loops: 4,
            min: 70,
            max: 80,
            quality: JpegQuality::High,
        }
    }
}

/// Development server and watcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct ServeOptions {
    pub host: String,
    pub port: u16,
    /// Quiet period used to coalesce bursts of file events.
    pub debounce_ms: u64,
    /// Open the browser once the server is up.
    pub open: bool,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            debounce_ms: 100,
            open: false,
        }
    }
}

/// Identity used for the publish commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitUser {
    pub name: String,
    pub email: String,
}

/// Publishing the output tree to a git branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields, default)]
pub struct DeployOptions {
    pub branch: String,
    pub remote: String,
    pub message: String,
    /// Repository URL. Defaults to the URL of `remote` in the project repository.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
    /// Where the working clone lives, relative to the project root.
    pub cache_dir: PathBuf,
    /// Publish files whose name starts with a dot.
    pub dotfiles: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<GitUser>,
}

impl Default for DeployOptions {
    fn default() -> Self {
        Self {
            branch: "gh-pages".to_string(),
            remote: "origin".to_string(),
            message: "Updates".to_string(),
            repo: None,
            cache_dir: PathBuf::from(".spout-cache/gh-pages"),
            dotfiles: false,
            user: None,
        }
    }
}
