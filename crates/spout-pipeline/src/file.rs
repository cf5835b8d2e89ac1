//! Glob sources, in-flight file items and output writes.
//!
//! A glob match becomes a [`SourceEntry`]; loading it yields a [`FileItem`]
//! whose path is kept relative to the pattern's base directory (the part of
//! the pattern before the first wildcard). Writing an item to an output
//! directory recreates that relative path below it.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use glob::{MatchOptions, Pattern};

use crate::error::{PipelineError, Result};

/// Dotfiles only match when the pattern names the dot explicitly.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// One filesystem entry matched by a glob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub path: PathBuf,
    pub base: PathBuf,
    pub is_dir: bool,
}

impl SourceEntry {
    /// Path below the glob base.
    pub fn relative(&self) -> &Path {
        self.path.strip_prefix(&self.base).unwrap_or(&self.path)
    }

    /// Read the entry into a [`FileItem`]. Directories load with no contents.
    pub async fn load(&self) -> Result<FileItem> {
        let contents = if self.is_dir {
            Vec::new()
        } else {
            tokio::fs::read(&self.path)
                .await
                .map_err(|e| PipelineError::io(&self.path, e))?
        };
        Ok(FileItem {
            source: self.path.clone(),
            relative: self.relative().to_path_buf(),
            is_dir: self.is_dir,
            contents,
        })
    }
}

/// A file travelling through a chain of stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileItem {
    /// Where the item came from, for diagnostics.
    pub source: PathBuf,
    /// Output path relative to the destination directory.
    pub relative: PathBuf,
    pub is_dir: bool,
    pub contents: Vec<u8>,
}

impl FileItem {
    pub fn new(source: impl Into<PathBuf>, relative: impl Into<PathBuf>, contents: Vec<u8>) -> Self {
        Self {
            source: source.into(),
            relative: relative.into(),
            is_dir: false,
            contents,
        }
    }

    /// Insert `suffix` between the file stem and the extension:
    /// `app.js` + `.min` → `app.min.js`.
    pub fn with_suffix(mut self, suffix: &str) -> Self {
        self.relative = suffixed(&self.relative, suffix);
        self
    }

    /// Replace the extension of the output path.
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.relative.set_extension(extension);
        self
    }

    pub fn text(&self) -> Result<&str> {
        std::str::from_utf8(&self.contents).map_err(|e| {
            PipelineError::io(
                &self.source,
                std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            )
        })
    }

    /// Write the item below `out_dir`, creating parent directories.
    pub async fn write_to(&self, out_dir: &Path) -> Result<PathBuf> {
        let target = out_dir.join(&self.relative);
        if self.is_dir {
            tokio::fs::create_dir_all(&target)
                .await
                .map_err(|e| PipelineError::io(&target, e))?;
            return Ok(target);
        }
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PipelineError::io(parent, e))?;
        }
        tokio::fs::write(&target, &self.contents)
            .await
            .map_err(|e| PipelineError::io(&target, e))?;
        tracing::debug!("wrote {}", target.display());
        Ok(target)
    }
}

fn suffixed(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    path.with_file_name(name)
}

/// Expand `patterns` (relative to `root`) into matching entries.
///
/// Matches come back in the matcher's order (sorted within each directory),
/// de-duplicated across patterns.
pub fn glob_entries(root: &Path, patterns: &[String]) -> Result<Vec<SourceEntry>> {
    let mut seen = HashSet::new();
    let mut entries = Vec::new();

    for pattern in patterns {
        let base = root.join(glob_base(pattern));
        let full = anchored(root, pattern)?;
        let paths = glob::glob_with(&full, MATCH_OPTIONS).map_err(|e| PipelineError::Pattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;

        for path in paths {
            let path = path.map_err(|e| {
                let path = e.path().to_path_buf();
                PipelineError::io(path, std::io::Error::from(e))
            })?;
            if !seen.insert(path.clone()) {
                continue;
            }
            let is_dir = path.is_dir();
            entries.push(SourceEntry {
                path,
                base: base.clone(),
                is_dir,
            });
        }
    }

    Ok(entries)
}

/// Leading components of a pattern that contain no wildcard.
pub fn glob_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    let components: Vec<Component<'_>> = Path::new(pattern).components().collect();
    // The last component is what the pattern selects, never part of the base.
    let Some((_, parents)) = components.split_last() else {
        return base;
    };
    for component in parents {
        let text = component.as_os_str().to_string_lossy();
        if text.contains(['*', '?', '[']) {
            break;
        }
        base.push(component.as_os_str());
    }
    base
}

fn anchored(root: &Path, pattern: &str) -> Result<String> {
    let root = root.to_str().ok_or_else(|| PipelineError::Pattern {
        pattern: pattern.to_string(),
        message: format!("project root is not valid UTF-8: {}", root.display()),
    })?;
    let root = Pattern::escape(root.trim_end_matches(std::path::MAIN_SEPARATOR));
    Ok(format!("{}/{}", root, pattern.trim_start_matches("./")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn glob_base_stops_at_first_wildcard() {
        assert_eq!(glob_base("src/sass/**/*.scss"), PathBuf::from("src/sass"));
        assert_eq!(glob_base("src/js/*"), PathBuf::from("src/js"));
        assert_eq!(glob_base("src/copy/**/*"), PathBuf::from("src/copy"));
        assert_eq!(glob_base("*.txt"), PathBuf::new());
        assert_eq!(glob_base("src/img/logo.png"), PathBuf::from("src/img"));
    }

    #[test]
    fn suffix_goes_before_extension() {
        let item = FileItem::new("src/js/app.js", "app.js", Vec::new()).with_suffix(".min");
        assert_eq!(item.relative, PathBuf::from("app.min.js"));

        let item = FileItem::new("src/LICENSE", "nested/LICENSE", Vec::new()).with_suffix(".min");
        assert_eq!(item.relative, PathBuf::from("nested/LICENSE.min"));
    }

    #[test]
    fn extension_is_replaced() {
        let item = FileItem::new("src/sass/a/main.scss", "a/main.scss", Vec::new())
            .with_extension("css");
        assert_eq!(item.relative, PathBuf::from("a/main.css"));
    }

    #[test]
    fn entries_keep_path_relative_to_base() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("src/copy/fonts");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("a.woff"), b"font").unwrap();
        fs::write(dir.path().join("src/copy/.hidden"), b"x").unwrap();

        let entries = glob_entries(dir.path(), &["src/copy/**/*".to_string()]).unwrap();
        let relative: Vec<_> = entries.iter().map(|e| e.relative().to_path_buf()).collect();
        assert_eq!(
            relative,
            [PathBuf::from("fonts"), PathBuf::from("fonts/a.woff")]
        );
        assert!(entries[0].is_dir);
        assert!(!entries[1].is_dir);
    }

    #[test]
    fn overlapping_patterns_are_deduplicated() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("src/sass")).unwrap();
        fs::write(dir.path().join("src/sass/main.scss"), b"").unwrap();

        let patterns = vec!["src/sass/*.scss".to_string(), "src/sass/**/*.scss".to_string()];
        let entries = glob_entries(dir.path(), &patterns).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let dir = TempDir::new().unwrap();
        let err = glob_entries(dir.path(), &["src/[".to_string()]).unwrap_err();
        assert!(matches!(err, PipelineError::Pattern { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_directory_is_an_io_error() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let locked = dir.path().join("src/locked");
        fs::create_dir_all(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            // Permissions are not enforced for this user.
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let result = glob_entries(dir.path(), &["src/*/*.js".to_string()]);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        match result {
            Err(PipelineError::Io { path, .. }) => assert!(path.starts_with(&locked)),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn write_creates_parent_directories() {
        let dir = TempDir::new().unwrap();
        let item = FileItem::new("src/copy/a/b.txt", "a/b.txt", b"hello".to_vec());
        let written = item.write_to(&dir.path().join("dist")).await.unwrap();
        assert_eq!(fs::read(written).unwrap(), b"hello");
    }
}
