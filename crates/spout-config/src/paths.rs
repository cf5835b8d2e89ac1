//! The path table: input globs and output directories per asset category.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Asset categories handled by the build steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Scripts,
    Styles,
    Images,
    Copy,
}

impl Category {
    /// All categories, in the order their steps are declared.
    pub const ALL: [Category; 4] = [
        Category::Scripts,
        Category::Styles,
        Category::Images,
        Category::Copy,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Scripts => "scripts",
            Category::Styles => "styles",
            Category::Images => "images",
            Category::Copy => "copy",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input patterns and output directory for one category.
///
/// Patterns are relative to the project root and use `glob` syntax. Brace
/// alternation is not supported, list one pattern per alternative instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PathEntry {
    pub input: Vec<String>,
    pub output: PathBuf,
}

impl PathEntry {
    pub fn new<I, S>(input: I, output: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: input.into_iter().map(Into::into).collect(),
            output: output.into(),
        }
    }
}

/// Immutable mapping from category to [`PathEntry`].
///
/// The source root is what the watcher observes. The output root is owned by
/// the pipeline: it is deleted on every build, served by the dev server and
/// published by the deploy step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PathTable {
    pub input: PathBuf,
    pub output: PathBuf,
    pub scripts: PathEntry,
    pub styles: PathEntry,
    pub images: PathEntry,
    pub copy: PathEntry,
}

impl Default for PathTable {
    fn default() -> Self {
        Self {
            input: PathBuf::from("src"),
            output: PathBuf::from("dist"),
            scripts: PathEntry::new(["src/js/*"], "dist/js"),
            styles: PathEntry::new(["src/sass/**/*.scss", "src/sass/**/*.sass"], "dist/css"),
            images: PathEntry::new(["src/img/*"], "dist/img"),
            copy: PathEntry::new(["src/copy/**/*"], "dist"),
        }
    }
}

impl PathTable {
    pub fn entry(&self, category: Category) -> &PathEntry {
        match category {
            Category::Scripts => &self.scripts,
            Category::Styles => &self.styles,
            Category::Images => &self.images,
            Category::Copy => &self.copy,
        }
    }

    /// Anchor every relative path of the table at `root`.
    ///
    /// Absolute paths are kept as they are. Patterns are joined textually so
    /// the glob syntax survives; characters of `root` itself that have a glob
    /// meaning are escaped by the pattern matcher, not here.
    pub fn rooted(&self, root: &Path) -> RootedPaths {
        RootedPaths {
            root: root.to_path_buf(),
            input: join(root, &self.input),
            output: join(root, &self.output),
            table: self.clone(),
        }
    }
}

/// A [`PathTable`] bound to a project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootedPaths {
    root: PathBuf,
    input: PathBuf,
    output: PathBuf,
    table: PathTable,
}

impl RootedPaths {
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute source root.
    pub fn input(&self) -> &Path {
        &self.input
    }

    /// Absolute output root.
    pub fn output(&self) -> &Path {
        &self.output
    }

    /// Absolute output directory for a category.
    pub fn output_for(&self, category: Category) -> PathBuf {
        join(&self.root, &self.table.entry(category).output)
    }

    /// Patterns for a category, still relative to [`RootedPaths::root`].
    pub fn patterns_for(&self, category: Category) -> &[String] {
        &self.table.entry(category).input
    }

    pub fn table(&self) -> &PathTable {
        &self.table
    }
}

fn join(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_matches_project_layout() {
        let table = PathTable::default();
        assert_eq!(table.scripts.input, vec!["src/js/*"]);
        assert_eq!(table.styles.input.len(), 2);
        assert_eq!(table.images.output, PathBuf::from("dist/img"));
        assert_eq!(table.copy.output, PathBuf::from("dist"));
    }

    #[test]
    fn rooted_paths_join_relative_entries() {
        let rooted = PathTable::default().rooted(Path::new("/site"));
        assert_eq!(rooted.output(), Path::new("/site/dist"));
        assert_eq!(rooted.input(), Path::new("/site/src"));
        assert_eq!(
            rooted.output_for(Category::Styles),
            PathBuf::from("/site/dist/css")
        );
        assert_eq!(rooted.patterns_for(Category::Scripts), ["src/js/*"]);
    }

    #[test]
    fn rooted_paths_keep_absolute_entries() {
        let mut table = PathTable::default();
        table.output = PathBuf::from("/var/www");
        let rooted = table.rooted(Path::new("/site"));
        assert_eq!(rooted.output(), Path::new("/var/www"));
    }

    #[test]
    fn category_names_are_lowercase() {
        let names: Vec<_> = Category::ALL.iter().map(Category::as_str).collect();
        assert_eq!(names, ["scripts", "styles", "images", "copy"]);
    }
}
