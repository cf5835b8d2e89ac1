//! Validation of a merged [`SiteConfig`].
//!
//! Steps run concurrently and never coordinate, so the only thing keeping them
//! apart is the layout of the path table: every step output lives under the
//! output root, and the style, script and image outputs are pairwise disjoint.
//! Copy is the exception: it writes straight into the output root.

use std::path::{Component, Path, PathBuf};

use crate::error::{ConfigError, Result};
use crate::options::SiteConfig;
use crate::paths::Category;

impl SiteConfig {
    /// Check the invariants the pipeline relies on.
    pub fn validate(&self) -> Result<()> {
        let paths = &self.paths;

        for category in Category::ALL {
            let entry = paths.entry(category);
            if entry.input.is_empty() || entry.input.iter().any(|p| p.trim().is_empty()) {
                return Err(ConfigError::EmptyPatterns {
                    field: format!("paths.{}.input", category),
                });
            }
        }

        let output = normalize(&paths.output);
        let input = normalize(&paths.input);
        check_output_root(&paths.output, &output)?;
        if input.starts_with(&output) {
            return Err(ConfigError::UnsafeOutputRoot {
                output: paths.output.clone(),
                reason: "would contain the source root",
            });
        }
        if output.starts_with(&input) {
            return Err(ConfigError::OutputInsideSource {
                output: paths.output.clone(),
                input: paths.input.clone(),
            });
        }

        let mut exclusive: Vec<(Category, PathBuf)> = Vec::new();
        for category in Category::ALL {
            let dir = normalize(&paths.entry(category).output);
            if !dir.starts_with(&output) {
                return Err(ConfigError::OutputOutsideRoot {
                    category: category.to_string(),
                    path: paths.entry(category).output.clone(),
                    root: paths.output.clone(),
                });
            }
            if category == Category::Copy {
                continue;
            }
            if dir == output {
                return Err(ConfigError::OverlappingOutputs {
                    first: category.to_string(),
                    second: Category::Copy.to_string(),
                    path: paths.entry(category).output.clone(),
                });
            }
            for (other, other_dir) in &exclusive {
                if dir.starts_with(other_dir) || other_dir.starts_with(&dir) {
                    return Err(ConfigError::OverlappingOutputs {
                        first: other.to_string(),
                        second: category.to_string(),
                        path: paths.entry(category).output.clone(),
                    });
                }
            }
            exclusive.push((category, dir));
        }

        if self.styles.browsers.is_empty() {
            return Err(invalid("styles.browsers", "at least one query is required"));
        }

        let images = &self.images;
        if images.loops == 0 {
            return Err(invalid("images.loops", "must be at least 1"));
        }
        if images.min > images.max {
            return Err(invalid(
                "images.min",
                &format!("{} is above images.max ({})", images.min, images.max),
            ));
        }
        if images.min == 0 || images.max > 100 {
            return Err(invalid("images", "quality bounds must lie within 1..=100"));
        }

        if self.deploy.branch.trim().is_empty() {
            return Err(invalid("deploy.branch", "cannot be empty"));
        }
        if self.deploy.remote.trim().is_empty() {
            return Err(invalid("deploy.remote", "cannot be empty"));
        }

        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// The output root is removed before every build, so it has to name a
/// directory of its own below the project root.
fn check_output_root(raw: &Path, output: &Path) -> Result<()> {
    let reason = if !output.components().any(|c| matches!(c, Component::Normal(_))) {
        Some("must name a directory below the project root")
    } else if output.starts_with("..") {
        Some("must not escape the project root")
    } else {
        None
    };
    match reason {
        Some(reason) => Err(ConfigError::UnsafeOutputRoot {
            output: raw.to_path_buf(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Lexical normalization: drops `.` and resolves `..` without touching disk.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paths::PathEntry;

    #[test]
    fn defaults_are_valid() {
        SiteConfig::default().validate().unwrap();
    }

    #[test]
    fn rejects_empty_patterns() {
        let mut config = SiteConfig::default();
        config.paths.scripts.input.clear();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyPatterns { .. }));
        assert!(err.to_string().contains("paths.scripts.input"));
    }

    #[test]
    fn rejects_nested_step_outputs() {
        let mut config = SiteConfig::default();
        config.paths.images = PathEntry::new(["src/img/*"], "dist/css/img");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::OverlappingOutputs { .. }));
    }

    #[test]
    fn rejects_step_output_equal_to_root() {
        let mut config = SiteConfig::default();
        config.paths.styles.output = PathBuf::from("./dist");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OverlappingOutputs { .. })
        ));
    }

    #[test]
    fn rejects_output_outside_root() {
        let mut config = SiteConfig::default();
        config.paths.scripts.output = PathBuf::from("public/js");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutputOutsideRoot { .. })
        ));
    }

    #[test]
    fn rejects_output_inside_source() {
        let mut config = SiteConfig::default();
        config.paths.output = PathBuf::from("src/dist");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::OutputInsideSource { .. })
        ));
    }

    #[test]
    fn rejects_project_root_as_output() {
        for output in ["", ".", "./", "dist/..", "/"] {
            let mut config = SiteConfig::default();
            config.paths.output = PathBuf::from(output);
            let err = config.validate().unwrap_err();
            assert!(
                matches!(err, ConfigError::UnsafeOutputRoot { .. }),
                "{output:?} was accepted: {err}"
            );
        }
    }

    #[test]
    fn rejects_output_outside_project() {
        let mut config = SiteConfig::default();
        config.paths.output = PathBuf::from("../public");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::UnsafeOutputRoot { .. }));
        assert!(err.to_string().contains("escape"));
    }

    #[test]
    fn rejects_output_containing_source() {
        let mut config = SiteConfig::default();
        config.paths.input = PathBuf::from("site/src");
        config.paths.output = PathBuf::from("site");
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("source root"));
    }

    #[test]
    fn rejects_inverted_quality_range() {
        let mut config = SiteConfig::default();
        config.images.min = 90;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("images.min"));
    }

    #[test]
    fn normalize_resolves_dots() {
        assert_eq!(normalize(Path::new("./dist/../dist/js")), PathBuf::from("dist/js"));
        assert_eq!(normalize(Path::new("../out")), PathBuf::from("../out"));
    }
}
