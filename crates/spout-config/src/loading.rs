//! Layered configuration loading.
//!
//! Priority: environment (`SPOUT_`) > config file > built-in defaults. The
//! defaults alone describe the standard `src/` → `dist/` layout, so a project
//! without a config file builds as-is.

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;

use crate::error::{ConfigError, Result};
use crate::options::SiteConfig;

/// Conventional config file name looked up in the project root.
pub const CONFIG_FILE_NAME: &str = "spout.toml";

/// Prefix of environment overrides. Nested keys are separated by `__` and
/// written in snake case, e.g. `SPOUT_SERVE__DEBOUNCE_MS=250`.
pub const ENV_PREFIX: &str = "SPOUT_";

/// Top-level sections environment variables may override. Other `SPOUT_`
/// variables are ignored.
const ENV_SECTIONS: &[&str] = &["paths", "styles", "images", "serve", "deploy"];

/// Finds and merges configuration sources for one project root.
///
/// # Example
///
/// ```no_run
/// use spout_config::ConfigLoader;
///
/// let config = ConfigLoader::new(".").load().unwrap();
/// assert_eq!(config.paths.output.to_str(), Some("dist"));
/// ```
pub struct ConfigLoader {
    root: PathBuf,
    explicit: Option<PathBuf>,
}

impl ConfigLoader {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            explicit: None,
        }
    }

    /// Use a specific file instead of `spout.toml`. The file must exist.
    pub fn with_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit = Some(path.into());
        self
    }

    /// Locate the config file, if any.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` when an explicit file does not exist.
    pub fn find(&self) -> Result<Option<PathBuf>> {
        if let Some(explicit) = &self.explicit {
            let path = if explicit.is_absolute() {
                explicit.clone()
            } else {
                self.root.join(explicit)
            };
            if !path.is_file() {
                return Err(ConfigError::NotFound(path));
            }
            return Ok(Some(path));
        }

        let conventional = self.root.join(CONFIG_FILE_NAME);
        Ok(conventional.is_file().then_some(conventional))
    }

    /// Merge all sources into a validated [`SiteConfig`].
    pub fn load(&self) -> Result<SiteConfig> {
        let mut figment = Figment::new().merge(Serialized::defaults(SiteConfig::default()));

        if let Some(path) = self.find()? {
            tracing::debug!("loading configuration from {}", path.display());
            figment = figment.merge(Toml::file(path));
        }

        figment = figment.merge(env_provider());

        let config: SiteConfig = figment.extract()?;
        config.validate()?;
        Ok(config)
    }
}

fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX)
        .split("__")
        .filter_map(|key| env_key(key.as_str()).map(Into::into))
        .lowercase(false)
}

/// `SERVE.DEBOUNCE_MS` → `serve.debounceMs`.
fn env_key(key: &str) -> Option<String> {
    let mut segments = key.split('.');
    let mut out = segments.next()?.to_ascii_lowercase();
    if !ENV_SECTIONS.contains(&out.as_str()) {
        return None;
    }
    for segment in segments {
        out.push('.');
        out.push_str(&camel_case(segment));
    }
    Some(out)
}

fn camel_case(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    let mut upper = false;
    for c in segment.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.push(c.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(c.to_ascii_lowercase());
        }
    }
    out
}
