//! Tests for layered configuration loading.

use figment::Jail;
use spout_config::{ConfigError, ConfigLoader, JpegQuality, SiteConfig, CONFIG_FILE_NAME};
use std::path::PathBuf;

#[test]
fn loads_defaults_without_config_file() {
    Jail::expect_with(|jail| {
        let config = ConfigLoader::new(jail.directory()).load().unwrap();
        assert_eq!(config, SiteConfig::default());
        Ok(())
    });
}

#[test]
fn file_overrides_defaults() {
    Jail::expect_with(|jail| {
        jail.create_file(
            CONFIG_FILE_NAME,
            r#"
[paths]
output = "public"

[paths.scripts]
input = ["src/scripts/*"]
output = "public/js"

[paths.styles]
input = ["src/sass/**/*.scss"]
output = "public/css"

[paths.images]
input = ["src/img/*"]
output = "public/img"

[paths.copy]
input = ["src/copy/**/*"]
output = "public"

[images]
quality = "very-high"
"#,
        )?;

        let config = ConfigLoader::new(jail.directory()).load().unwrap();
        assert_eq!(config.paths.output, PathBuf::from("public"));
        assert_eq!(config.paths.scripts.input, vec!["src/scripts/*"]);
        assert_eq!(config.images.quality, JpegQuality::VeryHigh);
        // Untouched sections keep their defaults
        assert_eq!(config.images.loops, 4);
        assert_eq!(config.deploy.branch, "gh-pages");
        Ok(())
    });
}

#[test]
fn environment_overrides_file() {
    Jail::expect_with(|jail| {
        jail.create_file(CONFIG_FILE_NAME, "[serve]\nport = 8080\n")?;
        jail.set_env("SPOUT_SERVE__PORT", "4000");
        jail.set_env("SPOUT_DEPLOY__BRANCH", "pages");

        let config = ConfigLoader::new(jail.directory()).load().unwrap();
        assert_eq!(config.serve.port, 4000);
        assert_eq!(config.deploy.branch, "pages");
        Ok(())
    });
}

#[test]
fn environment_sets_multi_word_fields() {
    Jail::expect_with(|jail| {
        jail.set_env("SPOUT_SERVE__DEBOUNCE_MS", "250");
        jail.set_env("SPOUT_DEPLOY__CACHE_DIR", ".cache/pages");

        let config = ConfigLoader::new(jail.directory()).load().unwrap();
        assert_eq!(config.serve.debounce_ms, 250);
        assert_eq!(config.deploy.cache_dir, PathBuf::from(".cache/pages"));
        Ok(())
    });
}

#[test]
fn unrelated_environment_variables_are_ignored() {
    Jail::expect_with(|jail| {
        jail.set_env("SPOUT_TOKEN", "secret");
        jail.set_env("SPOUT_LOG__LEVEL", "debug");

        let config = ConfigLoader::new(jail.directory()).load().unwrap();
        assert_eq!(config, SiteConfig::default());
        Ok(())
    });
}

#[test]
fn output_root_from_environment_is_validated() {
    Jail::expect_with(|jail| {
        jail.set_env("SPOUT_PATHS__OUTPUT", ".");
        let err = ConfigLoader::new(jail.directory()).load().unwrap_err();
        assert!(matches!(err, ConfigError::UnsafeOutputRoot { .. }));
        Ok(())
    });
}

#[test]
fn unknown_fields_are_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file(CONFIG_FILE_NAME, "[serve]\nhostname = \"0.0.0.0\"\n")?;
        let err = ConfigLoader::new(jail.directory()).load().unwrap_err();
        assert!(matches!(err, ConfigError::Extract(_)));
        Ok(())
    });
}

#[test]
fn invalid_layout_fails_validation() {
    Jail::expect_with(|jail| {
        jail.create_file(
            CONFIG_FILE_NAME,
            "[paths.images]\ninput = [\"src/img/*\"]\noutput = \"dist/js\"\n",
        )?;
        let err = ConfigLoader::new(jail.directory()).load().unwrap_err();
        assert!(matches!(err, ConfigError::OverlappingOutputs { .. }));
        Ok(())
    });
}

#[test]
fn explicit_file_is_used() {
    Jail::expect_with(|jail| {
        jail.create_file("site.toml", "[deploy]\nmessage = \"Publish\"\n")?;
        let config = ConfigLoader::new(jail.directory())
            .with_file("site.toml")
            .load()
            .unwrap();
        assert_eq!(config.deploy.message, "Publish");
        Ok(())
    });
}
