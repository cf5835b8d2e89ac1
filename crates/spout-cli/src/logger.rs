//! Logging setup.
//!
//! The library crates log through `tracing`; this module installs the
//! subscriber once at startup.
//!
//! Level selection, first match wins:
//! 1. `--verbose`: debug for spout crates
//! 2. `--quiet`: errors only
//! 3. `RUST_LOG`
//! 4. info for spout crates

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const VERBOSE_FILTER: &str = "spout=debug,spout_cli=debug,spout_pipeline=debug,spout_config=debug";
const QUIET_FILTER: &str = "spout=error,spout_cli=error,spout_pipeline=error,spout_config=error";
const DEFAULT_FILTER: &str = "spout=info,spout_cli=info,spout_pipeline=info,spout_config=info";

/// Build the level filter for the given flags.
pub fn filter_for(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else if quiet {
        EnvFilter::new(QUIET_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

/// Initialize the global tracing subscriber. Call once, before logging.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter_for(verbose, quiet))
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    // The subscriber is process-global, so only the filters are checked here.

    #[test]
    fn test_verbose_filter_enables_debug() {
        let filter = filter_for(true, false).to_string();
        assert!(filter.contains("spout_pipeline=debug"));
    }

    #[test]
    fn test_quiet_filter_is_errors_only() {
        let filter = filter_for(false, true).to_string();
        assert!(filter.contains("spout=error"));
        assert!(!filter.contains("info"));
    }
}
