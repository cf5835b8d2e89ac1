//! Terminal output: status messages, a spinner and the build summary.
//!
//! Everything prints to stderr so stdout stays clean for piping.

mod format;
mod messages;
mod spinner;

pub use format::{format_duration, format_size, print_build_summary, StepSummary};
pub use messages::{error, info, skipped_files, success, warning};
pub use spinner::Spinner;

/// Check if running in a CI environment.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
}

/// Check if color output should be enabled.
///
/// `NO_COLOR` wins over `FORCE_COLOR`; otherwise stderr must be a terminal.
pub fn should_use_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }
    console::user_attended_stderr()
}

/// Apply the color decision to `console` styled output (spinners).
pub fn init_colors(no_color: bool) {
    console::set_colors_enabled_stderr(!no_color && should_use_color());
}

/// Spinners only make sense on an attended terminal outside CI.
pub fn interactive() -> bool {
    !is_ci() && console::user_attended_stderr()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const CI_VARS: [&str; 5] = ["CI", "GITHUB_ACTIONS", "GITLAB_CI", "CIRCLECI", "TRAVIS"];

    fn clear(vars: &[&str]) {
        for var in vars {
            unsafe { std::env::remove_var(var) };
        }
    }

    #[test]
    #[serial]
    fn test_is_ci_with_ci_var() {
        clear(&CI_VARS);
        unsafe { std::env::set_var("CI", "true") };
        assert!(is_ci());
        assert!(!interactive());
        clear(&CI_VARS);
    }

    #[test]
    #[serial]
    fn test_is_ci_with_github_actions() {
        clear(&CI_VARS);
        unsafe { std::env::set_var("GITHUB_ACTIONS", "true") };
        assert!(is_ci());
        clear(&CI_VARS);
    }

    #[test]
    #[serial]
    fn test_no_color_beats_force_color() {
        unsafe {
            std::env::set_var("NO_COLOR", "1");
            std::env::set_var("FORCE_COLOR", "1");
        }
        assert!(!should_use_color());
        clear(&["NO_COLOR"]);
        assert!(should_use_color());
        clear(&["FORCE_COLOR"]);
    }
}
