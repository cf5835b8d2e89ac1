//! Status message functions for terminal output.

use owo_colors::OwoColorize;
use spout_pipeline::FileNotice;

pub fn success(message: &str) {
    eprintln!("{} {}", "✓".green().bold(), message);
}

pub fn info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message.yellow());
}

pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message.red());
}

/// List the files a build skipped, one per line, under a warning.
pub fn skipped_files<'a>(notices: impl IntoIterator<Item = &'a FileNotice>) {
    for notice in notices {
        eprintln!(
            "  {} {} {}",
            "↳".dimmed(),
            format!("[{}]", notice.step).yellow(),
            notice.path.display()
        );
    }
}
