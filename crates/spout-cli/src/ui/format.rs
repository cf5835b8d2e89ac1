//! Formatting utilities for sizes, durations and the build summary.

use std::time::Duration;

use console::Term;
use owo_colors::OwoColorize;

/// Format a byte count with the largest fitting unit.
///
/// ```
/// use spout_cli::ui::format_size;
///
/// assert_eq!(format_size(0), "0 B");
/// assert_eq!(format_size(1024), "1.00 KB");
/// ```
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_idx = 0;
    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", size as u64, UNITS[unit_idx])
    } else {
        format!("{:.2} {}", size, UNITS[unit_idx])
    }
}

/// Format a duration as `ms`, seconds or `Xm Ys`.
///
/// ```
/// use std::time::Duration;
/// use spout_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();

    if total_ms < 1000 {
        format!("{}ms", total_ms)
    } else if total_ms < 60_000 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        let secs = duration.as_secs();
        format!("{}m {}s", secs / 60, secs % 60)
    }
}

/// One row of the build summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepSummary {
    pub step: String,
    pub files: usize,
    pub bytes: u64,
    pub duration: Duration,
    pub notices: usize,
}

/// Print one line per step and a total to stderr.
pub fn print_build_summary(rows: &[StepSummary], total: Duration) {
    let width = (Term::stderr().size().1 as usize).min(80);

    eprintln!("\n{}", "Build Summary".bold().underline());
    eprintln!("{}", "─".repeat(width));

    for row in rows {
        let notices = if row.notices > 0 {
            format!(" {} skipped", row.notices).yellow().to_string()
        } else {
            String::new()
        };
        eprintln!(
            "  {} {:<8} {} {} {}{}",
            "▸".blue(),
            row.step.bright_white().bold(),
            format!("{} file(s)", row.files).dimmed(),
            format_size(row.bytes).dimmed(),
            format!("({})", format_duration(row.duration)).dimmed(),
            notices
        );
    }

    eprintln!("{}", "─".repeat(width));

    let files: usize = rows.iter().map(|r| r.files).sum();
    let bytes: u64 = rows.iter().map(|r| r.bytes).sum();
    eprintln!(
        "  {} {} file(s), {} in {}",
        "Total:".bold(),
        files,
        format_size(bytes).green(),
        format_duration(total).green()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_bytes() {
        assert_eq!(format_size(1), "1 B");
        assert_eq!(format_size(1023), "1023 B");
    }

    #[test]
    fn test_format_size_larger_units() {
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1_572_864), "1.50 MB");
        assert_eq!(format_size(2_147_483_648), "2.00 GB");
    }

    #[test]
    fn test_format_duration_seconds() {
        assert_eq!(format_duration(Duration::from_millis(999)), "999ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
        assert_eq!(format_duration(Duration::from_secs(125)), "2m 5s");
    }

    #[test]
    fn test_print_build_summary() {
        let rows = vec![
            StepSummary {
                step: "styles".into(),
                files: 2,
                bytes: 4_096,
                duration: Duration::from_millis(120),
                notices: 1,
            },
            StepSummary {
                step: "copy".into(),
                files: 1,
                bytes: 318,
                duration: Duration::from_millis(3),
                notices: 0,
            },
        ];
        print_build_summary(&rows, Duration::from_millis(130));
        print_build_summary(&[], Duration::ZERO);
    }
}
