//! Spinner for work without a known duration, such as publishing.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

pub struct Spinner {
    pb: ProgressBar,
}

impl Spinner {
    /// Create and start a spinner. Off a terminal it stays hidden and only the
    /// final message is printed.
    pub fn new(message: &str) -> Self {
        let pb = if super::interactive() {
            ProgressBar::new_spinner()
        } else {
            ProgressBar::hidden()
        };
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style.tick_strings(&["◐", "◓", "◑", "◒", "●"]));
        }
        pb.set_message(message.to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        Self { pb }
    }

    pub fn set_message(&self, message: &str) {
        self.pb.set_message(message.to_string());
    }

    /// Finish with a green checkmark.
    pub fn finish(&self, message: &str) {
        if self.pb.is_hidden() {
            super::success(message);
        } else {
            self.pb
                .finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Finish with a red cross.
    pub fn fail(&self, message: &str) {
        if self.pb.is_hidden() {
            super::error(message);
        } else {
            self.pb
                .finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }
}
