//! Desktop notifications for stylesheet compile errors.
//!
//! Shells out to the platform tool: `notify-send` on Linux and the BSDs,
//! `osascript` on macOS. Failing to notify is never an error; the notice is
//! always logged as well.

use std::process::Stdio;

use spout_pipeline::{FileNotice, Notifier};

const TITLE: &str = "spout";

/// Which tool raises the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    NotifySend,
    Osascript,
    /// Log only.
    None,
}

impl Backend {
    pub fn detect() -> Self {
        if cfg!(target_os = "macos") {
            Backend::Osascript
        } else if cfg!(unix) {
            Backend::NotifySend
        } else {
            Backend::None
        }
    }
}

#[derive(Debug, Clone)]
pub struct DesktopNotifier {
    backend: Backend,
}

impl DesktopNotifier {
    pub fn new() -> Self {
        Self::with_backend(Backend::detect())
    }

    pub fn with_backend(backend: Backend) -> Self {
        Self { backend }
    }

    /// Program and arguments for one notice, or `None` for [`Backend::None`].
    pub fn command_for(&self, notice: &FileNotice) -> Option<(&'static str, Vec<String>)> {
        let subtitle = format!("{} failed", notice.step);
        let body = notice.to_string();
        match self.backend {
            Backend::NotifySend => Some((
                "notify-send",
                vec![
                    "--app-name".to_string(),
                    TITLE.to_string(),
                    format!("{}: {}", TITLE, subtitle),
                    body,
                ],
            )),
            Backend::Osascript => Some((
                "osascript",
                vec![
                    "-e".to_string(),
                    format!(
                        "display notification \"{}\" with title \"{}\" subtitle \"{}\"",
                        applescript_escape(&body),
                        TITLE,
                        applescript_escape(&subtitle)
                    ),
                ],
            )),
            Backend::None => None,
        }
    }
}

impl Default for DesktopNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for DesktopNotifier {
    fn notify(&self, notice: &FileNotice) {
        tracing::error!(step = notice.step, "{}", notice);

        let Some((program, args)) = self.command_for(notice) else {
            return;
        };
        // The child is not awaited; tokio reaps it in the background.
        let spawned = tokio::process::Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
        if let Err(err) = spawned {
            tracing::debug!("could not run {}: {}", program, err);
        }
    }
}

fn applescript_escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
