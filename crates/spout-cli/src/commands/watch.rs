//! `spout watch`: build, serve the output root and rebuild on change.
//!
//! Rebuilds run one at a time inside the watch loop. Changes that arrive
//! while a rebuild is running wait in the watcher channel and are picked up
//! as a single batch afterwards, so at most one rebuild is ever pending.

use std::sync::Arc;
use std::time::{Duration, Instant};

use spout_pipeline::BuildContext;
use tokio::signal;

use crate::cli::{GlobalArgs, WatchArgs};
use crate::commands::build;
use crate::commands::utils::{notice_count, Session};
use crate::dev::{next_batch, DevEvent, DevServer, DevServerState, FileChange, FileWatcher, SharedState};
use crate::error::{CliError, Result, ResultExt};
use crate::ui;

pub async fn execute(global: &GlobalArgs, args: WatchArgs) -> Result<()> {
    let mut session = Session::load(global)?;
    apply_overrides(&mut session, args);
    let serve = session.config.serve.clone();
    let ctx = session.context();
    let state: SharedState = Arc::new(DevServerState::new());

    rebuild(&ctx, &state).await;

    let listener = DevServer::bind(&serve.host, serve.port)
        .await
        .with_hint("Is another server running on this port? Pick one with --port")?;
    let url = match listener.local_addr() {
        Ok(addr) => format!("http://{}", addr),
        Err(_) => format!("http://{}:{}", serve.host, serve.port),
    };
    let server = DevServer::new(ctx.paths().output(), state.clone());
    let mut server_handle = tokio::spawn(server.serve(listener));
    ui::success(&format!("Serving {} at {}", ctx.paths().output().display(), url));

    if serve.open {
        open_browser(&url);
    }

    let (_watcher, mut changes) = FileWatcher::new(ctx.paths().input())
        .context("Failed to watch the source directory")?;
    ui::info(&format!(
        "Watching {} for changes (Ctrl+C to stop)",
        ctx.paths().input().display()
    ));

    let window = Duration::from_millis(serve.debounce_ms);
    loop {
        tokio::select! {
            batch = next_batch(&mut changes, window) => {
                let Some(batch) = batch else {
                    ui::warning("File watcher stopped");
                    break;
                };
                ui::info(&describe_changes(&ctx, &batch));
                rebuild(&ctx, &state).await;
            }
            _ = signal::ctrl_c() => {
                ui::info("Shutting down");
                break;
            }
            result = &mut server_handle => {
                return match result {
                    Ok(Ok(())) => Err(CliError::Server("server stopped unexpectedly".into())),
                    Ok(Err(err)) => Err(err),
                    Err(err) => Err(CliError::Server(err.to_string())),
                };
            }
        }
    }

    server_handle.abort();
    Ok(())
}

fn apply_overrides(session: &mut Session, args: WatchArgs) {
    let serve = &mut session.config.serve;
    if let Some(host) = args.host {
        serve.host = host;
    }
    if let Some(port) = args.port {
        serve.port = port;
    }
    serve.open |= args.open;
}

/// Run one build and tell the browsers. A failure is reported, never
/// returned: the watch loop keeps going.
pub async fn rebuild(ctx: &BuildContext, state: &DevServerState) -> bool {
    state.start_build();
    state.broadcast(&DevEvent::BuildStarted);
    let started = Instant::now();

    match build::run(ctx).await {
        Ok(reports) => {
            let duration_ms = started.elapsed().as_millis() as u64;
            state.complete_build(duration_ms);
            state.broadcast(&DevEvent::BuildCompleted { duration_ms });

            let skipped = notice_count(&reports);
            if skipped > 0 {
                ui::warning(&format!("Rebuilt in {}ms, {} file(s) skipped:", duration_ms, skipped));
                ui::skipped_files(reports.iter().flat_map(|r| &r.notices));
            } else {
                ui::success(&format!("Rebuilt in {}ms", duration_ms));
            }
            true
        }
        Err(err) => {
            let error = err.to_string();
            state.fail_build(error.clone());
            state.broadcast(&DevEvent::BuildFailed { error: error.clone() });
            ui::error(&format!("Build failed: {}", error));
            false
        }
    }
}

fn describe_changes(ctx: &BuildContext, batch: &[FileChange]) -> String {
    let first = batch[0].path();
    let shown = first
        .strip_prefix(ctx.paths().root())
        .unwrap_or(first)
        .display();
    match batch.len() {
        1 => format!("{} changed", shown),
        n => format!("{} and {} other file(s) changed", shown, n - 1),
    }
}

fn open_browser(url: &str) {
    let mut command = if cfg!(target_os = "macos") {
        tokio::process::Command::new("open")
    } else if cfg!(target_os = "windows") {
        let mut command = tokio::process::Command::new("cmd");
        command.args(["/C", "start"]);
        command
    } else {
        tokio::process::Command::new("xdg-open")
    };

    match command.arg(url).spawn() {
        Ok(_) => ui::info(&format!("Opened browser at {}", url)),
        Err(e) => ui::warning(&format!("Failed to open browser: {}", e)),
    }
}
