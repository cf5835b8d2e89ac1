//! `spout build`: clean the output root and run every build step.

use std::time::Instant;

use spout_pipeline::{default_build, BuildContext, StepReport};

use crate::cli::GlobalArgs;
use crate::commands::utils::{notice_count, summarize, Session};
use crate::error::Result;
use crate::ui;

pub async fn execute(global: &GlobalArgs) -> Result<()> {
    let session = Session::load(global)?;
    let ctx = session.context();

    let started = Instant::now();
    let reports = run(&ctx).await?;
    report(&reports, started, global.quiet);
    Ok(())
}

/// Run the default build graph against `ctx`.
pub async fn run(ctx: &BuildContext) -> Result<Vec<StepReport>> {
    tracing::debug!("running {}", default_build().describe());
    Ok(default_build().run(ctx).await?)
}

/// Print the summary table and the closing status line.
pub(crate) fn report(reports: &[StepReport], started: Instant, quiet: bool) {
    let elapsed = started.elapsed();
    if !quiet {
        ui::print_build_summary(&summarize(reports), elapsed);
    }

    let skipped = notice_count(reports);
    if skipped > 0 {
        ui::warning(&format!("Build finished with {} file(s) skipped:", skipped));
        ui::skipped_files(reports.iter().flat_map(|r| &r.notices));
    } else if !quiet {
        ui::success(&format!("Build complete in {}", ui::format_duration(elapsed)));
    }
}
