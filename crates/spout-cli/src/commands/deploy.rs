//! `spout deploy`: build, then publish the output root to a git branch.

use std::time::Instant;

use spout_pipeline::deploy_build;

use crate::cli::{DeployArgs, GlobalArgs};
use crate::commands::build::report;
use crate::commands::utils::Session;
use crate::error::Result;
use crate::ui::{self, Spinner};

pub async fn execute(global: &GlobalArgs, args: DeployArgs) -> Result<()> {
    let mut session = Session::load(global)?;
    apply_overrides(&mut session, args);
    session.revalidate()?;

    let deploy = &session.config.deploy;
    let target = format!("{}/{}", deploy.remote, deploy.branch);
    let ctx = session.context();

    let started = Instant::now();
    let spinner = Spinner::new(&format!("Building and publishing to {}...", target));
    match deploy_build().run(&ctx).await {
        Ok(reports) => {
            spinner.finish(&format!(
                "Published to {} in {}",
                target,
                ui::format_duration(started.elapsed())
            ));
            report(&reports, started, global.quiet);
            Ok(())
        }
        Err(err) => {
            spinner.fail(&format!("Publishing to {} failed", target));
            Err(err.into())
        }
    }
}

fn apply_overrides(session: &mut Session, args: DeployArgs) {
    let deploy = &mut session.config.deploy;
    if let Some(branch) = args.branch {
        deploy.branch = branch;
    }
    if let Some(remote) = args.remote {
        deploy.remote = remote;
    }
    if let Some(message) = args.message {
        deploy.message = message;
    }
}
