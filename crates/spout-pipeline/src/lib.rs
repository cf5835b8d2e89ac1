//! Build steps and task composition for the spout asset pipeline.
//!
//! A build is a [`Composition`] of [`Task`]s: `Sequence`s wait for each member
//! before starting the next, `Parallel` groups start every member at once and
//! finish when all of them have finished. The standard graphs are exposed as
//! [`default_build`] and [`deploy_build`]:
//!
//! ```text
//! default = clean → (scripts ∥ styles ∥ images ∥ copy)
//! deploy  = default → publish
//! ```
//!
//! Every step reads its globs from the immutable path table in the
//! [`BuildContext`] and writes under its own output directory.
//!
//! # Example
//!
//! ```rust,no_run
//! use spout_config::SiteConfig;
//! use spout_pipeline::{default_build, BuildContext};
//! use std::sync::Arc;
//!
//! # async fn run() -> spout_pipeline::Result<()> {
//! let ctx = BuildContext::new("/path/to/site", Arc::new(SiteConfig::default()));
//! let reports = default_build().run(&ctx).await?;
//! for report in reports {
//!     println!("{}: {} files", report.step, report.outputs.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod context;
pub mod deploy;
pub mod error;
pub mod file;
pub mod notice;
pub mod steps;
pub mod task;

pub use context::BuildContext;
pub use deploy::{DeployError, DeployStep, GhPages, PublishReport};
pub use error::{PipelineError, Result};
pub use file::{glob_entries, FileItem, SourceEntry};
pub use notice::{FileNotice, LogNotifier, Notifier};
pub use steps::{CleanStep, CopyStep, ImageStep, ScriptPipeline, ScriptStep, StyleStep};
pub use task::{Composition, StepReport, Task};

/// `clean → (scripts ∥ styles ∥ images ∥ copy)`
pub fn default_build() -> Composition {
    Composition::sequence([
        Composition::task(CleanStep),
        Composition::parallel([
            Composition::task(ScriptStep),
            Composition::task(StyleStep),
            Composition::task(ImageStep),
            Composition::task(CopyStep),
        ]),
    ])
}

/// `default → publish`
pub fn deploy_build() -> Composition {
    Composition::sequence([default_build(), Composition::task(DeployStep)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_build_cleans_before_parallel_steps() {
        assert_eq!(
            default_build().describe(),
            "clean → (scripts ∥ styles ∥ images ∥ copy)"
        );
    }

    #[test]
    fn deploy_build_publishes_last() {
        assert_eq!(
            deploy_build().step_names(),
            ["clean", "scripts", "styles", "images", "copy", "deploy"]
        );
    }
}
