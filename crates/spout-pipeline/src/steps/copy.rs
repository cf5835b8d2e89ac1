use async_trait::async_trait;
use futures::future::try_join_all;
use spout_config::Category;

use crate::context::BuildContext;
use crate::error::Result;
use crate::file::glob_entries;
use crate::task::{StepReport, Task};

/// Copies static files verbatim, keeping their path below the glob base.
///
/// Matched directories are recreated even when empty.
#[derive(Debug, Default, Clone, Copy)]
pub struct CopyStep;

#[async_trait]
impl Task for CopyStep {
    fn name(&self) -> &'static str {
        "copy"
    }

    async fn run(&self, ctx: &BuildContext) -> Result<StepReport> {
        let paths = ctx.paths();
        let out_dir = paths.output_for(Category::Copy);
        let entries = glob_entries(paths.root(), paths.patterns_for(Category::Copy))?;

        let written = try_join_all(entries.iter().map(|entry| {
            let out_dir = &out_dir;
            async move { entry.load().await?.write_to(out_dir).await }
        }))
        .await?;

        let mut report = StepReport::new(self.name());
        report.outputs = written;
        Ok(report)
    }
}
