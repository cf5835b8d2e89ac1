use async_trait::async_trait;

use crate::context::BuildContext;
use crate::error::{PipelineError, Result};
use crate::task::{StepReport, Task};

/// Removes the output root.
#[derive(Debug, Default, Clone, Copy)]
pub struct CleanStep;

#[async_trait]
impl Task for CleanStep {
    fn name(&self) -> &'static str {
        "clean"
    }

    async fn run(&self, ctx: &BuildContext) -> Result<StepReport> {
        let output = ctx.paths().output();
        match tokio::fs::remove_dir_all(output).await {
            Ok(()) => tracing::debug!("removed {}", output.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("{} does not exist, nothing to clean", output.display());
            }
            Err(e) => return Err(PipelineError::io(output, e)),
        }
        Ok(StepReport::new(self.name()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spout_config::SiteConfig;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[tokio::test]
    async fn removes_previous_output() {
        let dir = TempDir::new().unwrap();
        let stale = dir.path().join("dist/css/old.css");
        std::fs::create_dir_all(stale.parent().unwrap()).unwrap();
        std::fs::write(&stale, "a{}").unwrap();

        let ctx = BuildContext::new(dir.path(), Arc::new(SiteConfig::default()));
        CleanStep.run(&ctx).await.unwrap();
        assert!(!dir.path().join("dist").exists());
    }

    #[tokio::test]
    async fn missing_output_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let ctx = BuildContext::new(dir.path(), Arc::new(SiteConfig::default()));
        let report = CleanStep.run(&ctx).await.unwrap();
        assert!(report.outputs.is_empty());
    }
}
