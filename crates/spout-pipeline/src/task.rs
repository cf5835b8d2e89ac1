//! Tasks and their sequential / parallel composition.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use futures::future::{join_all, BoxFuture};
use futures::FutureExt;

use crate::context::BuildContext;
use crate::error::Result;
use crate::notice::FileNotice;

/// What a step did. Callers only use it for logging and summaries.
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    pub step: &'static str,
    /// Files and directories written, in completion order.
    pub outputs: Vec<PathBuf>,
    /// Inputs that were skipped because of a recoverable failure.
    pub notices: Vec<FileNotice>,
    pub duration: Duration,
}

impl StepReport {
    pub fn new(step: &'static str) -> Self {
        Self {
            step,
            ..Self::default()
        }
    }

    /// Merge another report's outputs and notices into this one.
    pub fn absorb(&mut self, other: StepReport) {
        self.outputs.extend(other.outputs);
        self.notices.extend(other.notices);
    }
}

/// A named unit of work against the filesystem.
#[async_trait]
pub trait Task: Send + Sync {
    fn name(&self) -> &'static str;

    async fn run(&self, ctx: &BuildContext) -> Result<StepReport>;
}

/// A task graph.
#[derive(Clone)]
pub enum Composition {
    Task(Arc<dyn Task>),
    /// Members run one after another; the first failure stops the sequence.
    Sequence(Vec<Composition>),
    /// Members run concurrently. A failing member never cancels its
    /// siblings; the group waits for all of them and then reports the first
    /// failure in declaration order.
    Parallel(Vec<Composition>),
}

impl Composition {
    pub fn task(task: impl Task + 'static) -> Self {
        Composition::Task(Arc::new(task))
    }

    pub fn sequence(items: impl IntoIterator<Item = Composition>) -> Self {
        Composition::Sequence(items.into_iter().collect())
    }

    pub fn parallel(items: impl IntoIterator<Item = Composition>) -> Self {
        Composition::Parallel(items.into_iter().collect())
    }

    /// Run the graph to completion, returning one report per task.
    pub fn run<'a>(&'a self, ctx: &'a BuildContext) -> BoxFuture<'a, Result<Vec<StepReport>>> {
        async move {
            match self {
                Composition::Task(task) => {
                    let started = Instant::now();
                    tracing::debug!(step = task.name(), "starting");
                    let mut report = task.run(ctx).await.inspect_err(|err| {
                        tracing::error!(step = task.name(), "failed: {}", err);
                    })?;
                    report.duration = started.elapsed();
                    tracing::info!(
                        step = task.name(),
                        outputs = report.outputs.len(),
                        notices = report.notices.len(),
                        "finished in {}ms",
                        report.duration.as_millis()
                    );
                    Ok(vec![report])
                }
                Composition::Sequence(items) => {
                    let mut reports = Vec::new();
                    for item in items {
                        reports.extend(item.run(ctx).await?);
                    }
                    Ok(reports)
                }
                Composition::Parallel(items) => {
                    let results = join_all(items.iter().map(|item| item.run(ctx))).await;
                    let mut reports = Vec::new();
                    let mut first_error = None;
                    for result in results {
                        match result {
                            Ok(done) => reports.extend(done),
                            Err(err) if first_error.is_none() => first_error = Some(err),
                            Err(_) => {}
                        }
                    }
                    match first_error {
                        Some(err) => Err(err),
                        None => Ok(reports),
                    }
                }
            }
        }
        .boxed()
    }

    /// Task names in declaration order.
    pub fn step_names(&self) -> Vec<&'static str> {
        match self {
            Composition::Task(task) => vec![task.name()],
            Composition::Sequence(items) | Composition::Parallel(items) => {
                items.iter().flat_map(Composition::step_names).collect()
            }
        }
    }

    /// Human readable shape, e.g. `clean → (scripts ∥ styles)`.
    pub fn describe(&self) -> String {
        match self {
            Composition::Task(task) => task.name().to_string(),
            Composition::Sequence(items) => items
                .iter()
                .map(Composition::describe)
                .collect::<Vec<_>>()
                .join(" → "),
            Composition::Parallel(items) => format!(
                "({})",
                items
                    .iter()
                    .map(Composition::describe)
                    .collect::<Vec<_>>()
                    .join(" ∥ ")
            ),
        }
    }
}

impl std::fmt::Debug for Composition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.describe())
    }
}
