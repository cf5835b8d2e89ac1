//! The build steps of the default graph.

mod clean;
mod copy;
mod images;
mod scripts;
mod styles;

pub use clean::CleanStep;
pub use copy::CopyStep;
pub use images::{Compressor, ImageKind, ImageStep};
pub use scripts::{ScriptPipeline, ScriptStep};
pub use styles::StyleStep;

use crate::error::Result;

/// Run CPU-bound work on the blocking pool and wait for it.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}
