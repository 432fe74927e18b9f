use std::future::Future;
use std::path::Path;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::compile::plan::RenderPlan;
use crate::encode::progress::RenderProgress;
use crate::foundation::error::MontageResult;

/// Everything an engine needs for one render.
#[derive(Clone, Copy, Debug)]
pub struct RenderJob<'a> {
    pub plan: &'a RenderPlan,
    pub output: &'a Path,
    pub cancel: &'a CancellationToken,
    pub progress: Option<&'a UnboundedSender<RenderProgress>>,
}

/// What the engine reported for a successful run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EngineReport {
    /// Captured diagnostics (tail of the engine's log output).
    pub diagnostics: String,
    pub elapsed: Duration,
}

/// Executes a [`RenderPlan`] and writes the output file.
///
/// Implementations return [`crate::MontageError::RenderEngine`] for engine failures and
/// [`crate::MontageError::Cancelled`] once `job.cancel` fires. Dropping the returned future must
/// stop any external process it started.
pub trait RenderEngine: Send + Sync {
    fn render(&self, job: RenderJob<'_>) -> impl Future<Output = MontageResult<EngineReport>> + Send;
}
