use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use futures::future::join_all;
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::assets::resolver::AssetResolver;
use crate::assets::stage::ScratchDir;
use crate::compile::compiler::{ResolvedAssets, compile};
use crate::encode::engine::{RenderEngine, RenderJob};
use crate::encode::progress::RenderProgress;
use crate::foundation::core::sanitize_file_stem;
use crate::foundation::error::{MontageError, MontageResult};
use crate::timeline::model::Timeline;

#[derive(Clone, Debug)]
pub struct OrchestratorOpts {
    /// Directory receiving rendered files.
    pub output_dir: PathBuf,
    /// Parent of the per-invocation scratch directories.
    pub scratch_root: PathBuf,
    /// Upper bound on one engine run.
    pub render_timeout: Duration,
    /// Delete a partially written output file when the render fails.
    pub remove_partial_output: bool,
}

impl Default for OrchestratorOpts {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            scratch_root: std::env::temp_dir(),
            render_timeout: Duration::from_secs(600),
            remove_partial_output: true,
        }
    }
}

impl OrchestratorOpts {
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_scratch_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_root = dir.into();
        self
    }

    pub fn with_render_timeout(mut self, timeout: Duration) -> Self {
        self.render_timeout = timeout;
        self
    }

    pub fn with_remove_partial_output(mut self, remove: bool) -> Self {
        self.remove_partial_output = remove;
        self
    }
}

/// An asset that could not be resolved or staged; its clips are absent from the output.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetFailure {
    pub asset_id: String,
    pub message: String,
}

/// Outcome of a successful invocation.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResult {
    pub output_path: PathBuf,
    pub byte_size: u64,
    pub effective_duration: f64,
    pub track_count: usize,
    pub clip_count: usize,
    pub compile_id: Uuid,
    pub plan_fingerprint: u64,
    pub asset_failures: Vec<AssetFailure>,
}

/// Drives one timeline through validate, resolve, stage, compile, render, verify and cleanup.
///
/// Holds no per-invocation state, so one orchestrator can serve concurrent invocations.
pub struct Orchestrator<R, E> {
    resolver: R,
    engine: E,
    opts: OrchestratorOpts,
    progress: Option<UnboundedSender<RenderProgress>>,
}

impl<R: AssetResolver, E: RenderEngine> Orchestrator<R, E> {
    pub fn new(resolver: R, engine: E, opts: OrchestratorOpts) -> Self {
        Self {
            resolver,
            engine,
            opts,
            progress: None,
        }
    }

    /// Forward engine progress samples to `tx`.
    pub fn with_progress(mut self, tx: UnboundedSender<RenderProgress>) -> Self {
        self.progress = Some(tx);
        self
    }

    pub fn opts(&self) -> &OrchestratorOpts {
        &self.opts
    }

    pub async fn run(&self, timeline: &Timeline) -> MontageResult<RenderResult> {
        self.run_with_cancel(timeline, &CancellationToken::new())
            .await
    }

    #[tracing::instrument(
        skip(self, timeline, cancel),
        fields(title = %timeline.project_settings.title, compile_id)
    )]
    pub async fn run_with_cancel(
        &self,
        timeline: &Timeline,
        cancel: &CancellationToken,
    ) -> MontageResult<RenderResult> {
        timeline.validate()?;

        let compile_id = Uuid::new_v4();
        tracing::Span::current().record("compile_id", tracing::field::display(compile_id));

        if cancel.is_cancelled() {
            return Err(MontageError::cancelled("cancelled before start"));
        }

        let scratch = ScratchDir::create(&self.opts.scratch_root, compile_id).await?;
        let result = self.run_in(&scratch, timeline, compile_id, cancel).await;
        scratch.close();

        match &result {
            Ok(r) => tracing::info!(
                output = %r.output_path.display(),
                bytes = r.byte_size,
                failed_assets = r.asset_failures.len(),
                "render finished"
            ),
            Err(e) => tracing::warn!(kind = e.kind(), error = %e, "render failed"),
        }
        result
    }

    async fn run_in(
        &self,
        scratch: &ScratchDir,
        timeline: &Timeline,
        compile_id: Uuid,
        cancel: &CancellationToken,
    ) -> MontageResult<RenderResult> {
        let referenced: Vec<_> = timeline
            .referenced_asset_ids()
            .into_iter()
            .filter_map(|id| timeline.assets.get(id).map(|asset| (id, asset)))
            .collect();

        let lookups = referenced.iter().map(|&(id, asset)| async move {
            (id, asset, self.resolver.resolve(id, asset).await)
        });
        let outcomes = tokio::select! {
            outcomes = join_all(lookups) => outcomes,
            () = cancel.cancelled() => {
                return Err(MontageError::cancelled("cancelled while resolving assets"));
            }
        };

        let mut resolved = ResolvedAssets::new();
        let mut asset_failures = Vec::new();
        for (index, (id, asset, outcome)) in outcomes.into_iter().enumerate() {
            let staged = match outcome {
                Ok(location) => scratch
                    .stage(index, id, asset, location)
                    .await
                    .map_err(|e| e.to_string()),
                Err(e) => Err(e.to_string()),
            };
            match staged {
                Ok(path) => resolved.insert(id, path),
                Err(message) => {
                    tracing::warn!(asset = id, error = %message, "asset unavailable; its clips are skipped");
                    asset_failures.push(AssetFailure {
                        asset_id: id.to_string(),
                        message,
                    });
                }
            }
        }

        let plan = compile(timeline, &resolved);
        let plan_fingerprint = plan.fingerprint();
        tracing::info!(
            inputs = plan.stats.inputs,
            overlays = plan.stats.overlays,
            audio_streams = plan.stats.audio_streams,
            unbound_clips = plan.stats.unbound_clips,
            degenerate = plan.is_degenerate(),
            fingerprint = %format!("{plan_fingerprint:016x}"),
            "compiled render plan"
        );

        if cancel.is_cancelled() {
            return Err(MontageError::cancelled("cancelled before rendering"));
        }

        let output_path = self.opts.output_dir.join(output_file_name(
            &timeline.project_settings.title,
            compile_id,
            unix_millis(),
        ));
        let job = RenderJob {
            plan: &plan,
            output: &output_path,
            cancel,
            progress: self.progress.as_ref(),
        };
        let rendered = match tokio::time::timeout(self.opts.render_timeout, self.engine.render(job)).await {
            Ok(r) => r,
            Err(_) => Err(MontageError::render_engine(format!(
                "render timed out after {}s",
                self.opts.render_timeout.as_secs_f64()
            ))),
        };
        let report = match rendered {
            Ok(report) => report,
            Err(e) => {
                self.discard_output(&output_path);
                return Err(e);
            }
        };
        tracing::debug!(elapsed_ms = report.elapsed.as_millis() as u64, "engine finished");

        let byte_size = match tokio::fs::metadata(&output_path).await {
            Ok(m) => m.len(),
            Err(_) => {
                return Err(MontageError::render_engine(format!(
                    "engine reported success but '{}' was not written",
                    output_path.display()
                )));
            }
        };
        if byte_size == 0 {
            self.discard_output(&output_path);
            return Err(MontageError::render_engine(format!(
                "engine produced an empty file at '{}'",
                output_path.display()
            )));
        }

        Ok(RenderResult {
            output_path,
            byte_size,
            effective_duration: timeline.project_settings.duration,
            track_count: timeline.track_count(),
            clip_count: timeline.clip_count(),
            compile_id,
            plan_fingerprint,
            asset_failures,
        })
    }

    fn discard_output(&self, path: &Path) {
        if !self.opts.remove_partial_output {
            return;
        }
        match std::fs::remove_file(path) {
            Ok(()) => tracing::debug!(path = %path.display(), "removed partial output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to remove partial output"),
        }
    }
}

/// `<title>_timeline_<millis>_<first 8 hex digits of the compile id>.mp4`
pub(crate) fn output_file_name(title: &str, compile_id: Uuid, millis: u128) -> String {
    let id = compile_id.simple().to_string();
    format!(
        "{}_timeline_{millis}_{}.mp4",
        sanitize_file_stem(title),
        &id[..8]
    )
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

#[cfg(test)]
#[path = "../../tests/unit/session/orchestrator.rs"]
mod tests;
