use std::collections::VecDeque;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Instant;

use tokio::io::{AsyncBufRead, AsyncBufReadExt as _, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::UnboundedSender;

use crate::compile::plan::RenderPlan;
use crate::encode::engine::{EngineReport, RenderEngine, RenderJob};
use crate::encode::progress::{ProgressParser, RenderProgress};
use crate::foundation::error::{MontageError, MontageResult};

#[derive(Clone, Debug)]
pub struct FfmpegEngineOpts {
    /// Executable to run; looked up on `PATH` when not absolute.
    pub program: PathBuf,
    /// Value passed to `-loglevel`.
    pub loglevel: String,
    pub overwrite: bool,
    /// Maximum bytes of stderr kept for diagnostics (the tail is kept).
    pub diagnostics_limit: usize,
}

impl Default for FfmpegEngineOpts {
    fn default() -> Self {
        Self {
            program: PathBuf::from("ffmpeg"),
            loglevel: "error".to_string(),
            overwrite: true,
            diagnostics_limit: 64 * 1024,
        }
    }
}

impl FfmpegEngineOpts {
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_loglevel(mut self, loglevel: impl Into<String>) -> Self {
        self.loglevel = loglevel.into();
        self
    }

    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    program_runs(Path::new("ffmpeg"))
}

fn program_runs(program: &Path) -> bool {
    std::process::Command::new(program)
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

pub fn ensure_parent_dir(path: &Path) -> MontageResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output directory '{}'", parent.display()))?;
    }
    Ok(())
}

/// Runs plans through the system `ffmpeg` binary.
#[derive(Clone, Debug, Default)]
pub struct FfmpegEngine {
    opts: FfmpegEngineOpts,
}

impl FfmpegEngine {
    pub fn new(opts: FfmpegEngineOpts) -> Self {
        Self { opts }
    }

    pub fn opts(&self) -> &FfmpegEngineOpts {
        &self.opts
    }

    /// Whether the configured program starts and answers `-version`.
    pub fn is_available(&self) -> bool {
        program_runs(&self.opts.program)
    }

    /// Full argument vector, global options included.
    pub fn args(&self, plan: &RenderPlan, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = [
            "-hide_banner",
            "-nostdin",
            if self.opts.overwrite { "-y" } else { "-n" },
            "-loglevel",
            self.opts.loglevel.as_str(),
            "-progress",
            "pipe:1",
            "-nostats",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();
        args.extend(plan.ffmpeg_args(output));
        args
    }
}

impl RenderEngine for FfmpegEngine {
    async fn render(&self, job: RenderJob<'_>) -> MontageResult<EngineReport> {
        ensure_parent_dir(job.output)?;
        if !self.opts.overwrite && job.output.exists() {
            return Err(MontageError::render_engine(format!(
                "output file '{}' already exists",
                job.output.display()
            )));
        }

        let started = Instant::now();
        let mut cmd = Command::new(&self.opts.program);
        cmd.args(self.args(job.plan, job.output))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(
            program = %self.opts.program.display(),
            output = %job.output.display(),
            inputs = job.plan.inputs.len(),
            "spawning ffmpeg"
        );
        let mut child = cmd.spawn().map_err(|e| {
            MontageError::render_engine(format!(
                "failed to spawn '{}' (is it installed and on PATH?): {e}",
                self.opts.program.display()
            ))
        })?;

        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| MontageError::render_engine("failed to open ffmpeg stderr (unexpected)"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MontageError::render_engine("failed to open ffmpeg stdout (unexpected)"))?;

        let stderr_task = tokio::spawn(drain_tail(stderr, self.opts.diagnostics_limit));
        let progress_task = tokio::spawn(pump_progress(
            stdout,
            job.plan.encode.duration,
            job.progress.cloned(),
        ));

        let status = tokio::select! {
            status = child.wait() => status.map_err(|e| {
                MontageError::render_engine(format!("failed to wait for ffmpeg to finish: {e}"))
            })?,
            () = job.cancel.cancelled() => {
                tracing::info!("cancellation requested; terminating ffmpeg");
                if let Err(e) = child.start_kill() {
                    tracing::warn!(error = %e, "failed to signal ffmpeg");
                }
                let _ = child.wait().await;
                stderr_task.abort();
                progress_task.abort();
                return Err(MontageError::cancelled("render cancelled while ffmpeg was running"));
            }
        };

        let diagnostics = stderr_task.await.unwrap_or_default();
        let _ = progress_task.await;

        if !status.success() {
            return Err(MontageError::render_engine_with(
                format!("ffmpeg exited with status {status}"),
                diagnostics.trim().to_string(),
            ));
        }

        Ok(EngineReport {
            diagnostics,
            elapsed: started.elapsed(),
        })
    }
}

/// Next `\n`-terminated line with invalid UTF-8 replaced; `None` at EOF or on a read error.
async fn next_lossy_line<R: AsyncBufRead + Unpin>(
    reader: &mut R,
    buf: &mut Vec<u8>,
) -> Option<String> {
    buf.clear();
    match reader.read_until(b'\n', buf).await {
        Ok(0) => None,
        Ok(_) => {
            let mut line = buf.as_slice();
            line = line.strip_suffix(b"\n").unwrap_or(line);
            line = line.strip_suffix(b"\r").unwrap_or(line);
            Some(String::from_utf8_lossy(line).into_owned())
        }
        Err(e) => {
            tracing::debug!(error = %e, "ffmpeg pipe read failed");
            None
        }
    }
}

/// Read `reader` to the end, keeping at most `limit` bytes of trailing lines.
async fn drain_tail<R: AsyncRead + Unpin>(reader: R, limit: usize) -> String {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    let mut kept = VecDeque::<String>::new();
    let mut bytes = 0usize;
    while let Some(line) = next_lossy_line(&mut reader, &mut buf).await {
        bytes += line.len() + 1;
        kept.push_back(line);
        while bytes > limit {
            match kept.pop_front() {
                Some(old) => bytes -= old.len() + 1,
                None => break,
            }
        }
    }
    let mut out = String::with_capacity(bytes);
    for line in kept {
        out.push_str(&line);
        out.push('\n');
    }
    out
}

async fn pump_progress<R: AsyncRead + Unpin>(
    reader: R,
    total_secs: f64,
    tx: Option<UnboundedSender<RenderProgress>>,
) {
    let mut parser = ProgressParser::new(total_secs);
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    while let Some(line) = next_lossy_line(&mut reader, &mut buf).await {
        let Some(sample) = parser.feed_line(&line) else {
            continue;
        };
        tracing::trace!(frame = sample.frame, fraction = sample.fraction, "render progress");
        if let Some(tx) = &tx {
            // A dropped receiver just means nobody is listening anymore.
            let _ = tx.send(sample);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
