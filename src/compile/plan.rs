use std::ffi::OsString;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::compile::filter::Filter;
use crate::foundation::core::{Canvas, FrameRate, MediaKind, fmt_secs};
use crate::foundation::math::Fnv1a64;

/// Engine-ready render plan for one timeline.
///
/// A plan consists of:
/// - ordered input bindings (`inputs`), one slot per bound asset
/// - a composition graph (`graph`) of filter chains joined by labelled edges
/// - the output mapping (`outputs`)
/// - global encode parameters (`encode`)
///
/// The graph is only turned into engine syntax by [`RenderPlan::filter_complex`] and
/// [`RenderPlan::ffmpeg_args`].
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct RenderPlan {
    pub inputs: Vec<InputBinding>,
    pub graph: FilterGraph,
    pub outputs: OutputMapping,
    pub encode: EncodeParams,
    pub stats: CompileStats,
}

/// One engine input slot.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct InputBinding {
    /// Zero-based engine input index.
    pub slot: u32,
    /// Asset bound to this slot; `None` for synthesized inputs.
    pub asset_id: Option<String>,
    pub source: InputSource,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputSource {
    /// Decoded media file (video or audio).
    File { path: PathBuf },
    /// Still image, looped for the whole render at the project frame rate.
    Still {
        path: PathBuf,
        duration: f64,
        rate: u32,
    },
    /// Synthesized solid color (degenerate plans).
    SolidColor {
        color: String,
        canvas: Canvas,
        duration: f64,
        rate: u32,
    },
}

impl InputSource {
    pub(crate) fn for_asset(kind: MediaKind, path: PathBuf, duration: f64, rate: u32) -> Self {
        match kind {
            MediaKind::Image => Self::Still {
                path,
                duration,
                rate,
            },
            MediaKind::Video | MediaKind::Audio => Self::File { path },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamKind {
    Video,
    Audio,
}

/// Name of an edge inside the graph (`[label]` in engine syntax).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
#[serde(transparent)]
pub struct Label(pub String);

impl Label {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Where a chain reads from.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Pad {
    /// A stream of an engine input slot (`[0:v]`).
    Input { slot: u32, stream: StreamKind },
    /// The output of another node.
    Link(Label),
}

/// A linear filter chain with labelled inputs and outputs.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct FilterNode {
    pub inputs: Vec<Pad>,
    pub chain: Vec<Filter>,
    pub outputs: Vec<Label>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
pub struct FilterGraph {
    pub nodes: Vec<FilterNode>,
}

impl FilterGraph {
    /// The node producing `label`, if any.
    pub fn producer(&self, label: &str) -> Option<&FilterNode> {
        self.nodes
            .iter()
            .find(|n| n.outputs.iter().any(|o| o.as_str() == label))
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct OutputMapping {
    pub video: Label,
    pub audio: Option<Label>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct EncodeParams {
    /// Global duration bound in seconds; truncates anything running longer.
    pub duration: f64,
    pub canvas: Canvas,
    pub frame_rate: FrameRate,
    pub pix_fmt: String,
    pub video_codec: String,
    pub preset: String,
    pub crf: u8,
    pub audio_codec: String,
    pub audio_bitrate: String,
}

impl EncodeParams {
    pub(crate) fn h264_aac(duration: f64, canvas: Canvas, frame_rate: FrameRate) -> Self {
        Self {
            duration,
            canvas,
            frame_rate,
            pix_fmt: "yuv420p".to_string(),
            video_codec: "libx264".to_string(),
            preset: "medium".to_string(),
            crf: 23,
            audio_codec: "aac".to_string(),
            audio_bitrate: "128k".to_string(),
        }
    }
}

/// Counters describing what the compiler did with the timeline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub struct CompileStats {
    pub inputs: usize,
    pub overlays: usize,
    pub audio_streams: usize,
    /// Clips dropped because their asset has no binding.
    pub unbound_clips: usize,
    /// Clips on muted audio tracks.
    pub muted_clips: usize,
}

impl RenderPlan {
    /// `true` when the plan is the solid-color fallback.
    pub fn is_degenerate(&self) -> bool {
        self.inputs.len() == 1
            && matches!(self.inputs[0].source, InputSource::SolidColor { .. })
    }

    pub fn binding(&self, asset_id: &str) -> Option<&InputBinding> {
        self.inputs
            .iter()
            .find(|b| b.asset_id.as_deref() == Some(asset_id))
    }

    /// Serialize the graph in the engine's `-filter_complex` syntax.
    pub fn filter_complex(&self) -> String {
        let mut out = String::new();
        for (i, node) in self.graph.nodes.iter().enumerate() {
            if i > 0 {
                out.push(';');
            }
            for pad in &node.inputs {
                match pad {
                    Pad::Input { slot, stream } => {
                        let s = match stream {
                            StreamKind::Video => 'v',
                            StreamKind::Audio => 'a',
                        };
                        let _ = write!(out, "[{slot}:{s}]");
                    }
                    Pad::Link(label) => {
                        let _ = write!(out, "[{}]", label.as_str());
                    }
                }
            }
            for (j, filter) in node.chain.iter().enumerate() {
                if j > 0 {
                    out.push(',');
                }
                let _ = write!(out, "{filter}");
            }
            for label in &node.outputs {
                let _ = write!(out, "[{}]", label.as_str());
            }
        }
        out
    }

    /// Full argument vector for one engine invocation writing `output`, excluding global
    /// options such as overwrite and log level.
    pub fn ffmpeg_args(&self, output: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::new();

        for input in &self.inputs {
            match &input.source {
                InputSource::File { path } => {
                    args.push("-i".into());
                    args.push(path.as_os_str().to_owned());
                }
                InputSource::Still {
                    path,
                    duration,
                    rate,
                } => {
                    push_all(
                        &mut args,
                        [
                            "-loop".to_string(),
                            "1".to_string(),
                            "-framerate".to_string(),
                            rate.to_string(),
                            "-t".to_string(),
                            fmt_secs(*duration),
                            "-i".to_string(),
                        ],
                    );
                    args.push(path.as_os_str().to_owned());
                }
                InputSource::SolidColor {
                    color,
                    canvas,
                    duration,
                    rate,
                } => {
                    let src = Filter::Color {
                        color: color.clone(),
                        canvas: *canvas,
                        duration: *duration,
                        rate: *rate,
                    };
                    push_all(
                        &mut args,
                        [
                            "-f".to_string(),
                            "lavfi".to_string(),
                            "-i".to_string(),
                            src.to_string(),
                        ],
                    );
                }
            }
        }

        let e = &self.encode;
        let mut tail = vec![
            "-filter_complex".to_string(),
            self.filter_complex(),
            "-map".to_string(),
            format!("[{}]", self.outputs.video.as_str()),
        ];
        match &self.outputs.audio {
            Some(a) => tail.extend(["-map".to_string(), format!("[{}]", a.as_str())]),
            None => tail.push("-an".to_string()),
        }
        tail.extend([
            "-c:v".to_string(),
            e.video_codec.clone(),
            "-preset".to_string(),
            e.preset.clone(),
            "-crf".to_string(),
            e.crf.to_string(),
            "-pix_fmt".to_string(),
            e.pix_fmt.clone(),
            "-r".to_string(),
            e.frame_rate.as_u32().to_string(),
        ]);
        if self.outputs.audio.is_some() {
            tail.extend([
                "-c:a".to_string(),
                e.audio_codec.clone(),
                "-b:a".to_string(),
                e.audio_bitrate.clone(),
            ]);
        }
        tail.extend([
            "-t".to_string(),
            fmt_secs(e.duration),
            "-movflags".to_string(),
            "+faststart".to_string(),
        ]);
        push_all(&mut args, tail);
        args.push(output.as_os_str().to_owned());
        args
    }

    /// Stable 64-bit fingerprint of everything the engine will see except the output path.
    pub fn fingerprint(&self) -> u64 {
        let mut h = Fnv1a64::new_default();
        for arg in self.ffmpeg_args(Path::new("")) {
            h.write_str(&arg.to_string_lossy());
        }
        h.finish()
    }
}

fn push_all(args: &mut Vec<OsString>, items: impl IntoIterator<Item = String>) {
    args.extend(items.into_iter().map(OsString::from));
}

#[cfg(test)]
#[path = "../../tests/unit/compile/plan.rs"]
mod tests;
