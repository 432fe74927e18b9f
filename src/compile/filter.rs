use std::fmt;

use crate::foundation::core::{Canvas, fmt_secs};

/// Half-open visibility window `[start, end)` on the project timeline, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct TimeWindow {
    pub start: f64,
    pub end: f64,
}

impl TimeWindow {
    pub fn new(start: f64, duration: f64) -> Self {
        Self {
            start,
            end: start + duration,
        }
    }

    pub fn len(&self) -> f64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    fn enable_expr(&self) -> String {
        format!(
            "gte(t,{})*lt(t,{})",
            fmt_secs(self.start),
            fmt_secs(self.end)
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FadeDir {
    In,
    Out,
}

impl FadeDir {
    fn as_str(self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
        }
    }
}

/// Horizontal placement of an overlaid layer.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayX {
    /// Pinned to the canvas origin.
    Fixed,
    /// Slides in from the left edge, reaching the origin after `duration` seconds.
    SlideIn { start: f64, duration: f64 },
}

/// One operation in a filter chain, typed so the compiler can be inspected without parsing
/// engine syntax. `Display` renders the engine's own filter notation.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Filter {
    /// Solid-color source.
    Color {
        color: String,
        canvas: Canvas,
        duration: f64,
        rate: u32,
    },
    /// Scale up/down so the frame covers `canvas`, keeping aspect ratio.
    ScaleCover { canvas: Canvas },
    /// Crop to exactly `canvas`, centered.
    CenterCrop { canvas: Canvas },
    /// Square pixels.
    SetSar,
    Format { pix_fmt: String },
    /// Alpha ramp (video).
    Fade {
        dir: FadeDir,
        start: f64,
        duration: f64,
    },
    /// Composite the second input over the first, visible only within `window`.
    Overlay { x: OverlayX, window: TimeWindow },
    Split { outputs: usize },
    ASplit { outputs: usize },
    /// Keep the first `end` seconds of the source.
    ATrim { end: f64 },
    ASetPtsZero,
    /// Gain ramp (audio).
    AFade {
        dir: FadeDir,
        start: f64,
        duration: f64,
    },
    /// Delay all channels.
    ADelay { millis: u64 },
    Volume { gain: f64 },
    /// Sum `inputs` streams; output lasts as long as the longest one.
    AMix { inputs: usize },
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color {
                color,
                canvas,
                duration,
                rate,
            } => write!(
                f,
                "color=c={color}:s={}x{}:d={}:r={rate}",
                canvas.width,
                canvas.height,
                fmt_secs(*duration)
            ),
            Self::ScaleCover { canvas } => write!(
                f,
                "scale={}:{}:force_original_aspect_ratio=increase",
                canvas.width, canvas.height
            ),
            Self::CenterCrop { canvas } => write!(f, "crop={}:{}", canvas.width, canvas.height),
            Self::SetSar => f.write_str("setsar=1"),
            Self::Format { pix_fmt } => write!(f, "format={pix_fmt}"),
            Self::Fade {
                dir,
                start,
                duration,
            } => write!(
                f,
                "fade=t={}:st={}:d={}:alpha=1",
                dir.as_str(),
                fmt_secs(*start),
                fmt_secs(*duration)
            ),
            Self::Overlay { x, window } => {
                match x {
                    OverlayX::Fixed => f.write_str("overlay=x=0:y=0")?,
                    OverlayX::SlideIn { start, duration } => write!(
                        f,
                        "overlay=x='min(0,(t-{})/{}*W-W)':y=0",
                        fmt_secs(*start),
                        fmt_secs(*duration)
                    )?,
                }
                write!(f, ":enable='{}'", window.enable_expr())
            }
            Self::Split { outputs } => write!(f, "split={outputs}"),
            Self::ASplit { outputs } => write!(f, "asplit={outputs}"),
            Self::ATrim { end } => write!(f, "atrim=start=0:end={}", fmt_secs(*end)),
            Self::ASetPtsZero => f.write_str("asetpts=PTS-STARTPTS"),
            Self::AFade {
                dir,
                start,
                duration,
            } => write!(
                f,
                "afade=t={}:st={}:d={}",
                dir.as_str(),
                fmt_secs(*start),
                fmt_secs(*duration)
            ),
            Self::ADelay { millis } => write!(f, "adelay=delays={millis}:all=1"),
            Self::Volume { gain } => write!(f, "volume={gain}"),
            Self::AMix { inputs } => write!(
                f,
                "amix=inputs={inputs}:duration=longest:dropout_transition=0:normalize=0"
            ),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/filter.rs"]
mod tests;
