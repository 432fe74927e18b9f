use std::fmt;

/// Output canvas dimensions in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

/// Output resolutions a project may target.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum Resolution {
    #[serde(rename = "720p")]
    Hd720,
    #[default]
    #[serde(rename = "1080p")]
    Hd1080,
    #[serde(rename = "4K", alias = "4k")]
    Uhd4k,
}

impl Resolution {
    pub fn canvas(self) -> Canvas {
        match self {
            Self::Hd720 => Canvas {
                width: 1280,
                height: 720,
            },
            Self::Hd1080 => Canvas {
                width: 1920,
                height: 1080,
            },
            Self::Uhd4k => Canvas {
                width: 3840,
                height: 2160,
            },
        }
    }
}

/// Output frame rates a project may target. Serialized as a bare number (`30`, `60`).
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "u32", into = "u32")]
pub enum FrameRate {
    #[default]
    Fps30,
    Fps60,
}

impl FrameRate {
    pub fn as_u32(self) -> u32 {
        match self {
            Self::Fps30 => 30,
            Self::Fps60 => 60,
        }
    }
}

impl TryFrom<u32> for FrameRate {
    type Error = String;

    fn try_from(v: u32) -> Result<Self, Self::Error> {
        match v {
            30 => Ok(Self::Fps30),
            60 => Ok(Self::Fps60),
            other => Err(format!("unsupported frame rate {other} (expected 30 or 60)")),
        }
    }
}

impl From<FrameRate> for u32 {
    fn from(r: FrameRate) -> Self {
        r.as_u32()
    }
}

/// Media kind shared by assets and tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
    Audio,
}

impl MediaKind {
    /// `true` for kinds that contribute pixels to the compositing chain.
    pub fn is_visual(self) -> bool {
        matches!(self, Self::Video | Self::Image)
    }

    /// Default file extension used when staging fetched bytes of this kind.
    pub fn default_extension(self) -> &'static str {
        match self {
            Self::Video => "mp4",
            Self::Image => "jpg",
            Self::Audio => "mp3",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => f.write_str("video"),
            Self::Image => f.write_str("image"),
            Self::Audio => f.write_str("audio"),
        }
    }
}

/// Format seconds for the engine's instruction language.
///
/// Uses Rust's shortest round-trip representation so identical inputs always serialize to
/// identical text; integral values print without a fractional part.
pub(crate) fn fmt_secs(secs: f64) -> String {
    if secs == 0.0 {
        // Normalizes -0.0.
        return "0".to_string();
    }
    format!("{secs}")
}

/// Seconds to whole milliseconds, rounded to nearest.
pub(crate) fn secs_to_millis(secs: f64) -> u64 {
    (secs * 1000.0).round().max(0.0) as u64
}

/// Reduce arbitrary text to a portable file stem: ASCII alphanumerics, `-` and `_` survive,
/// everything else becomes `_`.
pub(crate) fn sanitize_file_stem(s: &str) -> String {
    let out: String = s
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if out.is_empty() {
        "untitled".to_string()
    } else {
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
