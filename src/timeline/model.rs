use std::collections::{BTreeMap, HashSet};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::foundation::core::{Canvas, FrameRate, MediaKind, Resolution};
use crate::foundation::error::{MontageResult, ValidationError};

/// The full declarative edit submitted for compilation.
///
/// JSON shape: `{ "tracks": [...], "projectSettings": {...}, "assets": { "<id>": {...} } }`.
/// Assets are keyed by id in a sorted map so iteration order is stable.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timeline {
    pub tracks: Vec<Track>,
    pub project_settings: ProjectSettings,
    #[serde(default)]
    pub assets: BTreeMap<String, Asset>,
}

/// A piece of source media. Its id is its key in [`Timeline::assets`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(rename = "type", alias = "kind")]
    pub kind: MediaKind,
    /// Logical reference (url or relative path) before resolution.
    #[serde(alias = "url", alias = "locationHint")]
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(
        default,
        alias = "duration",
        skip_serializing_if = "Option::is_none"
    )]
    pub native_duration: Option<f64>,
    /// Remote storage bucket, when the asset lives in an object store.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket: Option<String>,
}

/// An ordered lane of same-kind clips.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    #[serde(rename = "type", alias = "kind")]
    pub kind: MediaKind,
    #[serde(default)]
    pub name: String,
    pub clips: Vec<Clip>,
    #[serde(default)]
    pub muted: bool,
    #[serde(default = "unit_gain")]
    pub volume: f64,
}

/// One timed placement of an asset on a track.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clip {
    pub id: String,
    pub asset_id: String,
    pub track_id: String,
    /// Seconds from project start.
    pub start_time: f64,
    /// Visible/audible length in seconds, taken from the head of the source.
    pub duration: f64,
    #[serde(default = "unit_gain")]
    pub volume: f64,
    #[serde(default)]
    pub fade_in: f64,
    #[serde(default)]
    pub fade_out: f64,
    #[serde(default)]
    pub transition: Transition,
}

/// How a visual clip enters and leaves the canvas.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
    #[default]
    Cut,
    Fade,
    Dissolve,
    Wipe,
}

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    #[default]
    Slideshow,
    KenBurns,
    Glitch,
    Fade,
    Cinematic,
}

/// Global project parameters.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSettings {
    #[serde(default)]
    pub title: String,
    /// Authoritative total render length in seconds.
    pub duration: f64,
    #[serde(default)]
    pub resolution: Resolution,
    #[serde(default, alias = "framerate")]
    pub frame_rate: FrameRate,
    /// Cosmetic tag; not consumed by the compiler.
    #[serde(default)]
    pub style: Style,
    /// Carried through for callers that publish the result; never read here.
    #[serde(default, alias = "uploadToYouTube")]
    pub upload_target: bool,
}

impl ProjectSettings {
    pub fn new(title: impl Into<String>, duration: f64) -> Self {
        Self {
            title: title.into(),
            duration,
            resolution: Resolution::default(),
            frame_rate: FrameRate::default(),
            style: Style::default(),
            upload_target: false,
        }
    }

    pub fn canvas(&self) -> Canvas {
        self.resolution.canvas()
    }
}

fn unit_gain() -> f64 {
    1.0
}

impl Asset {
    pub fn new(kind: MediaKind, location: impl Into<String>) -> Self {
        Self {
            kind,
            location: location.into(),
            name: None,
            native_duration: None,
            bucket: None,
        }
    }
}

impl Timeline {
    /// Parse a timeline payload from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> MontageResult<Self> {
        let tl: Timeline = serde_json::from_reader(r)
            .map_err(|e| ValidationError::malformed(format!("parse timeline JSON: {e}")))?;
        Ok(tl)
    }

    /// Parse a timeline payload from a JSON string.
    pub fn from_json_str(s: &str) -> MontageResult<Self> {
        let tl: Timeline = serde_json::from_str(s)
            .map_err(|e| ValidationError::malformed(format!("parse timeline JSON: {e}")))?;
        Ok(tl)
    }

    /// Parse a timeline payload from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> MontageResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ValidationError::malformed(format!("open timeline JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Distinct asset ids referenced by at least one clip, in first-reference order
    /// (track declaration order, then clip declaration order).
    pub fn referenced_asset_ids(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for track in &self.tracks {
            for clip in &track.clips {
                if seen.insert(clip.asset_id.as_str()) {
                    out.push(clip.asset_id.as_str());
                }
            }
        }
        out
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    pub fn clip_count(&self) -> usize {
        self.tracks.iter().map(|t| t.clips.len()).sum()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/model.rs"]
mod tests;
