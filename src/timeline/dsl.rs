use std::collections::BTreeMap;

use crate::foundation::core::{FrameRate, MediaKind, Resolution};
use crate::foundation::error::{MontageResult, ValidationError};
use crate::timeline::model::{Asset, Clip, ProjectSettings, Style, Timeline, Track, Transition};

/// Programmatic construction of a [`Timeline`].
///
/// ```
/// use montage::{ClipBuilder, MediaKind, TimelineBuilder, TrackBuilder};
///
/// let timeline = TimelineBuilder::new("demo", 5.0)
///     .asset("v1", MediaKind::Video, "clips/intro.mp4")?
///     .track(
///         TrackBuilder::new("t0", MediaKind::Video)
///             .clip(ClipBuilder::new("c0", "v1", 0.0, 5.0)),
///     )
///     .build()?;
/// assert_eq!(timeline.clip_count(), 1);
/// # Ok::<(), montage::MontageError>(())
/// ```
pub struct TimelineBuilder {
    settings: ProjectSettings,
    assets: BTreeMap<String, Asset>,
    tracks: Vec<Track>,
}

impl TimelineBuilder {
    pub fn new(title: impl Into<String>, duration: f64) -> Self {
        Self {
            settings: ProjectSettings::new(title, duration),
            assets: BTreeMap::new(),
            tracks: Vec::new(),
        }
    }

    pub fn resolution(mut self, resolution: Resolution) -> Self {
        self.settings.resolution = resolution;
        self
    }

    pub fn frame_rate(mut self, frame_rate: FrameRate) -> Self {
        self.settings.frame_rate = frame_rate;
        self
    }

    pub fn style(mut self, style: Style) -> Self {
        self.settings.style = style;
        self
    }

    /// Declare an asset. Ids must be unique.
    pub fn asset(
        self,
        id: impl Into<String>,
        kind: MediaKind,
        location: impl Into<String>,
    ) -> MontageResult<Self> {
        self.asset_def(id, Asset::new(kind, location))
    }

    pub fn asset_def(mut self, id: impl Into<String>, asset: Asset) -> MontageResult<Self> {
        let id = id.into();
        if self.assets.contains_key(&id) {
            return Err(ValidationError::malformed(format!("duplicate asset id '{id}'")).into());
        }
        self.assets.insert(id, asset);
        Ok(self)
    }

    pub fn track(mut self, track: TrackBuilder) -> Self {
        self.tracks.push(track.build());
        self
    }

    /// Assemble and validate.
    pub fn build(self) -> MontageResult<Timeline> {
        let timeline = self.build_unchecked();
        timeline.validate()?;
        Ok(timeline)
    }

    /// Assemble without validating (useful to exercise validation itself).
    pub fn build_unchecked(self) -> Timeline {
        Timeline {
            tracks: self.tracks,
            project_settings: self.settings,
            assets: self.assets,
        }
    }
}

pub struct TrackBuilder {
    id: String,
    kind: MediaKind,
    name: String,
    muted: bool,
    volume: f64,
    clips: Vec<ClipBuilder>,
}

impl TrackBuilder {
    pub fn new(id: impl Into<String>, kind: MediaKind) -> Self {
        let id = id.into();
        Self {
            name: id.clone(),
            id,
            kind,
            muted: false,
            volume: 1.0,
            clips: Vec::new(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn muted(mut self, muted: bool) -> Self {
        self.muted = muted;
        self
    }

    pub fn volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    /// Append a clip; its `trackId` is filled in from this track.
    pub fn clip(mut self, clip: ClipBuilder) -> Self {
        self.clips.push(clip);
        self
    }

    pub fn build(self) -> Track {
        let track_id = self.id.clone();
        Track {
            id: self.id,
            kind: self.kind,
            name: self.name,
            clips: self
                .clips
                .into_iter()
                .map(|c| c.build(&track_id))
                .collect(),
            muted: self.muted,
            volume: self.volume,
        }
    }
}

pub struct ClipBuilder {
    id: String,
    asset_id: String,
    track_id: Option<String>,
    start_time: f64,
    duration: f64,
    volume: f64,
    fade_in: f64,
    fade_out: f64,
    transition: Transition,
}

impl ClipBuilder {
    pub fn new(
        id: impl Into<String>,
        asset_id: impl Into<String>,
        start_time: f64,
        duration: f64,
    ) -> Self {
        Self {
            id: id.into(),
            asset_id: asset_id.into(),
            track_id: None,
            start_time,
            duration,
            volume: 1.0,
            fade_in: 0.0,
            fade_out: 0.0,
            transition: Transition::Cut,
        }
    }

    pub fn volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }

    pub fn fades(mut self, fade_in: f64, fade_out: f64) -> Self {
        self.fade_in = fade_in;
        self.fade_out = fade_out;
        self
    }

    pub fn transition(mut self, transition: Transition) -> Self {
        self.transition = transition;
        self
    }

    /// Override the `trackId` the clip claims (defaults to the enclosing track).
    pub fn track_id(mut self, track_id: impl Into<String>) -> Self {
        self.track_id = Some(track_id.into());
        self
    }

    fn build(self, enclosing_track: &str) -> Clip {
        Clip {
            id: self.id,
            asset_id: self.asset_id,
            track_id: self.track_id.unwrap_or_else(|| enclosing_track.to_string()),
            start_time: self.start_time,
            duration: self.duration,
            volume: self.volume,
            fade_in: self.fade_in,
            fade_out: self.fade_out,
            transition: self.transition,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/dsl.rs"]
mod tests;
