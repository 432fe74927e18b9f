use std::collections::HashMap;

use crate::foundation::core::MediaKind;
use crate::foundation::error::ValidationError;
use crate::timeline::model::{Clip, Timeline, Track};

impl Timeline {
    /// Check references and ranges before any I/O happens.
    ///
    /// Temporal overlap and clips running past `projectSettings.duration` are accepted; the
    /// global duration bound truncates them at render time.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let duration = self.project_settings.duration;
        if !duration.is_finite() || duration <= 0.0 {
            return Err(ValidationError::invalid_range(
                "projectSettings",
                "duration",
                "> 0",
                duration,
            ));
        }

        let track_kinds: HashMap<&str, MediaKind> = self
            .tracks
            .iter()
            .map(|t| (t.id.as_str(), t.kind))
            .collect();

        for track in &self.tracks {
            validate_track_gain(track)?;
            for clip in &track.clips {
                let asset = self
                    .assets
                    .get(&clip.asset_id)
                    .ok_or_else(|| ValidationError::missing_asset(&clip.id, &clip.asset_id))?;
                if !track_kinds.contains_key(clip.track_id.as_str()) {
                    return Err(ValidationError::missing_track(&clip.id, &clip.track_id));
                }
                validate_clip_ranges(clip)?;

                if !accepts(track.kind, asset.kind) {
                    return Err(ValidationError::KindMismatch {
                        clip: clip.id.clone(),
                        asset: clip.asset_id.clone(),
                        asset_kind: asset.kind,
                        track: track.id.clone(),
                        track_kind: track.kind,
                    });
                }
            }
        }

        Ok(())
    }
}

/// Whether a track of `track` kind can consume an asset of `asset` kind.
///
/// Visual tracks take any pixel source; audio tracks take anything that can carry sound.
pub(crate) fn accepts(track: MediaKind, asset: MediaKind) -> bool {
    match track {
        MediaKind::Video | MediaKind::Image => asset.is_visual(),
        MediaKind::Audio => matches!(asset, MediaKind::Audio | MediaKind::Video),
    }
}

fn validate_track_gain(track: &Track) -> Result<(), ValidationError> {
    if !track.volume.is_finite() || track.volume < 0.0 {
        return Err(ValidationError::invalid_range(
            format!("track '{}'", track.id),
            "volume",
            ">= 0",
            track.volume,
        ));
    }
    Ok(())
}

fn validate_clip_ranges(clip: &Clip) -> Result<(), ValidationError> {
    let subject = || format!("clip '{}'", clip.id);

    if !clip.start_time.is_finite() || clip.start_time < 0.0 {
        return Err(ValidationError::invalid_range(
            subject(),
            "startTime",
            ">= 0",
            clip.start_time,
        ));
    }
    if !clip.duration.is_finite() || clip.duration <= 0.0 {
        return Err(ValidationError::invalid_range(
            subject(),
            "duration",
            "> 0",
            clip.duration,
        ));
    }
    for (field, value) in [
        ("volume", clip.volume),
        ("fadeIn", clip.fade_in),
        ("fadeOut", clip.fade_out),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::invalid_range(subject(), field, ">= 0", value));
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/validate.rs"]
mod tests;
