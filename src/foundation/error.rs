/// Convenience result type used across montage.
pub type MontageResult<T> = Result<T, MontageError>;

/// Top-level error taxonomy returned by the orchestrator and compiler entry points.
#[derive(thiserror::Error, Debug)]
pub enum MontageError {
    /// The timeline was rejected before any I/O took place.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The render engine failed, timed out, or did not produce a usable artifact.
    #[error("render engine error: {message}")]
    RenderEngine {
        /// Short human-readable summary.
        message: String,
        /// Captured engine diagnostics (stderr tail), possibly empty.
        diagnostics: String,
    },

    /// The caller cancelled the invocation.
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl MontageError {
    /// Build a [`MontageError::RenderEngine`] without diagnostics.
    pub fn render_engine(msg: impl Into<String>) -> Self {
        Self::RenderEngine {
            message: msg.into(),
            diagnostics: String::new(),
        }
    }

    /// Build a [`MontageError::RenderEngine`] carrying captured engine output.
    pub fn render_engine_with(msg: impl Into<String>, diagnostics: impl Into<String>) -> Self {
        Self::RenderEngine {
            message: msg.into(),
            diagnostics: diagnostics.into(),
        }
    }

    /// Build a [`MontageError::Cancelled`] value.
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Stable machine-readable kind, used as `errorKind` in failure manifests.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::RenderEngine { .. } => "render_engine",
            Self::Cancelled(_) => "cancelled",
            Self::Other(_) => "internal",
        }
    }
}

/// Reasons a timeline is rejected by [`crate::Timeline::validate`].
///
/// All variants are recoverable: fix the timeline and resubmit.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// A clip points at an asset or track id that is not declared.
    #[error("clip '{clip}' references missing {target} '{id}'")]
    MissingReference {
        clip: String,
        target: RefTarget,
        id: String,
    },

    /// A numeric field is out of its allowed range (or not finite).
    #[error("{subject}: {field} must be {expected} (got {value})")]
    InvalidRange {
        subject: String,
        field: &'static str,
        expected: &'static str,
        value: f64,
    },

    /// A clip's asset kind cannot feed the track it sits on.
    #[error("clip '{clip}' places {asset_kind} asset '{asset}' on {track_kind} track '{track}'")]
    KindMismatch {
        clip: String,
        asset: String,
        asset_kind: crate::MediaKind,
        track: String,
        track_kind: crate::MediaKind,
    },

    /// The request payload could not be parsed.
    #[error("malformed timeline: {0}")]
    Malformed(String),
}

/// What a dangling clip reference was pointing at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RefTarget {
    Asset,
    Track,
}

impl std::fmt::Display for RefTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Asset => f.write_str("asset"),
            Self::Track => f.write_str("track"),
        }
    }
}

impl ValidationError {
    pub(crate) fn missing_asset(clip: &str, id: &str) -> Self {
        Self::MissingReference {
            clip: clip.to_string(),
            target: RefTarget::Asset,
            id: id.to_string(),
        }
    }

    pub(crate) fn missing_track(clip: &str, id: &str) -> Self {
        Self::MissingReference {
            clip: clip.to_string(),
            target: RefTarget::Track,
            id: id.to_string(),
        }
    }

    pub(crate) fn invalid_range(
        subject: impl Into<String>,
        field: &'static str,
        expected: &'static str,
        value: f64,
    ) -> Self {
        Self::InvalidRange {
            subject: subject.into(),
            field,
            expected,
            value,
        }
    }

    /// Build a [`ValidationError::Malformed`] value.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::Malformed(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
