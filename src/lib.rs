//! Montage compiles a declarative multi-track editing timeline into one render plan and runs it
//! through the system `ffmpeg` binary.
//!
//! The flow is:
//!
//! - Load and validate a [`Timeline`] (JSON payload or [`TimelineBuilder`])
//! - Resolve its assets with an [`AssetResolver`]
//! - [`compile`] it into a [`RenderPlan`] (pure, deterministic)
//! - Execute the plan with a [`RenderEngine`] such as [`FfmpegEngine`]
//!
//! [`Orchestrator`] drives all of the above for one invocation and reports a
//! [`RenderManifest`].
#![forbid(unsafe_code)]

mod assets;
mod compile;
mod encode;
mod foundation;
mod session;
mod timeline;

pub use crate::foundation::core::{Canvas, FrameRate, MediaKind, Resolution};
pub use crate::foundation::error::{MontageError, MontageResult, RefTarget, ValidationError};

pub use crate::timeline::dsl::{ClipBuilder, TimelineBuilder, TrackBuilder};
pub use crate::timeline::model::{
    Asset, Clip, ProjectSettings, Style, Timeline, Track, Transition,
};

pub use crate::compile::compiler::{ResolvedAssets, compile};
pub use crate::compile::filter::{FadeDir, Filter, OverlayX, TimeWindow};
pub use crate::compile::plan::{
    CompileStats, EncodeParams, FilterGraph, FilterNode, InputBinding, InputSource, Label,
    OutputMapping, Pad, RenderPlan, StreamKind,
};

pub use crate::assets::resolver::{
    AssetResolver, LocalAssetResolver, ResolveError, ResolvedAsset, StaticResolver,
};
pub use crate::assets::stage::ScratchDir;

pub use crate::encode::engine::{EngineReport, RenderEngine, RenderJob};
pub use crate::encode::ffmpeg::{
    FfmpegEngine, FfmpegEngineOpts, ensure_parent_dir, is_ffmpeg_on_path,
};
pub use crate::encode::progress::{ProgressParser, RenderProgress};

pub use crate::session::manifest::RenderManifest;
pub use crate::session::orchestrator::{
    AssetFailure, Orchestrator, OrchestratorOpts, RenderResult,
};
