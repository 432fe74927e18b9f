use std::collections::{BTreeMap, HashMap, VecDeque};
use std::path::{Path, PathBuf};

use crate::compile::filter::{FadeDir, Filter, OverlayX, TimeWindow};
use crate::compile::plan::{
    CompileStats, EncodeParams, FilterGraph, FilterNode, InputBinding, InputSource, Label,
    OutputMapping, Pad, RenderPlan, StreamKind,
};
use crate::foundation::core::{Canvas, MediaKind, secs_to_millis};
use crate::timeline::model::{Clip, Timeline, Track, Transition};

const BASE_COLOR: &str = "black";
const OUTPUT_PIX_FMT: &str = "yuv420p";
const ALPHA_PIX_FMT: &str = "yuva420p";
/// Upper bound for transition ramps; short clips use half their length instead.
const TRANSITION_SECS: f64 = 0.5;

/// Concrete readable locations for the assets that resolved, keyed by asset id.
///
/// Assets missing from this set are treated as absent by [`compile`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolvedAssets {
    locations: BTreeMap<String, PathBuf>,
}

impl ResolvedAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, asset_id: impl Into<String>, location: impl Into<PathBuf>) {
        self.locations.insert(asset_id.into(), location.into());
    }

    pub fn get(&self, asset_id: &str) -> Option<&Path> {
        self.locations.get(asset_id).map(PathBuf::as_path)
    }

    pub fn contains(&self, asset_id: &str) -> bool {
        self.locations.contains_key(asset_id)
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl<K: Into<String>, V: Into<PathBuf>> FromIterator<(K, V)> for ResolvedAssets {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            locations: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

struct Placement<'a> {
    track: &'a Track,
    clip: &'a Clip,
    slot: u32,
}

/// Compile a validated timeline into a render plan.
///
/// Pure and deterministic: the same timeline and resolved set always produce the same plan,
/// down to label names. Clips whose asset is not in `resolved` are left out, so their time
/// window shows whatever layer is beneath.
pub fn compile(timeline: &Timeline, resolved: &ResolvedAssets) -> RenderPlan {
    let settings = &timeline.project_settings;
    let canvas = settings.canvas();
    let rate = settings.frame_rate.as_u32();
    let duration = settings.duration;
    let encode = EncodeParams::h264_aac(duration, canvas, settings.frame_rate);

    // Stage 1: one slot per distinct referenced asset that resolved, in first-reference order.
    let mut slots = HashMap::<&str, u32>::new();
    let mut inputs = Vec::<InputBinding>::new();
    for id in timeline.referenced_asset_ids() {
        let (Some(path), Some(asset)) = (resolved.get(id), timeline.assets.get(id)) else {
            continue;
        };
        let slot = inputs.len() as u32;
        inputs.push(InputBinding {
            slot,
            asset_id: Some(id.to_string()),
            source: InputSource::for_asset(asset.kind, path.to_path_buf(), duration, rate),
        });
        slots.insert(id, slot);
    }

    let mut stats = CompileStats {
        inputs: inputs.len(),
        ..CompileStats::default()
    };

    if inputs.is_empty() {
        stats.unbound_clips = timeline.clip_count();
        return degenerate_plan(timeline, encode, stats);
    }

    let mut visual = Vec::<Placement<'_>>::new();
    let mut audio = Vec::<Placement<'_>>::new();
    for track in &timeline.tracks {
        for clip in &track.clips {
            let Some(&slot) = slots.get(clip.asset_id.as_str()) else {
                stats.unbound_clips += 1;
                continue;
            };
            let placement = Placement { track, clip, slot };
            match track.kind {
                MediaKind::Video | MediaKind::Image => visual.push(placement),
                MediaKind::Audio if track.muted => stats.muted_clips += 1,
                MediaKind::Audio => audio.push(placement),
            }
        }
    }

    let uses = visual
        .iter()
        .map(|p| (p.slot, StreamKind::Video))
        .chain(audio.iter().map(|p| (p.slot, StreamKind::Audio)));
    let (mut nodes, mut fanout) = Fanout::plan(uses);

    // Stage 2: composite visual layers over the base canvas in declaration order.
    nodes.push(FilterNode {
        inputs: Vec::new(),
        chain: vec![Filter::Color {
            color: BASE_COLOR.to_string(),
            canvas,
            duration,
            rate,
        }],
        outputs: vec![Label::new("base")],
    });
    let mut current = Label::new("base");
    for (i, p) in visual.iter().enumerate() {
        let layer = Label::new(format!("v{i}"));
        nodes.push(FilterNode {
            inputs: vec![fanout.take(p.slot, StreamKind::Video)],
            chain: layer_chain(p.clip, canvas),
            outputs: vec![layer.clone()],
        });

        let window = TimeWindow::new(p.clip.start_time, p.clip.duration);
        let x = match p.clip.transition {
            Transition::Wipe => OverlayX::SlideIn {
                start: window.start,
                duration: ramp_secs(p.clip.duration),
            },
            Transition::Cut | Transition::Fade | Transition::Dissolve => OverlayX::Fixed,
        };
        let composited = Label::new(format!("ov{i}"));
        nodes.push(FilterNode {
            inputs: vec![Pad::Link(current), Pad::Link(layer)],
            chain: vec![Filter::Overlay { x, window }],
            outputs: vec![composited.clone()],
        });
        current = composited;
    }
    stats.overlays = visual.len();

    // Stage 3: per-clip audio streams, then one mix.
    let mut streams = Vec::<Label>::with_capacity(audio.len());
    for (i, p) in audio.iter().enumerate() {
        let label = Label::new(format!("a{i}"));
        nodes.push(FilterNode {
            inputs: vec![fanout.take(p.slot, StreamKind::Audio)],
            chain: audio_chain(p.track, p.clip),
            outputs: vec![label.clone()],
        });
        streams.push(label);
    }
    stats.audio_streams = streams.len();

    let audio_out = if streams.is_empty() {
        None
    } else {
        let mixed = Label::new("aout");
        nodes.push(FilterNode {
            chain: vec![Filter::AMix {
                inputs: streams.len(),
            }],
            inputs: streams.into_iter().map(Pad::Link).collect(),
            outputs: vec![mixed.clone()],
        });
        Some(mixed)
    };

    // Stage 4: finalize.
    let video_out = Label::new("vout");
    nodes.push(FilterNode {
        inputs: vec![Pad::Link(current)],
        chain: vec![Filter::Format {
            pix_fmt: OUTPUT_PIX_FMT.to_string(),
        }],
        outputs: vec![video_out.clone()],
    });

    RenderPlan {
        inputs,
        graph: FilterGraph { nodes },
        outputs: OutputMapping {
            video: video_out,
            audio: audio_out,
        },
        encode,
        stats,
    }
}

/// Solid color for the whole duration, no audio.
fn degenerate_plan(timeline: &Timeline, encode: EncodeParams, stats: CompileStats) -> RenderPlan {
    let settings = &timeline.project_settings;
    let video_out = Label::new("vout");
    RenderPlan {
        inputs: vec![InputBinding {
            slot: 0,
            asset_id: None,
            source: InputSource::SolidColor {
                color: BASE_COLOR.to_string(),
                canvas: settings.canvas(),
                duration: settings.duration,
                rate: settings.frame_rate.as_u32(),
            },
        }],
        graph: FilterGraph {
            nodes: vec![FilterNode {
                inputs: vec![Pad::Input {
                    slot: 0,
                    stream: StreamKind::Video,
                }],
                chain: vec![Filter::Format {
                    pix_fmt: OUTPUT_PIX_FMT.to_string(),
                }],
                outputs: vec![video_out.clone()],
            }],
        },
        outputs: OutputMapping {
            video: video_out,
            audio: None,
        },
        encode,
        stats: CompileStats { inputs: 1, ..stats },
    }
}

fn ramp_secs(clip_duration: f64) -> f64 {
    TRANSITION_SECS.min(clip_duration / 2.0)
}

/// Cover-scale, center-crop and (for soft transitions) alpha ramps for one visual clip.
fn layer_chain(clip: &Clip, canvas: Canvas) -> Vec<Filter> {
    let mut chain = vec![
        Filter::ScaleCover { canvas },
        Filter::CenterCrop { canvas },
        Filter::SetSar,
    ];
    match clip.transition {
        Transition::Fade | Transition::Dissolve => {
            let d = ramp_secs(clip.duration);
            let end = clip.start_time + clip.duration;
            chain.push(Filter::Format {
                pix_fmt: ALPHA_PIX_FMT.to_string(),
            });
            chain.push(Filter::Fade {
                dir: FadeDir::In,
                start: clip.start_time,
                duration: d,
            });
            chain.push(Filter::Fade {
                dir: FadeDir::Out,
                start: end - d,
                duration: d,
            });
        }
        Transition::Cut | Transition::Wipe => {}
    }
    chain
}

/// Head-trim, fades, placement delay and gain for one audio clip.
fn audio_chain(track: &Track, clip: &Clip) -> Vec<Filter> {
    let d = clip.duration;
    let mut chain = vec![Filter::ATrim { end: d }, Filter::ASetPtsZero];

    let fade_in = clip.fade_in.min(d);
    if fade_in > 0.0 {
        chain.push(Filter::AFade {
            dir: FadeDir::In,
            start: 0.0,
            duration: fade_in,
        });
    }
    let fade_out = clip.fade_out.min(d);
    if fade_out > 0.0 {
        chain.push(Filter::AFade {
            dir: FadeDir::Out,
            start: d - fade_out,
            duration: fade_out,
        });
    }

    chain.push(Filter::ADelay {
        millis: secs_to_millis(clip.start_time),
    });
    chain.push(Filter::Volume {
        gain: clip.volume * track.volume,
    });
    chain
}

/// Fan-out for input streams consumed by more than one chain.
///
/// Every edge in the graph is consumed exactly once, so a slot stream with `n > 1` consumers is
/// routed through an explicit `split`/`asplit` node and each consumer takes one of its outputs.
struct Fanout {
    pending: BTreeMap<(u32, StreamKind), VecDeque<Label>>,
}

impl Fanout {
    fn plan(uses: impl Iterator<Item = (u32, StreamKind)>) -> (Vec<FilterNode>, Self) {
        let mut counts = BTreeMap::<(u32, StreamKind), usize>::new();
        for key in uses {
            *counts.entry(key).or_default() += 1;
        }

        let mut nodes = Vec::new();
        let mut pending = BTreeMap::new();
        for ((slot, stream), n) in counts {
            if n < 2 {
                continue;
            }
            let tag = match stream {
                StreamKind::Video => 'v',
                StreamKind::Audio => 'a',
            };
            let labels: VecDeque<Label> = (0..n)
                .map(|k| Label::new(format!("s{slot}{tag}{k}")))
                .collect();
            let split = match stream {
                StreamKind::Video => Filter::Split { outputs: n },
                StreamKind::Audio => Filter::ASplit { outputs: n },
            };
            nodes.push(FilterNode {
                inputs: vec![Pad::Input { slot, stream }],
                chain: vec![split],
                outputs: labels.iter().cloned().collect(),
            });
            pending.insert((slot, stream), labels);
        }
        (nodes, Self { pending })
    }

    fn take(&mut self, slot: u32, stream: StreamKind) -> Pad {
        match self
            .pending
            .get_mut(&(slot, stream))
            .and_then(VecDeque::pop_front)
        {
            Some(label) => Pad::Link(label),
            None => Pad::Input { slot, stream },
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/compile/compiler.rs"]
mod tests;
