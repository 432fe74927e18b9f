use super::*;

use crate::compile::filter::{OverlayX, TimeWindow};

const HD: Canvas = Canvas {
    width: 1920,
    height: 1080,
};

fn strings(args: &[OsString]) -> Vec<String> {
    args.iter().map(|a| a.to_string_lossy().into_owned()).collect()
}

fn two_input_plan(with_audio: bool) -> RenderPlan {
    let mut nodes = vec![
        FilterNode {
            inputs: Vec::new(),
            chain: vec![Filter::Color {
                color: "black".to_string(),
                canvas: HD,
                duration: 4.0,
                rate: 30,
            }],
            outputs: vec![Label::new("base")],
        },
        FilterNode {
            inputs: vec![Pad::Input {
                slot: 1,
                stream: StreamKind::Video,
            }],
            chain: vec![
                Filter::ScaleCover { canvas: HD },
                Filter::CenterCrop { canvas: HD },
                Filter::SetSar,
            ],
            outputs: vec![Label::new("v0")],
        },
        FilterNode {
            inputs: vec![Pad::Link(Label::new("base")), Pad::Link(Label::new("v0"))],
            chain: vec![Filter::Overlay {
                x: OverlayX::Fixed,
                window: TimeWindow::new(0.0, 4.0),
            }],
            outputs: vec![Label::new("ov0")],
        },
        FilterNode {
            inputs: vec![Pad::Link(Label::new("ov0"))],
            chain: vec![Filter::Format {
                pix_fmt: "yuv420p".to_string(),
            }],
            outputs: vec![Label::new("vout")],
        },
    ];
    if with_audio {
        nodes.push(FilterNode {
            inputs: vec![Pad::Input {
                slot: 0,
                stream: StreamKind::Audio,
            }],
            chain: vec![Filter::AMix { inputs: 1 }],
            outputs: vec![Label::new("aout")],
        });
    }

    RenderPlan {
        inputs: vec![
            InputBinding {
                slot: 0,
                asset_id: Some("song".to_string()),
                source: InputSource::File {
                    path: PathBuf::from("/media/song.mp3"),
                },
            },
            InputBinding {
                slot: 1,
                asset_id: Some("pic".to_string()),
                source: InputSource::for_asset(
                    MediaKind::Image,
                    PathBuf::from("/media/pic.png"),
                    4.0,
                    30,
                ),
            },
        ],
        graph: FilterGraph { nodes },
        outputs: OutputMapping {
            video: Label::new("vout"),
            audio: with_audio.then(|| Label::new("aout")),
        },
        encode: EncodeParams::h264_aac(4.0, HD, FrameRate::Fps30),
        stats: CompileStats::default(),
    }
}

#[test]
fn filter_complex_joins_chains_and_labels() {
    let plan = two_input_plan(false);
    assert_eq!(
        plan.filter_complex(),
        "color=c=black:s=1920x1080:d=4:r=30[base];\
         [1:v]scale=1920:1080:force_original_aspect_ratio=increase,crop=1920:1080,setsar=1[v0];\
         [base][v0]overlay=x=0:y=0:enable='gte(t,0)*lt(t,4)'[ov0];\
         [ov0]format=yuv420p[vout]"
    );
}

#[test]
fn stills_are_looped_inputs() {
    let args = strings(&two_input_plan(false).ffmpeg_args(Path::new("out.mp4")));
    assert_eq!(
        &args[..8],
        [
            "-i",
            "/media/song.mp3",
            "-loop",
            "1",
            "-framerate",
            "30",
            "-t",
            "4"
        ]
    );
    assert_eq!(&args[8..10], ["-i", "/media/pic.png"]);
}

#[test]
fn silent_plan_disables_audio() {
    let args = strings(&two_input_plan(false).ffmpeg_args(Path::new("out.mp4")));
    let map = args.iter().position(|a| a == "-map").unwrap();
    assert_eq!(args[map + 1], "[vout]");
    assert_eq!(args[map + 2], "-an");
    assert!(!args.iter().any(|a| a == "-c:a"));
    assert_eq!(args.last().map(String::as_str), Some("out.mp4"));
}

#[test]
fn audio_plan_maps_mix_and_encodes_aac() {
    let args = strings(&two_input_plan(true).ffmpeg_args(Path::new("out.mp4")));
    let maps: Vec<&str> = args
        .iter()
        .enumerate()
        .filter(|(_, a)| *a == "-map")
        .map(|(i, _)| args[i + 1].as_str())
        .collect();
    assert_eq!(maps, ["[vout]", "[aout]"]);
    assert!(!args.iter().any(|a| a == "-an"));

    let ca = args.iter().position(|a| a == "-c:a").unwrap();
    assert_eq!(&args[ca..ca + 4], ["-c:a", "aac", "-b:a", "128k"]);
}

#[test]
fn encode_tail_bounds_duration() {
    let args = strings(&two_input_plan(false).ffmpeg_args(Path::new("out.mp4")));
    let cv = args.iter().position(|a| a == "-c:v").unwrap();
    assert_eq!(
        &args[cv..cv + 10],
        [
            "-c:v", "libx264", "-preset", "medium", "-crf", "23", "-pix_fmt", "yuv420p", "-r",
            "30"
        ]
    );
    let t = args.iter().rposition(|a| a == "-t").unwrap();
    assert_eq!(args[t + 1], "4");
    assert!(!args.iter().any(|a| a == "-y"));
}

#[test]
fn solid_color_input_uses_lavfi() {
    let plan = RenderPlan {
        inputs: vec![InputBinding {
            slot: 0,
            asset_id: None,
            source: InputSource::SolidColor {
                color: "black".to_string(),
                canvas: HD,
                duration: 2.5,
                rate: 60,
            },
        }],
        graph: FilterGraph::default(),
        outputs: OutputMapping {
            video: Label::new("vout"),
            audio: None,
        },
        encode: EncodeParams::h264_aac(2.5, HD, FrameRate::Fps60),
        stats: CompileStats::default(),
    };
    assert!(plan.is_degenerate());
    let args = strings(&plan.ffmpeg_args(Path::new("x.mp4")));
    assert_eq!(
        &args[..4],
        ["-f", "lavfi", "-i", "color=c=black:s=1920x1080:d=2.5:r=60"]
    );
}

#[test]
fn fingerprint_ignores_output_path_but_not_content() {
    let a = two_input_plan(false);
    let b = two_input_plan(false);
    assert_eq!(a.fingerprint(), b.fingerprint());

    let with_audio = two_input_plan(true);
    assert_ne!(a.fingerprint(), with_audio.fingerprint());

    let mut args_a = strings(&a.ffmpeg_args(Path::new("a.mp4")));
    let mut args_b = strings(&b.ffmpeg_args(Path::new("b.mp4")));
    assert_eq!(args_a.pop().as_deref(), Some("a.mp4"));
    assert_eq!(args_b.pop().as_deref(), Some("b.mp4"));
    assert_eq!(args_a, args_b);
}

#[test]
fn binding_and_producer_lookup() {
    let plan = two_input_plan(false);
    assert_eq!(plan.binding("pic").map(|b| b.slot), Some(1));
    assert!(plan.binding("missing").is_none());
    assert!(!plan.is_degenerate());

    let node = plan.graph.producer("ov0").unwrap();
    assert_eq!(node.inputs.len(), 2);
    assert!(plan.graph.producer("nope").is_none());
}
