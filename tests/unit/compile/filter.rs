use super::*;

const HD: Canvas = Canvas {
    width: 1920,
    height: 1080,
};

#[test]
fn color_source_syntax() {
    let f = Filter::Color {
        color: "black".to_string(),
        canvas: HD,
        duration: 5.0,
        rate: 30,
    };
    assert_eq!(f.to_string(), "color=c=black:s=1920x1080:d=5:r=30");
}

#[test]
fn cover_scaling_never_pads() {
    assert_eq!(
        Filter::ScaleCover { canvas: HD }.to_string(),
        "scale=1920:1080:force_original_aspect_ratio=increase"
    );
    assert_eq!(Filter::CenterCrop { canvas: HD }.to_string(), "crop=1920:1080");
}

#[test]
fn overlay_is_gated_half_open() {
    let f = Filter::Overlay {
        x: OverlayX::Fixed,
        window: TimeWindow::new(2.0, 3.5),
    };
    assert_eq!(f.to_string(), "overlay=x=0:y=0:enable='gte(t,2)*lt(t,5.5)'");
}

#[test]
fn wipe_overlay_slides_from_left() {
    let f = Filter::Overlay {
        x: OverlayX::SlideIn {
            start: 1.0,
            duration: 0.5,
        },
        window: TimeWindow::new(1.0, 4.0),
    };
    assert_eq!(
        f.to_string(),
        "overlay=x='min(0,(t-1)/0.5*W-W)':y=0:enable='gte(t,1)*lt(t,5)'"
    );
}

#[test]
fn audio_chain_syntax() {
    assert_eq!(Filter::ATrim { end: 5.0 }.to_string(), "atrim=start=0:end=5");
    assert_eq!(Filter::ASetPtsZero.to_string(), "asetpts=PTS-STARTPTS");
    assert_eq!(Filter::ADelay { millis: 1500 }.to_string(), "adelay=delays=1500:all=1");
    assert_eq!(Filter::Volume { gain: 0.8 }.to_string(), "volume=0.8");
    assert_eq!(
        Filter::AFade {
            dir: FadeDir::Out,
            start: 4.0,
            duration: 1.0
        }
        .to_string(),
        "afade=t=out:st=4:d=1"
    );
    assert_eq!(
        Filter::AMix { inputs: 2 }.to_string(),
        "amix=inputs=2:duration=longest:dropout_transition=0:normalize=0"
    );
}

#[test]
fn video_fade_uses_alpha() {
    let f = Filter::Fade {
        dir: FadeDir::In,
        start: 0.0,
        duration: 0.5,
    };
    assert_eq!(f.to_string(), "fade=t=in:st=0:d=0.5:alpha=1");
}

#[test]
fn time_window_len() {
    let w = TimeWindow::new(1.5, 2.0);
    assert_eq!(w.len(), 2.0);
    assert!(!w.is_empty());
}
