use super::*;

#[test]
fn resolution_canvas_sizes() {
    assert_eq!(
        Resolution::Hd720.canvas(),
        Canvas {
            width: 1280,
            height: 720
        }
    );
    assert_eq!(Resolution::Hd1080.canvas().width, 1920);
    assert_eq!(Resolution::Uhd4k.canvas().height, 2160);
}

#[test]
fn resolution_json_tags() {
    let r: Resolution = serde_json::from_str("\"4K\"").unwrap();
    assert_eq!(r, Resolution::Uhd4k);
    assert_eq!(
        serde_json::to_string(&Resolution::Hd720).unwrap(),
        "\"720p\""
    );
}

#[test]
fn frame_rate_is_a_bare_number() {
    let r: FrameRate = serde_json::from_str("60").unwrap();
    assert_eq!(r, FrameRate::Fps60);
    assert_eq!(serde_json::to_string(&FrameRate::Fps30).unwrap(), "30");
    assert!(serde_json::from_str::<FrameRate>("24").is_err());
}

#[test]
fn fmt_secs_is_compact() {
    assert_eq!(fmt_secs(5.0), "5");
    assert_eq!(fmt_secs(2.5), "2.5");
    assert_eq!(fmt_secs(-0.0), "0");
}

#[test]
fn secs_to_millis_rounds() {
    assert_eq!(secs_to_millis(1.2345), 1235);
    assert_eq!(secs_to_millis(0.0), 0);
}

#[test]
fn visual_kinds() {
    assert!(MediaKind::Video.is_visual());
    assert!(MediaKind::Image.is_visual());
    assert!(!MediaKind::Audio.is_visual());
}

#[test]
fn file_stems_are_portable() {
    assert_eq!(sanitize_file_stem("My Trip: Day 1!"), "My_Trip__Day_1_");
    assert_eq!(sanitize_file_stem("a-b_c"), "a-b_c");
    assert_eq!(sanitize_file_stem("  "), "untitled");
    assert_eq!(sanitize_file_stem("../etc"), "___etc");
}
