use super::*;

use std::path::PathBuf;

use crate::foundation::error::ValidationError;

fn result() -> RenderResult {
    RenderResult {
        output_path: PathBuf::from("/srv/out/trip_timeline_1_abcdef01.mp4"),
        byte_size: 2048,
        effective_duration: 5.0,
        track_count: 2,
        clip_count: 3,
        compile_id: Uuid::nil(),
        plan_fingerprint: 0xdead_beef,
        asset_failures: Vec::new(),
    }
}

#[test]
fn success_manifest_shape() {
    let m = RenderManifest::from_outcome(&Ok(result()));
    let v = serde_json::to_value(&m).unwrap();
    assert_eq!(v["success"], true);
    assert_eq!(v["outputLocation"], "/srv/out/trip_timeline_1_abcdef01.mp4");
    assert_eq!(v["filename"], "trip_timeline_1_abcdef01.mp4");
    assert_eq!(v["byteSize"], 2048);
    assert_eq!(v["effectiveDuration"], 5.0);
    assert_eq!(v["trackCount"], 2);
    assert_eq!(v["clipCount"], 3);
    assert_eq!(v["planFingerprint"], "00000000deadbeef");
    assert!(v.get("errorKind").is_none());
    assert!(v.get("assetFailures").is_none());
}

#[test]
fn failure_manifest_carries_kind_and_message() {
    let err = MontageError::from(ValidationError::malformed("expected value at line 1"));
    let m = RenderManifest::failure(&err);
    let v = serde_json::to_value(&m).unwrap();
    assert_eq!(v["success"], false);
    assert_eq!(v["errorKind"], "validation");
    assert_eq!(
        v["message"],
        "validation error: malformed timeline: expected value at line 1"
    );
    assert!(v.get("outputLocation").is_none());
    assert!(v.get("diagnostics").is_none());
}

#[test]
fn engine_failure_keeps_diagnostics() {
    let err = MontageError::render_engine_with("ffmpeg exited with status 1", "bad filter");
    let m = RenderManifest::failure(&err);
    assert_eq!(m.error_kind.as_deref(), Some("render_engine"));
    assert_eq!(m.message.as_deref(), Some("ffmpeg exited with status 1"));
    assert_eq!(m.diagnostics.as_deref(), Some("bad filter"));
}

#[test]
fn manifest_round_trips_through_json() {
    let mut r = result();
    r.asset_failures.push(AssetFailure {
        asset_id: "a1".to_string(),
        message: "missing".to_string(),
    });
    let m = RenderManifest::success(&r);
    let back: RenderManifest = serde_json::from_str(&serde_json::to_string(&m).unwrap()).unwrap();
    assert_eq!(back, m);
}
