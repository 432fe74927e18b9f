use super::*;

#[test]
fn display_prefixes_are_stable() {
    let v: MontageError = ValidationError::malformed("x").into();
    assert!(v.to_string().contains("validation error:"));
    assert!(
        MontageError::render_engine("x")
            .to_string()
            .contains("render engine error:")
    );
    assert!(
        MontageError::cancelled("x")
            .to_string()
            .contains("cancelled:")
    );
}

#[test]
fn kinds_are_stable() {
    let v: MontageError = ValidationError::missing_asset("c0", "a0").into();
    assert_eq!(v.kind(), "validation");
    assert_eq!(MontageError::render_engine("x").kind(), "render_engine");
    assert_eq!(MontageError::cancelled("x").kind(), "cancelled");
    assert_eq!(
        MontageError::Other(anyhow::anyhow!("disk full")).kind(),
        "internal"
    );
}

#[test]
fn missing_reference_names_the_target() {
    let e = ValidationError::missing_track("c1", "t9");
    assert_eq!(e.to_string(), "clip 'c1' references missing track 't9'");
}

#[test]
fn render_engine_with_keeps_diagnostics() {
    let e = MontageError::render_engine_with("exit 1", "Invalid argument");
    let MontageError::RenderEngine { diagnostics, .. } = e else {
        panic!("expected RenderEngine");
    };
    assert_eq!(diagnostics, "Invalid argument");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = MontageError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
