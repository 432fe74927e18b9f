use super::*;

use crate::foundation::core::MediaKind;

#[test]
fn normalize_strips_root_and_dots() {
    assert_eq!(
        normalize_location("/uploads/./a.mp4").unwrap(),
        "uploads/a.mp4"
    );
    assert_eq!(normalize_location("clips\\b.mp3").unwrap(), "clips/b.mp3");
}

#[test]
fn normalize_rejects_escapes_and_urls() {
    assert!(normalize_location("../secret.mp4").is_err());
    assert!(normalize_location("a/../../b.mp4").is_err());
    assert!(normalize_location("https://cdn.example.com/a.mp4").is_err());
    assert!(normalize_location("/").is_err());
    assert!(normalize_location("").is_err());
}

#[tokio::test]
async fn local_resolver_finds_files_under_root() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("uploads")).unwrap();
    std::fs::write(dir.path().join("uploads/a.mp4"), b"x").unwrap();

    let r = LocalAssetResolver::new(dir.path());
    let asset = Asset::new(MediaKind::Video, "/uploads/a.mp4");
    let got = r.resolve("a", &asset).await.unwrap();
    assert_eq!(got, ResolvedAsset::Path(dir.path().join("uploads/a.mp4")));
}

#[tokio::test]
async fn local_resolver_reports_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let r = LocalAssetResolver::new(dir.path());

    let missing = Asset::new(MediaKind::Audio, "nope.mp3");
    assert!(matches!(
        r.resolve("m", &missing).await,
        Err(ResolveError::NotFound { .. })
    ));

    // Directories are not readable media.
    std::fs::create_dir_all(dir.path().join("folder")).unwrap();
    let folder = Asset::new(MediaKind::Audio, "folder");
    assert!(matches!(
        r.resolve("f", &folder).await,
        Err(ResolveError::NotFound { .. })
    ));

    let escape = Asset::new(MediaKind::Audio, "../x.mp3");
    assert!(matches!(
        r.resolve("e", &escape).await,
        Err(ResolveError::InvalidLocation { .. })
    ));
}

#[tokio::test]
async fn static_resolver_serves_known_ids() {
    let r = StaticResolver::new()
        .with_path("v", "/media/v.mp4")
        .with_bytes("b", vec![1u8, 2, 3]);
    let asset = Asset::new(MediaKind::Video, "v.mp4");

    assert_eq!(
        r.resolve("v", &asset).await.unwrap(),
        ResolvedAsset::Path(PathBuf::from("/media/v.mp4"))
    );
    assert_eq!(
        r.resolve("b", &asset).await.unwrap(),
        ResolvedAsset::Bytes(vec![1, 2, 3])
    );
    let err = r.resolve("zzz", &asset).await.unwrap_err();
    assert_eq!(err.to_string(), "asset 'zzz' not found at 'v.mp4'");
}
