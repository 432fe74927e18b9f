use super::*;

use tokio_util::sync::CancellationToken;

use crate::compile::compiler::{ResolvedAssets, compile};
use crate::timeline::dsl::TimelineBuilder;

fn blank_plan(duration: f64) -> RenderPlan {
    let tl = TimelineBuilder::new("blank", duration).build().unwrap();
    compile(&tl, &ResolvedAssets::new())
}

#[test]
fn global_options_precede_plan_args() {
    let plan = blank_plan(1.0);
    let engine = FfmpegEngine::new(FfmpegEngineOpts::default().with_loglevel("warning"));
    let args: Vec<String> = engine
        .args(&plan, Path::new("out.mp4"))
        .into_iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        &args[..8],
        [
            "-hide_banner",
            "-nostdin",
            "-y",
            "-loglevel",
            "warning",
            "-progress",
            "pipe:1",
            "-nostats"
        ]
    );
    assert_eq!(&args[8..10], ["-f", "lavfi"]);
    assert_eq!(args.last().map(String::as_str), Some("out.mp4"));

    let no_clobber = FfmpegEngine::new(FfmpegEngineOpts::default().with_overwrite(false));
    let args = no_clobber.args(&plan, Path::new("out.mp4"));
    assert_eq!(args[2], OsString::from("-n"));
}

#[tokio::test]
async fn drain_tail_keeps_the_last_lines() {
    let input = b"first line\nsecond line\nthird\n".as_slice();
    assert_eq!(drain_tail(input, 1024).await, "first line\nsecond line\nthird\n");

    let input = b"first line\nsecond line\nthird\n".as_slice();
    assert_eq!(drain_tail(input, 20).await, "second line\nthird\n");
}

#[tokio::test]
async fn drain_tail_survives_invalid_utf8() {
    let input = b"first\n\xff\xfe bad byte\r\nError opening output file\n".as_slice();
    let tail = drain_tail(input, 1024).await;
    assert_eq!(
        tail,
        "first\n\u{FFFD}\u{FFFD} bad byte\nError opening output file\n"
    );
}

#[tokio::test]
async fn progress_continues_past_invalid_utf8() {
    let input = b"frame=3\ntitle=\xffclip\nout_time_us=500000\nprogress=end\n".as_slice();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    pump_progress(input, 1.0, Some(tx)).await;

    let sample = rx.recv().await.unwrap();
    assert_eq!(sample.frame, 3);
    assert_eq!(sample.out_secs, 0.5);
    assert!(sample.done);
    assert!(rx.recv().await.is_none());
}

#[test]
fn availability_uses_the_configured_program() {
    let dir = tempfile::tempdir().unwrap();
    let engine = FfmpegEngine::new(
        FfmpegEngineOpts::default().with_program(dir.path().join("no-such-ffmpeg")),
    );
    assert!(!engine.is_available());
    assert_eq!(FfmpegEngine::default().is_available(), is_ffmpeg_on_path());
}

#[tokio::test]
async fn missing_program_is_an_engine_error() {
    let dir = tempfile::tempdir().unwrap();
    let plan = blank_plan(1.0);
    let engine = FfmpegEngine::new(
        FfmpegEngineOpts::default().with_program(dir.path().join("no-such-ffmpeg")),
    );
    let cancel = CancellationToken::new();
    let out = dir.path().join("out/blank.mp4");
    let err = engine
        .render(RenderJob {
            plan: &plan,
            output: &out,
            cancel: &cancel,
            progress: None,
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), "render_engine");
    assert!(err.to_string().contains("failed to spawn"));
    // The parent directory is prepared before spawning.
    assert!(dir.path().join("out").is_dir());
}

#[cfg(unix)]
#[tokio::test]
async fn non_zero_exit_is_an_engine_error() {
    let dir = tempfile::tempdir().unwrap();
    let plan = blank_plan(1.0);
    let engine = FfmpegEngine::new(FfmpegEngineOpts::default().with_program("false"));
    let cancel = CancellationToken::new();
    let out = dir.path().join("blank.mp4");
    let err = engine
        .render(RenderJob {
            plan: &plan,
            output: &out,
            cancel: &cancel,
            progress: None,
        })
        .await
        .unwrap_err();
    match err {
        MontageError::RenderEngine { message, .. } => {
            assert!(message.starts_with("ffmpeg exited with status"), "{message}");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn renders_degenerate_plan_with_real_ffmpeg() {
    if !is_ffmpeg_on_path() {
        return;
    }
    let dir = tempfile::tempdir().unwrap();
    let plan = blank_plan(0.5);
    let engine = FfmpegEngine::default();
    let cancel = CancellationToken::new();
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let out = dir.path().join("blank.mp4");

    engine
        .render(RenderJob {
            plan: &plan,
            output: &out,
            cancel: &cancel,
            progress: Some(&tx),
        })
        .await
        .unwrap();
    drop(tx);

    assert!(std::fs::metadata(&out).unwrap().len() > 0);
    let mut last = None;
    while let Some(p) = rx.recv().await {
        last = Some(p);
    }
    assert!(last.is_some_and(|p| p.done));
}
