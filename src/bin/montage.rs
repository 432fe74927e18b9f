use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "montage", version)]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset (e.g. `info`, `montage=debug`).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a timeline and print its render plan without rendering.
    Compile(CompileArgs),
    /// Render a timeline to MP4 (requires `ffmpeg` on PATH) and print the result manifest.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct CompileArgs {
    /// Input timeline JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory asset locations are resolved against (defaults to the timeline's directory).
    #[arg(long)]
    assets_root: Option<PathBuf>,

    /// What to print.
    #[arg(long, value_enum, default_value_t = PlanFormat::Json)]
    format: PlanFormat,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input timeline JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory asset locations are resolved against (defaults to the timeline's directory).
    #[arg(long)]
    assets_root: Option<PathBuf>,

    /// Directory receiving the rendered file.
    #[arg(long, default_value = "output")]
    out_dir: PathBuf,

    /// Parent directory for per-render scratch space (defaults to the system temp dir).
    #[arg(long)]
    scratch_dir: Option<PathBuf>,

    /// Abort the render after this many seconds.
    #[arg(long, default_value_t = 600)]
    timeout_secs: u64,

    /// ffmpeg executable.
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: PathBuf,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PlanFormat {
    /// The full plan as JSON.
    Json,
    /// The ffmpeg argument vector, one argument per line.
    Args,
    /// Only the `-filter_complex` graph.
    Graph,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let outcome = match cli.cmd {
        Command::Compile(args) => cmd_compile(args).map(|()| true),
        Command::Render(args) => cmd_render(args),
    };
    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn assets_root(explicit: Option<PathBuf>, in_path: &Path) -> PathBuf {
    explicit.unwrap_or_else(|| {
        in_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf()
    })
}

fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("start async runtime")
}

fn cmd_compile(args: CompileArgs) -> anyhow::Result<()> {
    use montage::AssetResolver as _;

    let timeline = montage::Timeline::from_path(&args.in_path)?;
    timeline.validate()?;

    let resolver = montage::LocalAssetResolver::new(assets_root(args.assets_root, &args.in_path));
    let resolved = runtime()?.block_on(async {
        let mut resolved = montage::ResolvedAssets::new();
        for id in timeline.referenced_asset_ids() {
            let Some(asset) = timeline.assets.get(id) else {
                continue;
            };
            match resolver.resolve(id, asset).await {
                Ok(montage::ResolvedAsset::Path(p)) => resolved.insert(id, p),
                Ok(montage::ResolvedAsset::Bytes(_)) => {}
                Err(e) => tracing::warn!(asset = id, error = %e, "asset unavailable"),
            }
        }
        resolved
    });

    let plan = montage::compile(&timeline, &resolved);
    match args.format {
        PlanFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&plan).context("serialize plan")?
            );
        }
        PlanFormat::Args => {
            for arg in plan.ffmpeg_args(Path::new("out.mp4")) {
                println!("{}", arg.to_string_lossy());
            }
        }
        PlanFormat::Graph => println!("{}", plan.filter_complex()),
    }
    eprintln!("plan fingerprint {:016x}", plan.fingerprint());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<bool> {
    let outcome = match montage::Timeline::from_path(&args.in_path) {
        Ok(timeline) => {
            let resolver =
                montage::LocalAssetResolver::new(assets_root(args.assets_root, &args.in_path));
            let engine = montage::FfmpegEngine::new(
                montage::FfmpegEngineOpts::default().with_program(args.ffmpeg),
            );
            if !engine.is_available() {
                tracing::warn!(
                    program = %engine.opts().program.display(),
                    "ffmpeg does not answer -version; the render will likely fail"
                );
            }
            let mut opts = montage::OrchestratorOpts::default()
                .with_output_dir(args.out_dir)
                .with_render_timeout(Duration::from_secs(args.timeout_secs));
            if let Some(dir) = args.scratch_dir {
                opts = opts.with_scratch_root(dir);
            }
            let orchestrator = montage::Orchestrator::new(resolver, engine, opts);

            runtime()?.block_on(async {
                let cancel = CancellationToken::new();
                let on_ctrl_c = cancel.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        tracing::info!("interrupt received; cancelling render");
                        on_ctrl_c.cancel();
                    }
                });
                orchestrator.run_with_cancel(&timeline, &cancel).await
            })
        }
        Err(e) => Err(e),
    };

    let manifest = montage::RenderManifest::from_outcome(&outcome);
    println!(
        "{}",
        serde_json::to_string_pretty(&manifest).context("serialize manifest")?
    );
    Ok(manifest.success)
}
