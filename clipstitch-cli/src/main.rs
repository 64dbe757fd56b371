use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "clipstitch", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Merge clips into a single MP4 (requires `ffmpeg` and `ffprobe` on PATH).
    Merge(MergeArgs),
    /// Probe clips and print their resolved geometry as JSON.
    Probe(ProbeArgs),
    /// Report whether this environment can merge at all.
    Support,
}

#[derive(Parser, Debug)]
struct MergeArgs {
    /// Input clips, concatenated in the order given.
    #[arg(required = true)]
    clips: Vec<PathBuf>,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Output frame rate in frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,
}

#[derive(Parser, Debug)]
struct ProbeArgs {
    /// Clips to probe.
    #[arg(required = true)]
    clips: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Merge(args) => cmd_merge(args),
        Command::Probe(args) => cmd_probe(args),
        Command::Support => cmd_support(),
    }
}

/// Engine logs are opt-in: quiet by default, `RUST_LOG` overrides.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn cmd_merge(args: MergeArgs) -> anyhow::Result<()> {
    let options = clipstitch::MergeOptions {
        fps: clipstitch::Fps::new(args.fps, 1).map_err(engine_error)?,
    };
    let out = clipstitch::merge_videos_with(&args.clips, &args.out, options).map_err(engine_error)?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

fn cmd_probe(args: ProbeArgs) -> anyhow::Result<()> {
    let resolved = clipstitch::resolve_clips(&args.clips).map_err(engine_error)?;
    println!("{}", serde_json::to_string_pretty(&resolved)?);
    Ok(())
}

fn cmd_support() -> anyhow::Result<()> {
    println!("{}", clipstitch::is_merge_supported());
    Ok(())
}

/// Prefix engine errors with their stable code so scripts can match on it.
fn engine_error(err: clipstitch::StitchError) -> anyhow::Error {
    anyhow::anyhow!("{}: {err}", err.code())
}
