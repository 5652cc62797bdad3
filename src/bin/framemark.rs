use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use framemark::{
    AppConfig, CompositionJob, CropMode, CropSplitRequest, ExifMetadata, HandshakeConfig,
    JobOptions, LocalRenderer, PreviewOptions, crop_split, renderer_channel,
};

#[derive(Parser, Debug)]
#[command(name = "framemark", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a full-size framed composite.
    Render(RenderArgs),
    /// Render a reduced-size preview JPEG.
    Preview(PreviewArgs),
    /// Crop a photo to a fixed ratio and split it into grid slices.
    Crop(CropArgs),
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input photo.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Config JSON (layout options, output and cache dirs).
    #[arg(long)]
    config: PathBuf,

    /// Override the output directory from the config.
    #[arg(long)]
    out_dir: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct PreviewArgs {
    /// Input photo.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Config JSON.
    #[arg(long)]
    config: PathBuf,

    /// Output JPEG path.
    #[arg(long)]
    out: PathBuf,

    /// Longest side of the preview (at least 200).
    #[arg(long)]
    max_size: Option<u32>,

    /// JPEG quality (30..=100).
    #[arg(long)]
    quality: Option<u8>,
}

#[derive(Parser, Debug)]
struct CropArgs {
    /// Input photo.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory that receives the slices.
    #[arg(long)]
    out_dir: PathBuf,

    /// two_3x4, three_3x5 or custom.
    #[arg(long)]
    mode: CropMode,

    /// Custom ratio width.
    #[arg(long)]
    crop_w: Option<f64>,

    /// Custom ratio height.
    #[arg(long)]
    crop_h: Option<f64>,

    /// Custom slice count (2 or 3).
    #[arg(long)]
    parts: Option<u32>,

    /// Slice JPEG quality.
    #[arg(long)]
    quality: Option<u8>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args).await,
        Command::Preview(args) => cmd_preview(args).await,
        Command::Crop(args) => cmd_crop(args),
    }
}

fn job_options(
    config: &Path,
    photo: &Path,
    out_dir: Option<PathBuf>,
) -> anyhow::Result<JobOptions> {
    let cfg = AppConfig::from_path(config)?;
    let mut opts = JobOptions::from_config(&cfg);
    if let Some(dir) = out_dir {
        opts.output_dir = dir;
    }
    if opts.output_dir.as_os_str().is_empty() {
        opts.output_dir = photo
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
    }
    if opts.cache_dir.as_os_str().is_empty() {
        opts.cache_dir = std::env::temp_dir().join("framemark");
    }
    Ok(opts)
}

fn new_job(photo: &Path, opts: JobOptions) -> CompositionJob {
    let (bus, endpoint) = renderer_channel(HandshakeConfig::default());
    LocalRenderer.spawn(endpoint);
    let name = photo
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    CompositionJob::new(photo, &name, opts, bus).with_metadata(Arc::new(ExifMetadata))
}

async fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let opts = job_options(&args.config, &args.in_path, args.out_dir)?;
    let mut job = new_job(&args.in_path, opts);
    let out = job.render().await?;
    eprintln!("wrote {}", out.display());
    Ok(())
}

async fn cmd_preview(args: PreviewArgs) -> anyhow::Result<()> {
    let opts = job_options(&args.config, &args.in_path, None)?;
    let mut job = new_job(&args.in_path, opts);
    let bytes = job
        .render_preview(PreviewOptions {
            max_size: args.max_size,
            quality: args.quality,
        })
        .await?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, bytes)
        .with_context(|| format!("write preview '{}'", args.out.display()))?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_crop(args: CropArgs) -> anyhow::Result<()> {
    let mut req = CropSplitRequest::new(args.in_path, args.out_dir, args.mode);
    req.crop_w = args.crop_w;
    req.crop_h = args.crop_h;
    req.parts = args.parts;
    req.quality = args.quality;

    for path in crop_split(&req)? {
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}
