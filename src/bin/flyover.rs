//! Renders a fly-over of a long fractal landscape as a numbered frame sequence

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fractal_landscape::config::LandscapeConfig;
use fractal_landscape::flyover::FlyOver;
use fractal_landscape::save::{self, ImageFormat};
use fractal_landscape::seeds::LandscapeSeeds;
use fractal_landscape::viewer::Preview;

#[derive(Parser, Debug)]
#[command(name = "flyover")]
#[command(about = "Render a fractal landscape fly-over as image frames")]
struct Args {
    /// Show frames in a preview window while rendering
    #[arg(long)]
    display: bool,

    /// Directory for the frame images
    #[arg(short, long, default_value = "./flyover")]
    output: PathBuf,

    /// File name prefix for frames (defaults to the config prefix)
    #[arg(short, long)]
    prefix: Option<String>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long, env = "LANDSCAPE_SEED")]
    seed: Option<u64>,

    /// JSON config file (defaults to the built-in fly-over settings)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Use a random tinted palette
    #[arg(long)]
    color: bool,

    /// Preview window width
    #[arg(long, default_value = "1280")]
    window_width: usize,

    /// Preview window height
    #[arg(long, default_value = "720")]
    window_height: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    info!("Fractal landscape flyover - {}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => LandscapeConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => LandscapeConfig::flyover(),
    }
    .with_overrides(args.prefix, args.color);

    let seeds = LandscapeSeeds::from_master(args.seed.unwrap_or_else(rand::random));
    info!("Using seed {}", seeds.master);

    let mut flyover = FlyOver::generate(&config, &seeds)?;
    let background = flyover.renderer().background;

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("Failed to create {}", args.output.display()))?;

    let mut preview = if args.display {
        Some(Preview::open("Fractal Landscape", args.window_width, args.window_height)?)
    } else {
        None
    };

    let range = flyover.frame_range();
    info!("Rendering {} frames at water level {:.3}", range.len(), flyover.water());

    let mut rendered = 0usize;
    let mut last_size = (0, 0);
    for frame in flyover.frames() {
        let frame = frame?;
        last_size = frame.image.dimensions();

        if let Some(preview) = preview.as_mut() {
            if !preview.is_open() {
                info!("Preview closed, stopping");
                break;
            }
            preview.show(&frame.image, background)?;
        }

        let file = save::save(&frame.image, ImageFormat::Png, &args.output, &config.prefix)?;
        tracing::debug!(row = frame.row, file = %file.display(), "saved frame");
        rendered += 1;
    }

    info!("Frames saved as {} x {} total {}", last_size.0, last_size.1, rendered);
    Ok(())
}
