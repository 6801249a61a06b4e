use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fractal_landscape::config::LandscapeConfig;
use fractal_landscape::save::{self, ImageFormat};
use fractal_landscape::seeds::LandscapeSeeds;
use fractal_landscape::{filter, fractal, gradient, Palette};

#[derive(Parser, Debug)]
#[command(name = "landscape")]
#[command(about = "Generate images of fractal landscapes")]
struct Args {
    /// Roughness exponent (random 2.0-2.25 if not specified)
    #[arg(short, long)]
    roughness: Option<f64>,

    /// Number of images to generate
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// File name prefix for saved images
    #[arg(short, long)]
    prefix: Option<String>,

    /// Random seed (uses random seed if not specified)
    #[arg(short, long, env = "LANDSCAPE_SEED")]
    seed: Option<u64>,

    /// JSON config file (defaults to the built-in image settings)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Save directory, relative to the home directory unless absolute
    #[arg(long, env = "LANDSCAPE_SAVE_DIR", default_value = save::SAVE_DIR)]
    save_dir: PathBuf,

    /// Image file format
    #[arg(long, env = "LANDSCAPE_SAVE_FORMAT", value_enum, default_value_t = ImageFormat::Png)]
    format: ImageFormat,

    /// Also save the unfiltered landscape and the shaded gradient map
    #[arg(long)]
    save_all: bool,

    /// Use a random tinted palette for each image
    #[arg(long)]
    color: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    info!("Fractal landscape images - {}", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => LandscapeConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => LandscapeConfig::images(),
    };
    if args.roughness.is_some() {
        config.roughness = args.roughness;
    }
    if let Some(count) = args.count {
        config.count = count;
    }
    config.save_all |= args.save_all;
    let config = config.with_overrides(args.prefix, args.color);
    config.validate()?;

    let seeds = LandscapeSeeds::from_master(args.seed.unwrap_or_else(rand::random));
    info!("Using seed {}", seeds.master);
    let mut scene_rng = ChaCha8Rng::seed_from_u64(seeds.scene);
    let mut terrain_rng = ChaCha8Rng::seed_from_u64(seeds.terrain);
    let mut render_rng = ChaCha8Rng::seed_from_u64(seeds.render);
    let mut palette_rng = ChaCha8Rng::seed_from_u64(seeds.palette);

    let dir = save::save_dir(&args.save_dir)?;
    let roughness = config.resolve_roughness(&mut scene_rng);
    let water = config.resolve_water(&mut scene_rng);
    let mut renderer = config.renderer();

    let count = config.count.max(1);
    if count > 1 {
        info!("Running {} times", count);
    }
    info!("Using {:.3} roughness and water {:.3}", roughness, water);

    for _ in 0..count {
        if config.color {
            let palette = Palette::random(&mut palette_rng);
            renderer = renderer.with_palette(palette);
            info!("Setting landscape colour to {}", palette.background_hex());
        }

        // Generate height map
        info!("Generating landscape over {} iterations", config.generator_iterations);
        let points = fractal::generate(
            roughness,
            config.width,
            config.height,
            config.generator_iterations,
            &mut terrain_rng,
        )?;
        info!("Generated {} points", points.len());
        if let Some((min_h, max_h)) = points.range() {
            info!("Height range {:.3} to {:.3}", min_h, max_h);
        }
        if config.save_all {
            let image = renderer.image(&points, config.scale, water, config.z_scale, config.border, &mut render_rng)?;
            info!("Rendered as {} x {} image", image.width(), image.height());
            let file = save::save(&image, args.format, &dir, &format!("{}-base", config.prefix))?;
            info!("Saved image as {}", file.display());
        }

        // Differentiate height map
        info!("Differentiating points");
        let gradient = gradient::differentiate(&points);
        if config.save_all {
            let image = renderer.plot(&points, &gradient, config.scale / 2.0, water, config.threshold)?;
            info!("Plotted {} x {} image", image.width(), image.height());
            let file = save::save(&image, args.format, &dir, &format!("{}-map", config.prefix))?;
            info!("Saved plot as {}", file.display());
        }

        // Smooth height map
        info!(
            "Filtering points {} times with threshold {:.3}",
            config.filter_iterations, config.threshold
        );
        let smoothed = filter::smooth(&points, &gradient, config.threshold, config.filter_iterations)?;
        let image = renderer.image(&smoothed, config.scale, water, config.z_scale, config.border, &mut render_rng)?;
        info!("Rendered as {} x {} image", image.width(), image.height());
        let file = save::save(&image, args.format, &dir, &config.prefix)?;
        info!("Saved image as {}", file.display());
    }

    Ok(())
}
