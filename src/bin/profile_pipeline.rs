//! Profiling tool timing each landscape pipeline stage

use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use fractal_landscape::config::LandscapeConfig;
use fractal_landscape::{filter, fractal, gradient};

fn percent(part: Duration, total: Duration) -> f64 {
    100.0 * part.as_secs_f64() / total.as_secs_f64().max(f64::EPSILON)
}

fn main() -> anyhow::Result<()> {
    let config = LandscapeConfig::images();
    let roughness = 2.1;
    let water = 0.3;
    let seed = 1337u64;

    let width = fractal::size_after(config.width, config.generator_iterations)?;
    let height = fractal::size_after(config.height, config.generator_iterations)?;
    println!("=== Performance Profiling ===");
    println!("Grid size: {}x{} ({} points)", width, height, width * height);
    println!();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let start = Instant::now();
    let points = fractal::generate(roughness, config.width, config.height, config.generator_iterations, &mut rng)?;
    let generate_time = start.elapsed();
    println!("Generation: {:?}", generate_time);

    let start = Instant::now();
    let parallel = fractal::generate_parallel(roughness, config.width, config.height, config.generator_iterations, seed)?;
    let parallel_time = start.elapsed();
    println!("Parallel generation: {:?} ({} points)", parallel_time, parallel.len());

    let start = Instant::now();
    let gradient = gradient::differentiate(&points);
    let gradient_time = start.elapsed();
    println!("Gradient: {:?}", gradient_time);

    let start = Instant::now();
    let smoothed = filter::smooth(&points, &gradient, config.threshold, config.filter_iterations)?;
    let filter_time = start.elapsed();
    println!("Smoothing ({} passes): {:?}", config.filter_iterations + 1, filter_time);

    let renderer = config.renderer();
    let start = Instant::now();
    let image = renderer.image(&smoothed, config.scale, water, config.z_scale, config.border, &mut rng)?;
    let render_time = start.elapsed();
    println!("Silhouette render: {:?} ({}x{})", render_time, image.width(), image.height());

    let start = Instant::now();
    let map = renderer.plot(&points, &gradient, config.scale / 2.0, water, config.threshold)?;
    let plot_time = start.elapsed();
    println!("Shaded map: {:?} ({}x{})", plot_time, map.width(), map.height());

    let total = generate_time + gradient_time + filter_time + render_time + plot_time;
    println!("\n=== Summary ===");
    println!("Generation: {:>8.2}% ({:?})", percent(generate_time, total), generate_time);
    println!("Gradient:   {:>8.2}% ({:?})", percent(gradient_time, total), gradient_time);
    println!("Smoothing:  {:>8.2}% ({:?})", percent(filter_time, total), filter_time);
    println!("Render:     {:>8.2}% ({:?})", percent(render_time, total), render_time);
    println!("Map:        {:>8.2}% ({:?})", percent(plot_time, total), plot_time);
    println!("─────────────────────────────────");
    println!("Total:      {:?}", total);
    if parallel_time > Duration::ZERO {
        println!(
            "Parallel speedup: {:.2}x",
            generate_time.as_secs_f64() / parallel_time.as_secs_f64()
        );
    }

    Ok(())
}
