//! Fly-over animation: a sliding window of rows rendered frame by frame.

use std::ops::Range;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::config::{FrameWindow, LandscapeConfig};
use crate::error::Result;
use crate::render::{Palette, RasterImage, Renderer};
use crate::seeds::LandscapeSeeds;
use crate::tilemap::HeightField;
use crate::{filter, fractal, gradient};

/// One rendered frame of the sequence.
pub struct Frame {
    /// First landscape row shown in this frame
    pub row: usize,
    pub image: RasterImage,
}

pub struct FlyOver {
    points: HeightField,
    renderer: Renderer,
    window: FrameWindow,
    scale: f64,
    water: f64,
    z_scale: f64,
    border: u32,
    rng: ChaCha8Rng,
}

impl FlyOver {
    /// Generate, differentiate and smooth a landscape for the fly-over.
    ///
    /// In colour mode the palette comes from its own seed, so it never
    /// shifts the roughness or water level.
    pub fn generate(config: &LandscapeConfig, seeds: &LandscapeSeeds) -> Result<Self> {
        config.validate()?;

        let mut scene_rng = ChaCha8Rng::seed_from_u64(seeds.scene);
        let roughness = config.resolve_roughness(&mut scene_rng);
        let water = config.resolve_water(&mut scene_rng);
        info!("Generating landscape over {} iterations", config.generator_iterations);
        info!("Using {:.3} roughness and water {:.3}", roughness, water);

        let mut terrain_rng = ChaCha8Rng::seed_from_u64(seeds.terrain);
        let points = fractal::generate(
            roughness,
            config.width,
            config.height,
            config.generator_iterations,
            &mut terrain_rng,
        )?;
        info!("Landscape size {} x {}", points.width, points.height);

        let gradient = gradient::differentiate(&points);
        info!(
            "Filtering points {} times with threshold {:.3}",
            config.filter_iterations, config.threshold
        );
        let smoothed = filter::smooth(&points, &gradient, config.threshold, config.filter_iterations)?;

        let mut flyover = Self::new(smoothed, config, water, seeds.render);
        if config.color {
            let palette = Palette::random(&mut ChaCha8Rng::seed_from_u64(seeds.palette));
            info!("Setting landscape colour to {}", palette.background_hex());
            flyover.renderer = flyover.renderer.with_palette(palette);
        }
        Ok(flyover)
    }

    /// Wrap an already smoothed landscape.
    pub fn new(points: HeightField, config: &LandscapeConfig, water: f64, render_seed: u64) -> Self {
        Self {
            points,
            renderer: config.renderer(),
            window: config.window.clone(),
            scale: config.scale,
            water,
            z_scale: config.z_scale,
            border: config.border,
            rng: ChaCha8Rng::seed_from_u64(render_seed),
        }
    }

    pub fn water(&self) -> f64 {
        self.water
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    /// First rows of every frame.
    ///
    /// Frames start at `window.start` and stop `window.tail` rows before the
    /// last interior row, never running past the end of the landscape.
    pub fn frame_range(&self) -> Range<usize> {
        let rows = self.points.height;
        let last_interior = rows.saturating_sub(2);
        let end = last_interior
            .saturating_sub(self.window.tail)
            .min((rows + 1).saturating_sub(self.window.rows));
        let start = self.window.start.min(end);
        start..end
    }

    /// Render the frames in order.
    pub fn frames(&mut self) -> impl Iterator<Item = Result<Frame>> + '_ {
        let range = self.frame_range();
        debug!(start = range.start, end = range.end, rows = self.window.rows, "fly-over frames");

        range.map(move |row| {
            let image = self.renderer.image_slice(
                &self.points,
                row,
                row + self.window.rows,
                self.scale,
                self.water,
                self.z_scale,
                self.border,
                &mut self.rng,
            )?;
            Ok(Frame { row, image })
        })
    }
}
