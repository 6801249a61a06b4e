//! Configuration for landscape generation and rendering.

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{LandscapeError, Result};
use crate::fractal::MIN_GRID_SIZE;
use crate::render::Renderer;

/// Row window of a fly-over sequence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameWindow {
    /// Rows visible in each frame.
    pub rows: usize,
    /// First row of the first frame.
    pub start: usize,
    /// Rows left unvisited at the far end of the landscape.
    pub tail: usize,
}

impl Default for FrameWindow {
    fn default() -> Self {
        Self { rows: 120, start: 50, tail: 150 }
    }
}

/// Parameters of one landscape run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandscapeConfig {
    /// Midpoint subdivision steps.
    pub generator_iterations: usize,
    /// Displacement decay exponent. Random in `[2.0, 2.25)` when unset.
    pub roughness: Option<f64>,
    /// Initial grid columns (at least 2).
    pub width: usize,
    /// Initial grid rows (at least 2).
    pub height: usize,
    /// Extra smoothing passes; one pass always runs.
    pub filter_iterations: usize,
    /// Smoothing gate on `|gradient * 100|`.
    pub threshold: f64,
    /// Pixels per grid cell.
    pub scale: f64,
    /// Pixels per height unit.
    pub z_scale: f64,
    /// Border around the silhouette in pixels.
    pub border: u32,
    /// Water clip level in height units. Random in `(-0.2, 0.8]` when unset.
    pub water: Option<f64>,
    pub jitter: bool,
    pub overscan: usize,
    /// Outline width in pixels.
    pub stroke: u32,
    /// Pick a random tinted palette for each image.
    pub color: bool,
    /// Also save the unfiltered silhouette and the shaded map.
    pub save_all: bool,
    /// File name prefix for saved images.
    pub prefix: String,
    /// Number of landscapes to generate.
    pub count: usize,
    pub window: FrameWindow,
}

impl Default for LandscapeConfig {
    fn default() -> Self {
        Self::images()
    }
}

impl LandscapeConfig {
    /// Batch still images.
    pub fn images() -> Self {
        Self {
            generator_iterations: 6,
            roughness: None,
            width: 4,
            height: 3,
            filter_iterations: 4,
            threshold: 0.8,
            scale: 12.0,
            z_scale: 600.0,
            border: 0,
            water: None,
            jitter: true,
            overscan: 0,
            stroke: crate::render::DEFAULT_STROKE,
            color: false,
            save_all: false,
            prefix: "fractal".to_string(),
            count: 10,
            window: FrameWindow::default(),
        }
    }

    /// A long strip rendered as a fly-over frame sequence.
    pub fn flyover() -> Self {
        Self {
            filter_iterations: 5,
            threshold: 0.9,
            scale: 10.0,
            z_scale: 800.0,
            height: 40,
            jitter: false,
            overscan: 30,
            prefix: "frame".to_string(),
            count: 1,
            ..Self::images()
        }
    }

    /// Read a JSON config file. Missing fields take the [`images`](Self::images) defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LandscapeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(LandscapeError::InvalidArgument(msg));

        if self.width < MIN_GRID_SIZE || self.height < MIN_GRID_SIZE {
            return invalid(format!("initial grid {}x{} is smaller than 2x2", self.width, self.height));
        }
        if let Some(r) = self.roughness {
            if !(r > 0.0) {
                return invalid(format!("roughness must be positive, got {}", r));
            }
        }
        if !(self.scale > 0.0) {
            return invalid(format!("scale must be positive, got {}", self.scale));
        }
        if self.prefix.is_empty() {
            return invalid("file prefix is empty".to_string());
        }
        if self.window.rows == 0 {
            return invalid("frame window has no rows".to_string());
        }
        Ok(())
    }

    /// Configured roughness, or a random one in `[2.0, 2.25)`.
    pub fn resolve_roughness<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.roughness.unwrap_or_else(|| 2.0 + rng.gen::<f64>() / 4.0)
    }

    /// Configured water level, or a random one in `(-0.2, 0.8]`.
    pub fn resolve_water<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.water.unwrap_or_else(|| 0.8 - rng.gen::<f64>())
    }

    /// Apply command line overrides. A missing prefix keeps the configured one.
    pub fn with_overrides(mut self, prefix: Option<String>, color: bool) -> Self {
        if let Some(prefix) = prefix {
            self.prefix = prefix;
        }
        self.color |= color;
        self
    }

    pub fn renderer(&self) -> Renderer {
        Renderer::new(self.jitter, self.overscan).with_stroke(self.stroke)
    }
}
