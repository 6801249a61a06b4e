//! Landscape renderers.
//!
//! Two projections are supported:
//! - **Silhouette** ([`Renderer::image`]): each grid row becomes a polyline
//!   whose vertical offset encodes height. Rows are painted far to near; each
//!   row first fills its own outline down to the floor with the background
//!   colour, hiding whatever farther rows drew there, then strokes the outline.
//!   The water level clips the stroke, so submerged outline is never drawn.
//! - **Shaded map** ([`Renderer::plot`]): a top-down view of submerged cells,
//!   tinted by the local-variation field.

pub mod raster;

use image::{Rgb, RgbImage};
use rand::Rng;
use tracing::debug;

use crate::error::{ensure_same_shape, LandscapeError, Result};
use crate::filter::GRADIENT_SCALE;
use crate::tilemap::{GradientField, HeightField};
use raster::Clip;

/// 24-bit RGB output of every render call.
pub type RasterImage = RgbImage;

/// Default stroke width for landscape outlines, in pixels.
pub const DEFAULT_STROKE: u32 = 2;

/// Background and outline colours of a silhouette.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub background: Rgb<u8>,
    pub foreground: Rgb<u8>,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgb([0, 0, 0]),
            foreground: Rgb([255, 255, 255]),
        }
    }
}

impl Palette {
    /// Pick a dark tinted background with the complementary light outline.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let red = rng.gen_range(0..32u8);
        let green = rng.gen_range(0..32u8);
        let blue = rng.gen_range(0..32u8);
        Self {
            background: Rgb([10 + red, 10 + green, 10 + blue]),
            foreground: Rgb([250 - red, 250 - green, 250 - blue]),
        }
    }

    /// Background colour as `#rrggbb`.
    pub fn background_hex(&self) -> String {
        let [r, g, b] = self.background.0;
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

/// Renders height fields as raster images.
#[derive(Clone, Debug)]
pub struct Renderer {
    /// Shift each projected point horizontally by up to half a cell
    pub jitter: bool,
    /// Extra rows drawn beyond both ends of a slice
    pub overscan: usize,
    pub background: Rgb<u8>,
    pub foreground: Rgb<u8>,
    /// Outline width in pixels
    pub stroke: u32,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(true, 0)
    }
}

impl Renderer {
    pub fn new(jitter: bool, overscan: usize) -> Self {
        let palette = Palette::default();
        Self {
            jitter,
            overscan,
            background: palette.background,
            foreground: palette.foreground,
            stroke: DEFAULT_STROKE,
        }
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.background = palette.background;
        self.foreground = palette.foreground;
        self
    }

    pub fn with_stroke(mut self, stroke: u32) -> Self {
        self.stroke = stroke;
        self
    }

    /// Render every row of the landscape as a silhouette.
    pub fn image<R: Rng + ?Sized>(
        &self,
        points: &HeightField,
        scale: f64,
        water: f64,
        z_scale: f64,
        border: u32,
        rng: &mut R,
    ) -> Result<RasterImage> {
        self.image_slice(points, 0, points.height, scale, water, z_scale, border, rng)
    }

    /// Render rows `row_start..row_end` of the landscape as a silhouette.
    ///
    /// The canvas is `trunc(scale * cols) + 2 * border` wide and
    /// `trunc(scale * (row_end - row_start)) + 2 * border` high. Jitter draws
    /// one value from `rng` per projected point.
    #[allow(clippy::too_many_arguments)]
    pub fn image_slice<R: Rng + ?Sized>(
        &self,
        points: &HeightField,
        row_start: usize,
        row_end: usize,
        scale: f64,
        water: f64,
        z_scale: f64,
        border: u32,
        rng: &mut R,
    ) -> Result<RasterImage> {
        let (sx, rows) = points.dimensions();
        if sx == 0 || rows == 0 {
            return Err(LandscapeError::InvalidArgument("cannot render an empty height field".into()));
        }
        if row_start >= row_end || row_end > rows {
            return Err(LandscapeError::InvalidArgument(format!(
                "row slice {}..{} is outside 0..{}",
                row_start, row_end, rows
            )));
        }

        let sy = row_end - row_start;
        let b = border as i32;
        let w = (scale * sx as f64) as i32 + 2 * b;
        let h = (scale * sy as f64) as i32 + 2 * b;
        if w <= 0 || h <= 0 {
            return Err(LandscapeError::InvalidArgument(format!(
                "scale {} gives an empty {}x{} canvas",
                scale, w, h
            )));
        }

        let mut image = RgbImage::from_pixel(w as u32, h as u32, self.background);
        let fill_clip = Clip::new(0, 0, w, h - b);
        let floor = b + (scale * sy as f64) as i32;

        let first = row_start.saturating_sub(self.overscan);
        let last = (row_end - 1 + self.overscan).min(rows - 1);
        debug!(width = w, height = h, first, last, "rendering silhouette");

        let mut line: Vec<(i32, i32)> = Vec::with_capacity(sx + 2);
        for j in (first..=last).rev() {
            let base = b + (scale * (row_end as f64 - j as f64)) as i32;

            line.clear();
            for i in 0..sx {
                let x = self.column_x(i, b, scale, rng);
                let y = base + (*points.get(i, j) * z_scale) as i32;
                line.push((x, y));
            }

            // Close the outline along the floor so the fill hides farther rows
            let last_x = line[sx - 1].0;
            line.push((last_x, floor));
            line.push((b, floor));
            raster::fill_polygon(&mut image, &line, self.background, fill_clip);

            // Water level clips the outline only
            let water_y = base + (z_scale * water) as i32;
            let stroke_clip = Clip::new(0, 0, w, (h - b).min(water_y) - 1);
            raster::draw_polyline(&mut image, &line[..sx], self.foreground, self.stroke, stroke_clip);
        }

        Ok(image)
    }

    /// Screen x of column `i`, moved by up to half a cell when jittering.
    fn column_x<R: Rng + ?Sized>(&self, i: usize, border: i32, scale: f64, rng: &mut R) -> i32 {
        let x = border + (scale * i as f64) as i32;
        if self.jitter {
            (x as f64 + (rng.gen::<f64>() - 0.5) * scale) as i32
        } else {
            x
        }
    }

    /// Plot submerged cells as a top-down shaded map.
    ///
    /// Each cell below `water` is filled with a tint whose intensity follows
    /// `|gradient * 100|`: blue-green where that is below `threshold`, grey
    /// otherwise. Row 0 is at the bottom of the canvas.
    pub fn plot(
        &self,
        points: &HeightField,
        gradient: &GradientField,
        scale: f64,
        water: f64,
        threshold: f64,
    ) -> Result<RasterImage> {
        ensure_same_shape(points.dimensions(), gradient.dimensions())?;

        let (sx, sy) = points.dimensions();
        let s = scale as i32;
        if s <= 0 || sx == 0 || sy == 0 {
            return Err(LandscapeError::InvalidArgument(format!(
                "cannot plot a {}x{} field at scale {}",
                sx, sy, scale
            )));
        }

        let mut image = RgbImage::from_pixel((s * sx as i32) as u32, (s * sy as i32) as u32, self.background);
        let canvas = Clip::canvas(&image);
        let size = s as f64;
        let mut painted = 0usize;

        for j in 0..sy {
            for i in 0..sx {
                if *points.get(i, j) >= water {
                    continue;
                }
                let q = (*gradient.get(i, j) * GRADIENT_SCALE).abs();
                let c = (q * 255.0).round().min(255.0) as u8;
                let color = if q < threshold {
                    Rgb([0, c, c / 2])
                } else {
                    Rgb([c, c, c])
                };

                let x = (scale * i as f64) as i32;
                let y = (scale * (sy - 1 - j) as f64) as i32;
                let cell = Clip::new(x, y, s, s).intersect(canvas);
                raster::fill_disc(&mut image, x as f64 + size / 2.0, y as f64 + size / 2.0, size * 1.5, color, cell);
                painted += 1;
            }
        }

        debug!(width = image.width(), height = image.height(), painted, "plotted shaded map");
        Ok(image)
    }
}
