//! Fractal height field generation by recursive midpoint displacement.
//!
//! Each subdivision step doubles the resolution of the grid along both axes:
//! an `ix × iy` grid becomes `((ix − 1) * 2 + 1) × ((iy − 1) * 2 + 1)`. The
//! original samples are copied to the even cells, diagonal midpoints get the
//! mean of their four corners plus a random offset, and the edge midpoints are
//! averaged from their neighbours and the diagonal. The offset amplitude decays
//! as `level^(-roughness)`, so a larger roughness exponent flattens the fine
//! detail faster.
//!
//! Midpoints are never inserted along the `x == 0` column or `y == 0` row
//! beyond copying the coarser grid. This leaves an axis-aligned seam in the
//! terrain that the silhouette renderer hides with horizontal jitter.
//!
//! Two entry points trade reproducibility against throughput:
//! - [`generate`] is single-threaded and consumes one draw from the injected
//!   rng per diagonal midpoint, in column-major order.
//! - [`generate_parallel`] splits each step across columns with rayon, giving
//!   every column its own ChaCha8 stream. It is reproducible for a fixed seed
//!   but produces a different landscape than [`generate`].

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{LandscapeError, Result};
use crate::tilemap::HeightField;

/// Smallest initial grid edge that can be subdivided.
pub const MIN_GRID_SIZE: usize = 2;

/// Size of one axis after a single subdivision step. `n` is at least 2.
fn subdivided_size(n: usize) -> usize {
    (n - 1) * 2 + 1
}

/// Size of one axis after `iterations` subdivision steps.
pub fn size_after(n: usize, iterations: usize) -> Result<usize> {
    if n < MIN_GRID_SIZE {
        return Err(LandscapeError::InvalidArgument(format!(
            "axis of {} points is smaller than {}",
            n, MIN_GRID_SIZE
        )));
    }
    Ok((0..iterations).fold(n, |n, _| subdivided_size(n)))
}

/// Generate a height field from an all-zero `width × height` grid.
///
/// Two runs with the same rng state and arguments return bit-identical grids.
pub fn generate<R: Rng + ?Sized>(
    roughness: f64,
    width: usize,
    height: usize,
    iterations: usize,
    rng: &mut R,
) -> Result<HeightField> {
    check_initial_grid(width, height)?;

    let mut points = HeightField::new_with(width, height, 0.0);
    for level in 1..=iterations {
        points = interpolate(&points, level, roughness, rng)?;
        debug!(level, width = points.width, height = points.height, "subdivided height field");
    }

    Ok(points)
}

/// Apply subdivision step `level` (1-based) to `input`, returning a new grid.
///
/// Diagonal offsets are drawn with `x` ascending in the outer loop and `y`
/// ascending in the inner loop.
pub fn interpolate<R: Rng + ?Sized>(
    input: &HeightField,
    level: usize,
    roughness: f64,
    rng: &mut R,
) -> Result<HeightField> {
    let (ix, iy) = input.dimensions();
    check_initial_grid(ix, iy)?;
    let mut output = HeightField::new_with(subdivided_size(ix), subdivided_size(iy), 0.0);

    for x in 0..ix {
        for y in 0..iy {
            let cell = subdivide_cell(input, x, y, || {
                displacement(level, roughness, rng.gen::<f64>())
            });
            cell.write(&mut output, x, y);
        }
    }

    Ok(output)
}

/// Generate a height field using rayon, one rng stream per column and level.
pub fn generate_parallel(
    roughness: f64,
    width: usize,
    height: usize,
    iterations: usize,
    seed: u64,
) -> Result<HeightField> {
    check_initial_grid(width, height)?;

    let mut points = HeightField::new_with(width, height, 0.0);
    for level in 1..=iterations {
        points = interpolate_parallel(&points, level, roughness, seed);
        debug!(level, width = points.width, height = points.height, "subdivided height field (parallel)");
    }

    Ok(points)
}

fn interpolate_parallel(input: &HeightField, level: usize, roughness: f64, seed: u64) -> HeightField {
    let (ix, iy) = input.dimensions();

    // Every column only reads the frozen input, so columns are independent
    let columns: Vec<Vec<CellUpdate>> = (0..ix)
        .into_par_iter()
        .map(|x| {
            let mut rng = ChaCha8Rng::seed_from_u64(column_seed(seed, level, x));
            (0..iy)
                .map(|y| {
                    subdivide_cell(input, x, y, || {
                        displacement(level, roughness, rng.gen::<f64>())
                    })
                })
                .collect()
        })
        .collect();

    let mut output = HeightField::new_with(subdivided_size(ix), subdivided_size(iy), 0.0);
    for (x, column) in columns.iter().enumerate() {
        for (y, cell) in column.iter().enumerate() {
            cell.write(&mut output, x, y);
        }
    }

    output
}

fn column_seed(seed: u64, level: usize, x: usize) -> u64 {
    seed.wrapping_add((level as u64) << 32).wrapping_add(x as u64)
}

fn check_initial_grid(width: usize, height: usize) -> Result<()> {
    if width < MIN_GRID_SIZE || height < MIN_GRID_SIZE {
        return Err(LandscapeError::InvalidArgument(format!(
            "grid {}x{} is smaller than {}x{}",
            width, height, MIN_GRID_SIZE, MIN_GRID_SIZE
        )));
    }
    Ok(())
}

/// Random offset for a diagonal midpoint, `u` uniform in `[0, 1)`.
fn displacement(level: usize, roughness: f64, u: f64) -> f64 {
    (u - 0.5) * (level as f64).powf(-roughness)
}

/// Output values owned by one input cell.
struct CellUpdate {
    corner: f64,
    diagonal: Option<f64>,
    west_edge: Option<f64>,
    north_edge: Option<f64>,
}

impl CellUpdate {
    fn write(&self, output: &mut HeightField, x: usize, y: usize) {
        output.set(2 * x, 2 * y, self.corner);
        if let Some(v) = self.diagonal {
            output.set(2 * x - 1, 2 * y - 1, v);
        }
        if let Some(v) = self.west_edge {
            output.set(2 * x - 1, 2 * y, v);
        }
        if let Some(v) = self.north_edge {
            output.set(2 * x, 2 * y - 1, v);
        }
    }
}

/// Compute the values input cell `(x, y)` contributes to the next grid.
///
/// `offset` is called exactly once, and only when a diagonal midpoint exists.
fn subdivide_cell(input: &HeightField, x: usize, y: usize, offset: impl FnOnce() -> f64) -> CellUpdate {
    let p = *input.get(x, y);

    let diagonal = if x > 0 && y > 0 {
        let q = (*input.get(x - 1, y - 1) + *input.get(x - 1, y) + *input.get(x, y - 1) + p) / 4.0;
        Some(q + offset())
    } else {
        None
    };

    // Edge midpoints fall back to the cell itself when there is no diagonal
    let o = diagonal.unwrap_or(p);
    let west_edge = (x > 0).then(|| (p + *input.get(x - 1, y) + o) / 3.0);
    let north_edge = (y > 0).then(|| (p + *input.get(x, y - 1) + o) / 3.0);

    CellUpdate { corner: p, diagonal, west_edge, north_edge }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::mock::StepRng;
    use rand::RngCore;

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-12, "expected {expected}, got {actual}");
    }

    /// Rng wrapper that counts how many values were drawn.
    struct CountingRng {
        inner: StepRng,
        draws: usize,
    }

    impl RngCore for CountingRng {
        fn next_u32(&mut self) -> u32 {
            self.draws += 1;
            self.inner.next_u32()
        }
        fn next_u64(&mut self) -> u64 {
            self.draws += 1;
            self.inner.next_u64()
        }
        fn fill_bytes(&mut self, dest: &mut [u8]) {
            self.draws += 1;
            self.inner.fill_bytes(dest)
        }
        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
            self.draws += 1;
            self.inner.try_fill_bytes(dest)
        }
    }

    #[test]
    fn test_dimensions_follow_growth_formula() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for &(w, h) in &[(2, 2), (4, 3), (3, 7), (5, 2)] {
            for k in 0..4 {
                let points = generate(2.0, w, h, k, &mut rng).unwrap();
                assert_eq!(points.dimensions(), (size_after(w, k).unwrap(), size_after(h, k).unwrap()));
            }
        }
        assert_eq!(size_after(4, 1).unwrap(), 7);
        assert_eq!(size_after(3, 2).unwrap(), 9);
        assert_eq!(size_after(2, 3).unwrap(), 9);
    }

    #[test]
    fn test_zero_iterations_returns_flat_initial_grid() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let points = generate(2.0, 4, 3, 0, &mut rng).unwrap();
        assert_eq!(points, HeightField::new_with(4, 3, 0.0));
    }

    #[test]
    fn test_rejects_degenerate_grid() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert!(matches!(
            generate(2.0, 1, 3, 2, &mut rng),
            Err(LandscapeError::InvalidArgument(_))
        ));
        assert!(matches!(
            generate(2.0, 4, 0, 2, &mut rng),
            Err(LandscapeError::InvalidArgument(_))
        ));
        assert!(generate_parallel(2.0, 4, 1, 2, 7).is_err());
    }

    #[test]
    fn test_single_step_rejects_degenerate_grid() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for &(w, h) in &[(0, 3), (3, 0), (1, 1), (0, 0)] {
            assert!(matches!(
                interpolate(&HeightField::new_with(w, h, 0.0), 1, 2.0, &mut rng),
                Err(LandscapeError::InvalidArgument(_))
            ));
        }
        assert!(size_after(0, 2).is_err());
        assert!(size_after(1, 0).is_err());
    }

    #[test]
    fn test_draws_follow_column_major_order() {
        // Draws cycle through 0.0, 0.25, 0.5, 0.75, so each diagonal records
        // which draw it received
        let mut rng = StepRng::new(0, 1 << 62);
        let points = generate(2.0, 4, 3, 1, &mut rng).unwrap();

        // x outer, y inner: (1,1) (1,2) (2,1) (2,2) (3,1) (3,2)
        let expected = [
            ((1, 1), -0.5),
            ((1, 3), -0.25),
            ((3, 1), 0.0),
            ((3, 3), 0.25),
            ((5, 1), -0.5),
            ((5, 3), -0.25),
        ];
        for ((x, y), offset) in expected {
            assert_eq!(*points.get(x, y), offset, "diagonal at ({x}, {y})");
            // West and north edge midpoints average in their own diagonal
            assert_eq!(*points.get(x, y + 1), offset / 3.0, "west edge at ({x}, {})", y + 1);
            assert_eq!(*points.get(x + 1, y), offset / 3.0, "north edge at ({}, {y})", x + 1);
        }
    }

    #[test]
    fn test_seeded_trace_matches_draw_sequence() {
        let points = generate(2.0, 4, 3, 1, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();

        // Replay the same stream by hand in x-outer, y-inner order
        let mut replay = ChaCha8Rng::seed_from_u64(42);
        for x in 1..4 {
            for y in 1..3 {
                let offset = replay.gen::<f64>() - 0.5;
                assert_eq!(
                    points.get(2 * x - 1, 2 * y - 1).to_bits(),
                    offset.to_bits(),
                    "diagonal of cell ({x}, {y})"
                );
            }
        }

        // The second step consumes the stream where the first left off
        let two_steps = generate(2.0, 4, 3, 2, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
        let expected = interpolate(&points, 2, 2.0, &mut replay).unwrap();
        assert_eq!(two_steps.dimensions(), (13, 9));
        assert_eq!(two_steps, expected);
    }

    #[test]
    fn test_same_seed_is_bit_identical() {
        let a = generate(2.1, 4, 3, 5, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
        let b = generate(2.1, 4, 3, 5, &mut ChaCha8Rng::seed_from_u64(42)).unwrap();
        let bits_a: Vec<u64> = a.iter().map(|(_, _, v)| v.to_bits()).collect();
        let bits_b: Vec<u64> = b.iter().map(|(_, _, v)| v.to_bits()).collect();
        assert_eq!(bits_a, bits_b);

        let c = generate(2.1, 4, 3, 5, &mut ChaCha8Rng::seed_from_u64(43)).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_one_draw_per_diagonal_midpoint() {
        let mut rng = CountingRng { inner: StepRng::new(0, 1), draws: 0 };
        generate(2.0, 4, 3, 1, &mut rng).unwrap();
        assert_eq!(rng.draws, 3 * 2);

        let mut rng = CountingRng { inner: StepRng::new(0, 1), draws: 0 };
        generate(2.0, 4, 3, 2, &mut rng).unwrap();
        assert_eq!(rng.draws, 3 * 2 + 6 * 4);
    }

    #[test]
    fn test_centred_draws_keep_terrain_flat() {
        // next_u64 of 2^63 maps to exactly 0.5, so every offset is zero
        let mut rng = StepRng::new(1 << 63, 0);
        let points = generate(2.0, 4, 3, 3, &mut rng).unwrap();
        assert!(points.iter().all(|(_, _, &v)| v == 0.0));
    }

    #[test]
    fn test_reference_trace_with_fixed_draws() {
        // Every draw is 0.0, so each diagonal offset is -0.5 * level^-2
        let mut rng = StepRng::new(0, 0);
        let first = generate(2.0, 4, 3, 1, &mut rng).unwrap();
        assert_eq!(first.dimensions(), (7, 5));

        for y in 0..5 {
            for x in 0..7 {
                let expected = match (x % 2, y % 2) {
                    (0, 0) => 0.0,
                    (1, 1) => -0.5,
                    (1, 0) if y == 0 => 0.0,
                    (1, 0) => -0.5 / 3.0,
                    (0, 1) if x == 0 => 0.0,
                    _ => -0.5 / 3.0,
                };
                assert_close(*first.get(x, y), expected);
            }
        }

        let mut rng = StepRng::new(0, 0);
        let second = generate(2.0, 4, 3, 2, &mut rng).unwrap();
        assert_eq!(second.dimensions(), (13, 9));

        // Boundary row and column only ever receive copies
        for x in 0..13 {
            assert_eq!(*second.get(x, 0), 0.0);
        }
        for y in 0..9 {
            assert_eq!(*second.get(0, y), 0.0);
        }

        // Even cells copy the first step
        for y in 0..5 {
            for x in 0..7 {
                assert_eq!(second.get(2 * x, 2 * y).to_bits(), first.get(x, y).to_bits());
            }
        }

        // Level two offset is -0.5 / 4 = -0.125
        assert_close(*second.get(1, 1), -0.125 - 0.125);
        assert_close(*second.get(2, 1), (-0.5 + 0.0 - 0.25) / 3.0);
        assert_close(*second.get(1, 2), (-0.5 + 0.0 - 0.25) / 3.0);
        assert_close(*second.get(3, 3), (-0.5 - 0.5 / 3.0 - 0.5 / 3.0 + 0.0) / 4.0 - 0.125);
    }

    #[test]
    fn test_higher_roughness_damps_later_levels() {
        let smooth = generate(4.0, 4, 3, 2, &mut StepRng::new(0, 0)).unwrap();
        let rough = generate(1.0, 4, 3, 2, &mut StepRng::new(0, 0)).unwrap();
        // First level is identical (1^-r == 1), second level differs
        assert_eq!(smooth.get(2, 2), rough.get(2, 2));
        assert!(smooth.get(1, 1).abs() < rough.get(1, 1).abs());
    }

    #[test]
    fn test_parallel_generation_is_reproducible() {
        let a = generate_parallel(2.0, 4, 3, 4, 99).unwrap();
        let b = generate_parallel(2.0, 4, 3, 4, 99).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.dimensions(), (size_after(4, 4).unwrap(), size_after(3, 4).unwrap()));

        let c = generate_parallel(2.0, 4, 3, 4, 100).unwrap();
        assert_ne!(a, c);
    }
}
