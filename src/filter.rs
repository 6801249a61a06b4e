//! Gradient-gated low-pass smoothing.

use tracing::debug;

use crate::error::{ensure_same_shape, Result};
use crate::tilemap::{GradientField, HeightField};

/// Gradient values are compared against the threshold at this scale.
pub const GRADIENT_SCALE: f64 = 100.0;

/// Smooth `points` where the local variation is below `threshold`.
///
/// Runs `iterations + 1` passes, so even `iterations == 0` filters once. Each
/// pass replaces a gated cell with the mean of its west, north-west, north
/// and own values from the previous pass. The gate always uses the original
/// `gradient` and is never recomputed between passes. Cells on the `x == 0`
/// column or `y == 0` row are left unchanged.
pub fn smooth(
    points: &HeightField,
    gradient: &GradientField,
    threshold: f64,
    iterations: usize,
) -> Result<HeightField> {
    ensure_same_shape(points.dimensions(), gradient.dimensions())?;

    let gated = gradient
        .iter()
        .filter(|&(x, y, &g)| x > 0 && y > 0 && passes_gate(g, threshold))
        .count();
    debug!(passes = iterations + 1, threshold, gated, "smoothing height field");

    let mut smoothed = points.clone();
    for _ in 0..=iterations {
        smoothed = filter_pass(&smoothed, gradient, threshold);
    }

    Ok(smoothed)
}

/// True when a cell with gradient `g` is calm enough to be smoothed.
pub fn passes_gate(g: f64, threshold: f64) -> bool {
    (g * GRADIENT_SCALE).abs() < threshold
}

fn filter_pass(points: &HeightField, gradient: &GradientField, threshold: f64) -> HeightField {
    HeightField::from_fn(points.width, points.height, |x, y| {
        let p = *points.get(x, y);
        if x == 0 || y == 0 || !passes_gate(*gradient.get(x, y), threshold) {
            return p;
        }
        (*points.get(x - 1, y) + *points.get(x - 1, y - 1) + *points.get(x, y - 1) + p) / 4.0
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LandscapeError;
    use crate::{fractal, gradient::differentiate};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn sample_points() -> HeightField {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        fractal::generate(2.0, 4, 3, 3, &mut rng).unwrap()
    }

    #[test]
    fn test_zero_threshold_never_smooths() {
        let points = sample_points();
        let gradient = differentiate(&points);
        for n in 0..4 {
            assert_eq!(smooth(&points, &gradient, 0.0, n).unwrap(), points);
        }
    }

    #[test]
    fn test_zero_iterations_runs_one_pass() {
        let mut points = HeightField::new_with(3, 3, 0.0);
        points.set(1, 1, 4.0);
        points.set(2, 2, 8.0);
        // Gate every interior cell open
        let gradient = GradientField::new_with(3, 3, 0.0);

        let smoothed = smooth(&points, &gradient, 1.0, 0).unwrap();

        // Single pass by hand, reading the unfiltered grid
        assert_eq!(*smoothed.get(1, 1), (0.0 + 0.0 + 0.0 + 4.0) / 4.0);
        assert_eq!(*smoothed.get(2, 1), (4.0 + 0.0 + 0.0 + 0.0) / 4.0);
        assert_eq!(*smoothed.get(1, 2), (0.0 + 0.0 + 4.0 + 0.0) / 4.0);
        assert_eq!(*smoothed.get(2, 2), (0.0 + 4.0 + 0.0 + 8.0) / 4.0);
        // Boundary untouched
        assert_eq!(*smoothed.get(0, 0), 0.0);
        assert_eq!(*smoothed.get(2, 0), 0.0);
    }

    #[test]
    fn test_each_iteration_adds_a_pass() {
        let mut points = HeightField::new_with(3, 3, 0.0);
        points.set(2, 2, 16.0);
        let gradient = GradientField::new_with(3, 3, 0.0);

        let once = smooth(&points, &gradient, 1.0, 0).unwrap();
        let twice = smooth(&points, &gradient, 1.0, 1).unwrap();
        assert_eq!(*once.get(2, 2), 4.0);
        assert_eq!(*twice.get(2, 2), 1.0);
    }

    #[test]
    fn test_gate_uses_original_gradient() {
        let mut points = HeightField::new_with(3, 3, 0.0);
        points.set(1, 1, 8.0);
        points.set(2, 1, 8.0);
        // Cell (1, 1) is closed, cell (2, 1) is open, regardless of how heights evolve
        let mut gradient = GradientField::new_with(3, 3, 0.0);
        gradient.set(1, 1, 0.5);

        let smoothed = smooth(&points, &gradient, 10.0, 3).unwrap();
        assert_eq!(*smoothed.get(1, 1), 8.0);
        // (2, 1) averages with constant neighbours 8, 0, 0 each pass
        let mut expected = 8.0;
        for _ in 0..4 {
            expected = (8.0 + 0.0 + 0.0 + expected) / 4.0;
        }
        assert_eq!(*smoothed.get(2, 1), expected);
    }

    #[test]
    fn test_mismatched_gradient_is_rejected() {
        let points = HeightField::new_with(3, 3, 0.0);
        let gradient = GradientField::new_with(3, 4, 0.0);
        assert!(matches!(
            smooth(&points, &gradient, 1.0, 0),
            Err(LandscapeError::DimensionMismatch { expected: (3, 3), found: (3, 4) })
        ));
    }
}
