//! Local-variation estimate used to gate smoothing and shade the relief map.

use tracing::debug;

use crate::tilemap::{GradientField, HeightField};

/// Derive the backward three-point difference of a height field.
///
/// For `x > 0 && y > 0` each cell holds the mean difference between its west,
/// north-west and north neighbours and itself. This is a signed roughness
/// measure, not a directional vector, and deliberately has no east or south
/// terms. Cells on the `x == 0` column or `y == 0` row are exactly zero.
pub fn differentiate(points: &HeightField) -> GradientField {
    let (width, height) = points.dimensions();
    debug!(width, height, "differentiating height field");

    GradientField::from_fn(width, height, |x, y| {
        if x == 0 || y == 0 {
            return 0.0;
        }
        let p = *points.get(x, y);
        ((*points.get(x - 1, y) - p) + (*points.get(x - 1, y - 1) - p) + (*points.get(x, y - 1) - p)) / 3.0
    })
}
