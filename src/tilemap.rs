/// A rectangular 2D grid indexed by column `x` and row `y`.
///
/// Unlike a world map this grid never wraps: every stage of the landscape
/// pipeline treats the `x == 0` column and `y == 0` row as a hard boundary.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

/// Elevations produced by the generator or the smoothing filter.
pub type HeightField = Tilemap<f64>;

/// Scalar local-variation measure derived from a [`HeightField`].
pub type GradientField = Tilemap<f64>;

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Build a grid by evaluating `f(x, y)` for every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height, "cell ({x}, {y}) out of bounds");
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// `(width, height)` of the grid.
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over all cells with their coordinates, row by row.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % self.width;
            let y = idx / self.width;
            (x, y, val)
        })
    }
}

impl Tilemap<f64> {
    /// Minimum and maximum value, or `None` for an empty grid.
    pub fn range(&self) -> Option<(f64, f64)> {
        if self.data.is_empty() {
            return None;
        }
        let mut min_v = f64::MAX;
        let mut max_v = f64::MIN;
        for &v in &self.data {
            if v < min_v { min_v = v; }
            if v > max_v { max_v = v; }
        }
        Some((min_v, max_v))
    }
}
