//! Clipped drawing primitives over an RGB pixel buffer.
//!
//! Pixels are sampled at their centres `(x + 0.5, y + 0.5)`. Every primitive
//! takes a [`Clip`] rectangle and never touches pixels outside it.

use image::{Rgb, RgbImage};

/// Half-open clip rectangle `[x0, x1) × [y0, y1)` in pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Clip {
    pub x0: i32,
    pub y0: i32,
    pub x1: i32,
    pub y1: i32,
}

impl Clip {
    /// Rectangle at `(x, y)` of size `width × height`. Negative sizes are empty.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x0: x, y0: y, x1: x + width, y1: y + height }
    }

    /// The whole image.
    pub fn canvas(image: &RgbImage) -> Self {
        Self::new(0, 0, image.width() as i32, image.height() as i32)
    }

    pub fn intersect(&self, other: Clip) -> Clip {
        Clip {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}

fn put_clipped(image: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>, clip: Clip) {
    if clip.contains(x, y) {
        image.put_pixel(x as u32, y as u32, color);
    }
}

/// Fill a closed polygon using the even-odd rule.
///
/// The last point connects back to the first.
pub fn fill_polygon(image: &mut RgbImage, points: &[(i32, i32)], color: Rgb<u8>, clip: Clip) {
    if points.len() < 3 {
        return;
    }
    let clip = clip.intersect(Clip::canvas(image));

    let min_y = points.iter().map(|p| p.1).min().unwrap_or(0);
    let max_y = points.iter().map(|p| p.1).max().unwrap_or(0);

    let mut crossings: Vec<f64> = Vec::with_capacity(points.len());
    for py in clip.y0.max(min_y)..clip.y1.min(max_y + 1) {
        let yc = py as f64 + 0.5;
        crossings.clear();

        for (k, &(ax, ay)) in points.iter().enumerate() {
            let (bx, by) = points[(k + 1) % points.len()];
            if ay == by {
                continue;
            }
            let (lo, hi) = if ay < by { (ay, by) } else { (by, ay) };
            if yc >= lo as f64 && yc < hi as f64 {
                let t = (yc - ay as f64) / (by - ay) as f64;
                crossings.push(ax as f64 + t * (bx - ax) as f64);
            }
        }

        crossings.sort_by(|a, b| a.total_cmp(b));
        for span in crossings.chunks_exact(2) {
            // Pixel centres inside [span[0], span[1])
            let start = ((span[0] - 0.5).ceil() as i32).max(clip.x0);
            let end = ((span[1] - 0.5).ceil() as i32).min(clip.x1);
            for px in start..end {
                image.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

/// Stroke an open polyline with a square pen `width` pixels wide.
pub fn draw_polyline(image: &mut RgbImage, points: &[(i32, i32)], color: Rgb<u8>, width: u32, clip: Clip) {
    let clip = clip.intersect(Clip::canvas(image));
    if clip.x0 >= clip.x1 || clip.y0 >= clip.y1 {
        return;
    }

    let width = width.max(1) as i32;
    let lo = -((width - 1) / 2);
    let hi = width / 2;
    let mut stamp = |x: i32, y: i32| {
        for dy in lo..=hi {
            for dx in lo..=hi {
                put_clipped(image, x + dx, y + dy, color, clip);
            }
        }
    };

    match points {
        [] => {}
        [only] => stamp(only.0, only.1),
        _ => {
            for segment in points.windows(2) {
                for (x, y) in bresenham_line(segment[0], segment[1]) {
                    stamp(x, y);
                }
            }
        }
    }
}

/// Fill a disc of `radius` centred at `(cx, cy)`.
pub fn fill_disc(image: &mut RgbImage, cx: f64, cy: f64, radius: f64, color: Rgb<u8>, clip: Clip) {
    let clip = clip.intersect(Clip::canvas(image));
    let r2 = radius * radius;

    let y_start = clip.y0.max((cy - radius).floor() as i32);
    let y_end = clip.y1.min((cy + radius).ceil() as i32 + 1);
    let x_start = clip.x0.max((cx - radius).floor() as i32);
    let x_end = clip.x1.min((cx + radius).ceil() as i32 + 1);

    for py in y_start..y_end {
        for px in x_start..x_end {
            let dx = px as f64 + 0.5 - cx;
            let dy = py as f64 + 0.5 - cy;
            if dx * dx + dy * dy <= r2 {
                image.put_pixel(px as u32, py as u32, color);
            }
        }
    }
}

/// Bresenham's line algorithm, both endpoints included.
fn bresenham_line(from: (i32, i32), to: (i32, i32)) -> Vec<(i32, i32)> {
    let (mut x, mut y) = from;
    let (x1, y1) = to;

    let dx = (x1 - x).abs();
    let dy = -(y1 - y).abs();
    let sx = if x < x1 { 1 } else { -1 };
    let sy = if y < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut path = Vec::with_capacity((dx - dy + 1) as usize);
    loop {
        path.push((x, y));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }

    path
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn count(image: &RgbImage, color: Rgb<u8>) -> usize {
        image.pixels().filter(|&&p| p == color).count()
    }

    #[test]
    fn test_fill_rectangle_covers_pixel_centres() {
        let mut image = RgbImage::from_pixel(10, 10, BLACK);
        let clip = Clip::canvas(&image);
        fill_polygon(&mut image, &[(2, 3), (6, 3), (6, 8), (2, 8)], WHITE, clip);

        assert_eq!(count(&image, WHITE), 4 * 5);
        assert_eq!(*image.get_pixel(2, 3), WHITE);
        assert_eq!(*image.get_pixel(5, 7), WHITE);
        assert_eq!(*image.get_pixel(6, 3), BLACK);
        assert_eq!(*image.get_pixel(2, 8), BLACK);
    }

    #[test]
    fn test_fill_respects_clip() {
        let mut image = RgbImage::from_pixel(10, 10, BLACK);
        fill_polygon(&mut image, &[(0, 0), (10, 0), (10, 10), (0, 10)], WHITE, Clip::new(0, 0, 10, 4));
        assert_eq!(count(&image, WHITE), 40);
        assert_eq!(*image.get_pixel(9, 3), WHITE);
        assert_eq!(*image.get_pixel(0, 4), BLACK);
    }

    #[test]
    fn test_polyline_includes_endpoints_and_clips() {
        let mut image = RgbImage::from_pixel(10, 10, BLACK);
        let clip = Clip::canvas(&image);
        draw_polyline(&mut image, &[(0, 0), (4, 0), (4, 4)], WHITE, 1, clip);
        assert_eq!(count(&image, WHITE), 9);
        assert_eq!(*image.get_pixel(4, 4), WHITE);

        let mut clipped = RgbImage::from_pixel(10, 10, BLACK);
        draw_polyline(&mut clipped, &[(0, 0), (4, 0), (4, 4)], WHITE, 1, Clip::new(0, 0, 10, 2));
        assert_eq!(count(&clipped, WHITE), 6);

        let mut empty = RgbImage::from_pixel(10, 10, BLACK);
        draw_polyline(&mut empty, &[(0, 0), (4, 0)], WHITE, 1, Clip::new(0, 0, 10, -3));
        assert_eq!(count(&empty, WHITE), 0);
    }

    #[test]
    fn test_wide_pen_thickens_line() {
        let mut image = RgbImage::from_pixel(10, 10, BLACK);
        let clip = Clip::canvas(&image);
        draw_polyline(&mut image, &[(1, 1), (5, 1)], WHITE, 2, clip);
        // Pen covers (x..=x+1, y..=y+1) at each of the five points
        assert_eq!(count(&image, WHITE), 6 * 2);
        assert_eq!(*image.get_pixel(3, 2), WHITE);
    }

    #[test]
    fn test_disc_clipped_to_box_fills_box() {
        let mut image = RgbImage::from_pixel(12, 12, BLACK);
        fill_disc(&mut image, 6.0, 6.0, 6.0, WHITE, Clip::new(4, 4, 4, 4));
        assert_eq!(count(&image, WHITE), 16);
        assert_eq!(*image.get_pixel(3, 4), BLACK);
    }

    #[test]
    fn test_bresenham_steep_line() {
        let path = bresenham_line((0, 0), (1, 3));
        assert_eq!(path.first(), Some(&(0, 0)));
        assert_eq!(path.last(), Some(&(1, 3)));
        assert_eq!(path.len(), 4);
    }
}
