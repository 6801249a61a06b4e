use image::Rgb;
use minifb::{Key, Window, WindowOptions};

use crate::error::{LandscapeError, Result};
use crate::render::RasterImage;

/// Preview window that shows rendered frames scaled to fit.
pub struct Preview {
    window: Window,
    width: usize,
    height: usize,
    buffer: Vec<u32>,
}

impl Preview {
    pub fn open(title: &str, width: usize, height: usize) -> Result<Self> {
        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: false,
                scale: minifb::Scale::X1,
                ..WindowOptions::default()
            },
        )
        .map_err(|e| LandscapeError::Display(e.to_string()))?;

        // Limit to ~60fps
        window.set_target_fps(60);

        Ok(Self {
            window,
            width,
            height,
            buffer: vec![0; width * height],
        })
    }

    /// False once the window is closed or Escape is pressed.
    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// Clear to `background` and draw `image` scaled from the top-left corner.
    pub fn show(&mut self, image: &RasterImage, background: Rgb<u8>) -> Result<()> {
        let (iw, ih) = (image.width() as usize, image.height() as usize);
        let scale = fit_scale(self.width, self.height, iw, ih);
        let shown_w = ((iw as f32 * scale) as usize).min(self.width);
        let shown_h = ((ih as f32 * scale) as usize).min(self.height);

        self.buffer.fill(pack(background));
        for wy in 0..shown_h {
            let sy = ((wy as f32 / scale) as usize).min(ih - 1);
            for wx in 0..shown_w {
                let sx = ((wx as f32 / scale) as usize).min(iw - 1);
                self.buffer[wy * self.width + wx] = pack(*image.get_pixel(sx as u32, sy as u32));
            }
        }

        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)
            .map_err(|e| LandscapeError::Display(e.to_string()))
    }
}

/// Scale that fits an image into a window, preserving aspect ratio.
///
/// Matches the window width first, then shrinks if the height overflows.
pub fn fit_scale(window_w: usize, window_h: usize, image_w: usize, image_h: usize) -> f32 {
    if image_w == 0 || image_h == 0 {
        return 1.0;
    }
    let mut scale = window_w as f32 / image_w as f32;
    if (image_h as f32 * scale) as usize > window_h {
        scale *= window_h as f32 / (image_h as f32 * scale);
    }
    scale
}

/// Pack an RGB pixel as `0x00RRGGBB`.
fn pack(color: Rgb<u8>) -> u32 {
    let [r, g, b] = color.0;
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}
