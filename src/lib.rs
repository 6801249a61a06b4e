//! Fractal landscape generation library
//!
//! Pipeline: [`fractal::generate`] → [`gradient::differentiate`] →
//! [`filter::smooth`] → [`render::Renderer::image`] or
//! [`render::Renderer::plot`]. Every stage returns a new grid or image.

pub mod config;
pub mod error;
pub mod filter;
pub mod flyover;
pub mod fractal;
pub mod gradient;
pub mod render;
pub mod save;
pub mod seeds;
pub mod tilemap;
pub mod viewer;

pub use error::{LandscapeError, Result};
pub use render::{Palette, RasterImage, Renderer};
pub use tilemap::{GradientField, HeightField, Tilemap};
