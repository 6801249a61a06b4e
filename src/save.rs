//! Saving rendered images under sequence-numbered file names.

use std::path::{Path, PathBuf};

use clap::ValueEnum;
use tracing::debug;

use crate::error::{LandscapeError, Result};
use crate::render::RasterImage;

/// Default save directory, relative to the home directory.
pub const SAVE_DIR: &str = "Landscape";

/// Supported output codecs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, ValueEnum)]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Tiff,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
            Self::Tiff => "tiff",
        }
    }

    fn codec(&self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Tiff => image::ImageFormat::Tiff,
        }
    }
}

impl std::fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Resolve and create the save directory.
///
/// Relative paths are taken under `$HOME` when it is set.
pub fn save_dir(dir: impl AsRef<Path>) -> Result<PathBuf> {
    let dir = dir.as_ref();
    let resolved = if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        match std::env::var_os("HOME") {
            Some(home) => PathBuf::from(home).join(dir),
            None => dir.to_path_buf(),
        }
    };

    if !resolved.exists() {
        std::fs::create_dir_all(&resolved).map_err(|source| LandscapeError::Io {
            path: resolved.clone(),
            source,
        })?;
        debug!(dir = %resolved.display(), "created save directory");
    }

    Ok(resolved)
}

/// First unused `prefix-NNN.ext` path in `dir`.
pub fn next_file_name(dir: &Path, prefix: &str, format: ImageFormat) -> PathBuf {
    (0u32..)
        .map(|id| dir.join(format!("{}-{:03}.{}", prefix, id, format.extension())))
        .find(|path| !path.exists())
        .unwrap_or_else(|| dir.join(format!("{}.{}", prefix, format.extension())))
}

/// Write `image` to the next free numbered file and return its path.
pub fn save(image: &RasterImage, format: ImageFormat, dir: &Path, prefix: &str) -> Result<PathBuf> {
    let file = next_file_name(dir, prefix, format);
    image
        .save_with_format(&file, format.codec())
        .map_err(|source| LandscapeError::Save { file: file.clone(), source })?;
    Ok(file)
}
