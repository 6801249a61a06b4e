//! Error type shared by the landscape pipeline and its file collaborators.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LandscapeError {
    /// A caller-supplied value would make the computation degenerate.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Two grids that must share a shape do not.
    #[error("Grid dimensions {found:?} do not match expected {expected:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// Writing an image failed. Always fatal for the caller.
    #[error("Failed to write image {}: {source}", file.display())]
    Save {
        file: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The preview window could not be opened or updated.
    #[error("Display error: {0}")]
    Display(String),

    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, LandscapeError>;

/// Fail with [`LandscapeError::DimensionMismatch`] unless both shapes agree.
pub(crate) fn ensure_same_shape(expected: (usize, usize), found: (usize, usize)) -> Result<()> {
    if expected == found {
        Ok(())
    } else {
        Err(LandscapeError::DimensionMismatch { expected, found })
    }
}
