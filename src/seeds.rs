//! Seed management for landscape generation
//!
//! A single master seed is split into independent seeds for each consumer of
//! randomness, so changing how many draws one stage makes (for example turning
//! jitter off) does not reshape the terrain itself.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Seeds for every source of randomness in a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LandscapeSeeds {
    /// Master seed (used for display/reference)
    pub master: u64,
    /// Midpoint displacement offsets
    pub terrain: u64,
    /// Silhouette jitter
    pub render: u64,
    /// Scene choices: default roughness and water level
    pub scene: u64,
    /// Colour mode palettes
    pub palette: u64,
}

impl LandscapeSeeds {
    /// Derive all sub-seeds deterministically from a master seed.
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            terrain: derive_seed(master, "terrain"),
            render: derive_seed(master, "render"),
            scene: derive_seed(master, "scene"),
            palette: derive_seed(master, "palette"),
        }
    }
}

impl Default for LandscapeSeeds {
    fn default() -> Self {
        Self::from_master(rand::random())
    }
}

/// Derive a sub-seed from a master seed and a stage name.
fn derive_seed(master: u64, stage: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    stage.hash(&mut hasher);
    hasher.finish()
}

impl std::fmt::Display for LandscapeSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "LandscapeSeeds {{ master: {}, terrain: {}, render: {}, scene: {}, palette: {} }}",
            self.master, self.terrain, self.render, self.scene, self.palette,
        )
    }
}
