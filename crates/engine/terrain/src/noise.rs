//! Coherent noise for the terrain height field
//!
//! The same function feeds vertex displacement and shading, so it must be
//! reproducible: identical seed and inputs always give identical output.

use ::noise::{NoiseFn, Perlin};

/// Seeded 3D Perlin gradient noise, output roughly in `[-1, 1]`
#[derive(Debug, Clone)]
pub struct TerrainNoise {
    perlin: Perlin,
}

impl TerrainNoise {
    pub fn new(seed: u32) -> Self {
        Self {
            perlin: Perlin::new(seed),
        }
    }

    /// Sample the noise field
    pub fn sample(&self, x: f32, y: f32, z: f32) -> f32 {
        self.perlin.get([x as f64, y as f64, z as f64]) as f32
    }
}

impl Default for TerrainNoise {
    fn default() -> Self {
        Self::new(0)
    }
}
