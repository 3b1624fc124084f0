//! Seeded 2D noise sampled on three axis-plane projections of a direction.

use glam::Vec3;
use noise::{NoiseFn, Perlin};

/// Coordinate offsets for the (x,y), (y,z) and (z,x) projections.
///
/// Keeps the three lookups off each other's lattice so they decorrelate.
const PROJECTION_OFFSETS: [f64; 3] = [0.0, 17.3, 41.7];

/// Pure function of (coordinate, seed), with output in `[0, 1]`.
#[derive(Clone, Debug)]
pub struct SurfaceNoise {
    perlin: Perlin,
    seed: u64,
}

impl SurfaceNoise {
    pub fn new(seed: u64) -> Self {
        // Fold the high word in so seeds differing only above bit 32 still differ.
        let folded = (seed ^ (seed >> 32)) as u32;
        Self {
            perlin: Perlin::new(folded),
            seed,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Single 2D lookup remapped from `[-1, 1]` to `[0, 1]`.
    pub fn sample_2d(&self, x: f64, y: f64) -> f32 {
        let raw = self.perlin.get([x, y]);
        ((raw * 0.5 + 0.5) as f32).clamp(0.0, 1.0)
    }

    /// Mean of the three projected lookups of `p`, recentered to zero mean.
    ///
    /// Output lies in `[-0.5, 0.5]`.
    pub fn sample_projected(&self, p: Vec3) -> f32 {
        let (x, y, z) = (p.x as f64, p.y as f64, p.z as f64);
        let [oxy, oyz, ozx] = PROJECTION_OFFSETS;
        let sum = self.sample_2d(x + oxy, y + oxy)
            + self.sample_2d(y + oyz, z + oyz)
            + self.sample_2d(z + ozx, x + ozx);
        sum / 3.0 - 0.5
    }
}
