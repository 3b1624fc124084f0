//! Procedural planet terrain: fractal noise, crater and mountain stamps,
//! radial mesh displacement and radius-banded vertex colors.
//!
//! Everything here is a pure function of `(seed, PlanetGenConfig)`; the same
//! inputs always produce the same mesh.

mod banding;
mod deform;
mod fbm;
mod stamp;
mod surface_noise;

pub use banding::ColorBands;
pub use deform::{TerrainGenerator, TerrainStats, deform};
pub use fbm::FractalNoise;
pub use stamp::{StampSpec, random_unit_vector, sample_range, scatter_stamps, stamp_rng};
pub use surface_noise::SurfaceNoise;
