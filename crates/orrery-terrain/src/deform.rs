//! Radial displacement of a sphere mesh and the resulting color banding.

use glam::Vec3;
use orrery_config::PlanetGenConfig;
use orrery_mesh::Mesh;
use tracing::{debug, warn};

use crate::{ColorBands, FractalNoise, StampSpec, scatter_stamps};

/// Radius extremes measured on the displaced mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainStats {
    /// Largest vertex magnitude; the authoritative collision/capture radius.
    pub outer_radius: f32,
    pub min_radius: f32,
}

/// Height field for one planet: fractal noise plus stamps over a base radius.
#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    base_radius: f32,
    fbm: FractalNoise,
    stamps: Vec<StampSpec>,
    bands: ColorBands,
}

impl TerrainGenerator {
    pub fn new(seed: u64, config: &PlanetGenConfig) -> Self {
        let stamps = scatter_stamps(seed, &config.stamps, config.noise.base_amp);
        Self::with_stamps(seed, config, stamps)
    }

    /// Use an explicit stamp list instead of scattering one from the seed.
    ///
    /// Invalid stamps are dropped here with a warning so they cost nothing per vertex.
    pub fn with_stamps(seed: u64, config: &PlanetGenConfig, stamps: Vec<StampSpec>) -> Self {
        let stamps = stamps
            .into_iter()
            .filter(|stamp| {
                let ok = stamp.is_valid();
                if !ok {
                    warn!(?stamp, "skipping invalid terrain stamp");
                }
                ok
            })
            .collect();

        Self {
            base_radius: config.radius,
            fbm: FractalNoise::new(seed, &config.noise),
            stamps,
            bands: ColorBands::from_config(&config.bands),
        }
    }

    pub fn stamps(&self) -> &[StampSpec] {
        &self.stamps
    }

    /// Signed height above the base radius at unit direction `dir`.
    pub fn height_at(&self, dir: Vec3) -> f32 {
        let noise = self.fbm.sample(dir);
        let stamps: f32 = self.stamps.iter().map(|s| s.displacement(dir)).sum();
        noise + stamps
    }

    /// Displace every vertex radially and paint the color bands.
    ///
    /// Vertex positions are treated as directions; a zero-length vertex keeps +Y.
    pub fn deform(&self, mesh: &mut Mesh) -> TerrainStats {
        let mut max_r = 0.0_f32;
        let mut min_r = f32::MAX;

        for p in &mut mesh.positions {
            let dir = p.try_normalize().unwrap_or(Vec3::Y);
            *p = dir * (self.base_radius + self.height_at(dir));
            let r = p.length();
            max_r = max_r.max(r);
            min_r = min_r.min(r);
        }

        if mesh.positions.is_empty() {
            min_r = 0.0;
        }

        mesh.recalculate_normals();
        mesh.recalculate_bounds();

        mesh.colors = mesh
            .positions
            .iter()
            .map(|p| self.bands.color_at(ColorBands::normalize(p.length(), min_r, max_r)))
            .collect();

        debug!(
            vertices = mesh.positions.len(),
            stamps = self.stamps.len(),
            outer_radius = max_r,
            min_radius = min_r,
            "deformed terrain"
        );

        TerrainStats {
            outer_radius: max_r,
            min_radius: min_r,
        }
    }
}

/// One-shot deform with seed-derived stamps.
pub fn deform(mesh: &mut Mesh, seed: u64, config: &PlanetGenConfig) -> TerrainStats {
    TerrainGenerator::new(seed, config).deform(mesh)
}
