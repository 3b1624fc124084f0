//! Planet geometry orchestration: icosphere, terrain, collider data, atmosphere.

use orrery_config::PlanetGenConfig;
use orrery_mesh::{IcoSphere, Mesh};
use orrery_physics::{ColliderShape, CollisionLayers, SurfaceInfo};
use orrery_terrain::TerrainGenerator;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::info;

use crate::{AtmosphereShell, PlanetError};

/// Output of one successful generation, committed all at once.
#[derive(Clone, Debug)]
struct Generated {
    seed: u64,
    mesh: Mesh,
    outer_radius: f32,
    min_radius: f32,
    atmosphere: AtmosphereShell,
}

/// A procedurally generated planet.
///
/// `outer_radius` is the largest vertex distance of the generated mesh and
/// only changes through a full [`PlanetBody::generate`].
#[derive(Clone, Debug)]
pub struct PlanetBody {
    config: PlanetGenConfig,
    generated: Option<Generated>,
}

impl PlanetBody {
    pub fn new(config: PlanetGenConfig) -> Self {
        Self {
            config,
            generated: None,
        }
    }

    /// Build the mesh, deform it and create the atmosphere shell.
    ///
    /// On error the previous geometry is left untouched.
    pub fn generate(&mut self, seed: u64) -> Result<(), PlanetError> {
        let level = self.config.recursion_level;
        let mut mesh = IcoSphere::build(level, self.config.radius)?;
        mesh.name = format!("Planet_{seed}");

        let stats = TerrainGenerator::new(seed, &self.config).deform(&mut mesh);

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let atmosphere = AtmosphereShell::build(stats.outer_radius, level, &mut rng)?;

        info!(
            seed,
            level,
            vertices = mesh.vertex_count(),
            outer_radius = stats.outer_radius,
            min_radius = stats.min_radius,
            "Generated planet"
        );

        self.generated = Some(Generated {
            seed,
            mesh,
            outer_radius: stats.outer_radius,
            min_radius: stats.min_radius,
            atmosphere,
        });
        Ok(())
    }

    /// Swap generation parameters and regenerate from scratch.
    ///
    /// The old config is restored if generation fails.
    pub fn regenerate_with(&mut self, config: PlanetGenConfig, seed: u64) -> Result<(), PlanetError> {
        let previous = std::mem::replace(&mut self.config, config);
        let result = self.generate(seed);
        if result.is_err() {
            self.config = previous;
        }
        result
    }

    pub fn config(&self) -> &PlanetGenConfig {
        &self.config
    }

    pub fn is_generated(&self) -> bool {
        self.generated.is_some()
    }

    pub fn seed(&self) -> Option<u64> {
        self.generated.as_ref().map(|g| g.seed)
    }

    /// Largest vertex distance from the center; 0 before generation.
    pub fn outer_radius(&self) -> f32 {
        self.generated.as_ref().map_or(0.0, |g| g.outer_radius)
    }

    /// Smallest vertex distance from the center; 0 before generation.
    pub fn min_radius(&self) -> f32 {
        self.generated.as_ref().map_or(0.0, |g| g.min_radius)
    }

    pub fn surface_gravity(&self) -> f32 {
        self.config.surface_gravity
    }

    pub fn layer(&self) -> CollisionLayers {
        CollisionLayers::PLANET
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        self.generated.as_ref().map(|g| &g.mesh)
    }

    pub fn atmosphere(&self) -> Option<&AtmosphereShell> {
        self.generated.as_ref().map(|g| &g.atmosphere)
    }

    /// Companion data locomotion needs for capture; `None` until generated.
    pub fn surface_info(&self) -> Option<SurfaceInfo> {
        self.generated.as_ref().map(|g| SurfaceInfo {
            outer_radius: g.outer_radius,
            surface_gravity: self.config.surface_gravity,
        })
    }

    pub fn collider_shape(&self) -> Option<ColliderShape> {
        self.mesh().map(ColliderShape::from_mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_config::{NoiseConfig, StampConfig};
    use orrery_mesh::{Color, MeshError};

    fn sphere_config() -> PlanetGenConfig {
        PlanetGenConfig {
            recursion_level: 2,
            radius: 5.0,
            noise: NoiseConfig::flat(),
            stamps: StampConfig::default(),
            ..PlanetGenConfig::default()
        }
    }

    #[test]
    fn test_seed_42_flat_planet_is_perfect_sphere() {
        let mut planet = PlanetBody::new(sphere_config());
        planet.generate(42).unwrap();

        assert!((planet.outer_radius() - 5.0).abs() < 1e-4, "outer radius {}", planet.outer_radius());
        let mesh = planet.mesh().unwrap();
        assert_eq!(mesh.vertex_count(), 162);
        assert!(mesh.colors.iter().all(|c| *c == Color::GREEN), "expected uniform low band");
        assert_eq!(planet.layer(), CollisionLayers::PLANET);
    }

    #[test]
    fn test_outer_radius_matches_generated_mesh() {
        let mut planet = PlanetBody::new(PlanetGenConfig {
            stamps: StampConfig {
                crater_count: 3,
                mountain_count: 3,
                ..StampConfig::default()
            },
            ..PlanetGenConfig::default()
        });
        planet.generate(9).unwrap();
        let max = planet
            .mesh()
            .unwrap()
            .positions
            .iter()
            .map(|p| p.length())
            .fold(0.0, f32::max);
        assert_eq!(planet.outer_radius(), max);
        assert_ne!(planet.outer_radius(), planet.config().radius);
    }

    #[test]
    fn test_atmosphere_follows_outer_radius() {
        let mut planet = PlanetBody::new(sphere_config());
        planet.generate(1).unwrap();
        let shell = planet.atmosphere().unwrap();
        assert!((shell.params.atmosphere_radius - planet.outer_radius() * 1.02).abs() < 1e-4);
        assert_eq!(shell.params.planet_radius, planet.outer_radius());
    }

    #[test]
    fn test_ungenerated_planet_has_no_surface_info() {
        let planet = PlanetBody::new(sphere_config());
        assert!(!planet.is_generated());
        assert!(planet.surface_info().is_none());
        assert!(planet.collider_shape().is_none());
        assert_eq!(planet.outer_radius(), 0.0);
    }

    #[test]
    fn test_invalid_config_keeps_previous_geometry() {
        let mut planet = PlanetBody::new(sphere_config());
        planet.generate(42).unwrap();

        let bad = PlanetGenConfig {
            radius: -1.0,
            ..sphere_config()
        };
        let err = planet.regenerate_with(bad, 7).unwrap_err();
        assert!(matches!(err, PlanetError::Mesh(MeshError::InvalidRadius(_))));
        assert_eq!(planet.seed(), Some(42));
        assert_eq!(planet.config().radius, 5.0);
        assert!((planet.outer_radius() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_regenerate_replaces_outer_radius() {
        let mut planet = PlanetBody::new(sphere_config());
        planet.generate(42).unwrap();

        let rough = PlanetGenConfig {
            noise: NoiseConfig {
                octaves: 3,
                base_amp: 2.0,
                ..NoiseConfig::default()
            },
            ..sphere_config()
        };
        planet.regenerate_with(rough, 42).unwrap();
        assert!(planet.outer_radius() > 5.0);
        assert_eq!(planet.surface_info().unwrap().outer_radius, planet.outer_radius());
    }

    #[test]
    fn test_same_seed_same_planet() {
        let mut a = PlanetBody::new(PlanetGenConfig::default());
        let mut b = PlanetBody::new(PlanetGenConfig::default());
        a.generate(5).unwrap();
        b.generate(5).unwrap();
        assert_eq!(a.mesh().unwrap().positions, b.mesh().unwrap().positions);
        assert_eq!(a.atmosphere().unwrap().params, b.atmosphere().unwrap().params);
    }
}
