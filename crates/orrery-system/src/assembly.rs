//! Deterministic layout of a solar system from a seed.
//!
//! [`plan_system`] draws every random choice up front into a [`SystemPlan`];
//! [`SolarSystem::from_plan`](crate::SolarSystem::from_plan) then generates
//! planets and spawns entities without touching the RNG again.

use glam::Vec3;
use orrery_config::{Config, PlanetGenConfig, SystemConfig};
use orrery_mesh::Color;
use orrery_terrain::{random_unit_vector, sample_range};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{Orbit, SystemError};

/// Extra light reach past the outermost planet surface.
const LIGHT_RANGE_MARGIN: f32 = 50.0;
/// Planet radius range as a fraction of the star radius.
const PLANET_TO_STAR: (f32, f32) = (0.2, 0.8);
/// Size-ratio reference range for terrain tuning, as a fraction of the star radius.
const TUNING_RATIO: (f32, f32) = (0.1, 0.8);
/// Planets at or above this fraction of the star radius get few craters.
const LARGE_PLANET_RATIO: f32 = 0.2;
/// Player spawn shell, as multiples of the minimum orbit radius.
const SPAWN_SHELL: (f32, f32) = (1.5, 2.5);
/// Planet generation seeds are drawn below this bound.
const PLANET_SEED_RANGE: u64 = 1_000_000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StarPlan {
    pub radius: f32,
    pub intensity: f32,
    pub color: Color,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlanetPlan {
    pub index: usize,
    /// Terrain seed passed to generation.
    pub seed: u64,
    /// Generation settings with per-planet size, noise and colors applied.
    pub config: PlanetGenConfig,
    pub orbit: Orbit,
    pub start_phase_deg: f32,
}

/// Everything [`plan_system`] decided for one seed.
#[derive(Clone, Debug, PartialEq)]
pub struct SystemPlan {
    pub seed: u64,
    pub star: StarPlan,
    pub planets: Vec<PlanetPlan>,
    /// Player start; the player faces the star.
    pub player_spawn: Vec3,
    pub light_range: f32,
}

/// Lay out a star, its planets and the player spawn for `seed`.
pub fn plan_system(seed: u64, config: &Config) -> Result<SystemPlan, SystemError> {
    config.validate()?;
    let system = &config.system;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let star = plan_star(&mut rng, system);

    let (min_count, max_count) = system.planet_count;
    let count = rng.random_range(min_count..=max_count) as usize;

    let mut planets = Vec::with_capacity(count);
    let mut previous_orbit = 0.0;
    let mut farthest_surface: f32 = 0.0;
    for index in 0..count {
        let size_ratio = sample_range(&mut rng, PLANET_TO_STAR);
        let radius = star.radius * size_ratio;

        let orbit_radius = if index == 0 {
            let clearance = 2.0 * (star.radius + radius);
            sample_range(
                &mut rng,
                (
                    system.min_orbit_radius + clearance,
                    system.min_orbit_radius * 3.0 + clearance,
                ),
            )
        } else {
            let step = system.orbit_step + radius * 2.0;
            previous_orbit + sample_range(&mut rng, (step * 1.5, step * 3.0))
        };
        previous_orbit = orbit_radius;
        farthest_surface = farthest_surface.max(orbit_radius + radius);

        planets.push(plan_planet(
            &mut rng,
            config,
            index,
            star.radius,
            size_ratio,
            orbit_radius,
        ));
    }

    let spawn_distance = sample_range(
        &mut rng,
        (
            system.min_orbit_radius * SPAWN_SHELL.0,
            system.min_orbit_radius * SPAWN_SHELL.1,
        ),
    );
    let player_spawn = random_unit_vector(&mut rng) * spawn_distance;

    Ok(SystemPlan {
        seed,
        star,
        planets,
        player_spawn,
        light_range: farthest_surface + LIGHT_RANGE_MARGIN,
    })
}

fn plan_star<R: Rng>(rng: &mut R, system: &SystemConfig) -> StarPlan {
    let (min_radius, max_radius) = system.star_radius;
    let radius = sample_range(rng, system.star_radius);
    let t = inverse_lerp(min_radius, max_radius, radius);
    let (min_intensity, max_intensity) = system.star_intensity;

    // Warm white to pale yellow.
    let color = Color::from_hsv(
        sample_range(rng, (0.08, 0.16)),
        sample_range(rng, (0.0, 0.5)),
        1.0,
    );

    StarPlan {
        radius,
        intensity: lerp(min_intensity, max_intensity, t),
        color,
    }
}

fn plan_planet<R: Rng>(
    rng: &mut R,
    config: &Config,
    index: usize,
    star_radius: f32,
    size_ratio: f32,
    orbit_radius: f32,
) -> PlanetPlan {
    let system = &config.system;
    let radius = star_radius * size_ratio;
    let t = inverse_lerp(
        star_radius * TUNING_RATIO.0,
        star_radius * TUNING_RATIO.1,
        radius,
    );

    let mut planet = config.planet.clone();
    planet.radius = radius;
    planet.surface_gravity = lerp(4.0, 20.0, t);

    planet.bands.low_color = Color::from_hsv(
        rng.random(),
        sample_range(rng, (0.4, 1.0)),
        sample_range(rng, (0.2, 0.9)),
    )
    .to_array();
    planet.bands.high_color = Color::from_hsv(
        rng.random(),
        sample_range(rng, (0.8, 1.0)),
        sample_range(rng, (0.2, 0.9)),
    )
    .to_array();

    planet.noise.base_amp = lerp(5.0, 30.0, t);
    planet.noise.octaves = rng.random_range(1..=3);
    planet.noise.gain = sample_range(rng, (0.1, 0.3));

    planet.stamps.mountain_count = rng.random_range(1..=5);
    planet.stamps.crater_count = if size_ratio >= LARGE_PLANET_RATIO {
        rng.random_range(0..=3)
    } else {
        rng.random_range(1..=19)
    };

    let seed = rng.random_range(0..PLANET_SEED_RANGE);

    let inclination = sample_range(rng, (-system.max_inclination_deg, system.max_inclination_deg));
    let heading = sample_range(rng, (0.0, 360.0));
    let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let speed = direction * sample_range(rng, system.orbit_speed_deg);
    let start_phase_deg = sample_range(rng, (0.0, 360.0));
    let self_spin_deg = sample_range(rng, (-system.max_self_spin_deg, system.max_self_spin_deg));

    PlanetPlan {
        index,
        seed,
        config: planet,
        orbit: Orbit {
            center: Vec3::ZERO,
            axis: Orbit::tilted_axis(inclination, heading),
            radius: orbit_radius,
            speed_deg: speed,
            self_spin_deg,
        },
        start_phase_deg,
    }
}

fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Position of `value` in `[a, b]`, clamped to `[0, 1]`; 0 for an empty range.
fn inverse_lerp(a: f32, b: f32, value: f32) -> f32 {
    if (b - a).abs() <= f32::EPSILON {
        return 0.0;
    }
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}
