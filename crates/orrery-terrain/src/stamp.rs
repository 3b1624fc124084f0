//! Angular craters and mountains added on top of the fractal height field.

use std::f32::consts::{FRAC_PI_2, TAU};

use glam::Vec3;
use orrery_config::StampConfig;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A localized angular displacement centered on a unit direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StampSpec {
    /// Unit direction of the stamp center.
    pub center: Vec3,
    /// Angular radius in degrees.
    pub radius_deg: f32,
    /// Signed height at the center; negative for craters.
    pub height: f32,
}

impl StampSpec {
    pub fn new(center: Vec3, radius_deg: f32, height: f32) -> Self {
        Self {
            center,
            radius_deg,
            height,
        }
    }

    /// A stamp is usable when its center is a unit vector, its radius is positive,
    /// and its height is finite.
    pub fn is_valid(&self) -> bool {
        self.center.is_finite()
            && (self.center.length_squared() - 1.0).abs() < 1e-3
            && self.radius_deg.is_finite()
            && self.radius_deg > 0.0
            && self.height.is_finite()
    }

    /// Angle in degrees between `dir` and the stamp center.
    pub fn angle_deg(&self, dir: Vec3) -> f32 {
        dir.dot(self.center).clamp(-1.0, 1.0).acos().to_degrees()
    }

    /// Cosine falloff from `height` at the center to zero at `radius_deg`.
    ///
    /// Invalid stamps contribute nothing.
    pub fn displacement(&self, dir: Vec3) -> f32 {
        if !self.is_valid() {
            return 0.0;
        }
        let angle = self.angle_deg(dir);
        if angle > self.radius_deg {
            return 0.0;
        }
        self.height * (angle / self.radius_deg * FRAC_PI_2).cos()
    }
}

/// RNG stream for stamp placement, kept apart from the noise seed.
pub fn stamp_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed.wrapping_mul(3).wrapping_add(17))
}

/// Draw craters then mountains for one planet.
///
/// Crater height is `-base_amp * crater_depth_mul`, mountain height
/// `base_amp * mountain_amp_mul`.
pub fn scatter_stamps(seed: u64, config: &StampConfig, base_amp: f32) -> Vec<StampSpec> {
    let mut rng = stamp_rng(seed);
    let mut stamps = Vec::with_capacity((config.crater_count + config.mountain_count) as usize);

    let crater_height = -base_amp * config.crater_depth_mul;
    for _ in 0..config.crater_count {
        let center = random_unit_vector(&mut rng);
        let radius = sample_range(&mut rng, config.crater_radius_deg);
        stamps.push(StampSpec::new(center, radius, crater_height));
    }

    let mountain_height = base_amp * config.mountain_amp_mul;
    for _ in 0..config.mountain_count {
        let center = random_unit_vector(&mut rng);
        let radius = sample_range(&mut rng, config.mountain_radius_deg);
        stamps.push(StampSpec::new(center, radius, mountain_height));
    }

    stamps
}

/// Uniform point on the unit sphere.
pub fn random_unit_vector<R: Rng>(rng: &mut R) -> Vec3 {
    let z: f32 = rng.random::<f32>() * 2.0 - 1.0;
    let phi: f32 = rng.random::<f32>() * TAU;
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Uniform sample from `[lo, hi]`; an inverted range yields `lo`.
pub fn sample_range<R: Rng>(rng: &mut R, (lo, hi): (f32, f32)) -> f32 {
    let t: f32 = rng.random();
    if hi > lo { lo + (hi - lo) * t } else { lo }
}
