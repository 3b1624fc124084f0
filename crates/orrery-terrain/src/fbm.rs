//! Multi-octave fractal Brownian motion over [`SurfaceNoise`].

use glam::Vec3;
use orrery_config::NoiseConfig;

use crate::SurfaceNoise;

/// Sums `octaves` layers of projected noise at rising frequency and falling amplitude.
#[derive(Clone, Debug)]
pub struct FractalNoise {
    noise: SurfaceNoise,
    params: NoiseConfig,
}

impl FractalNoise {
    pub fn new(seed: u64, params: &NoiseConfig) -> Self {
        Self {
            noise: SurfaceNoise::new(seed),
            params: params.clone(),
        }
    }

    /// Height offset at direction `dir` (expected unit length).
    ///
    /// Zero octaves returns exactly zero.
    pub fn sample(&self, dir: Vec3) -> f32 {
        let mut total = 0.0;
        let mut amplitude = self.params.base_amp;
        let mut frequency = self.params.base_freq;

        for _ in 0..self.params.octaves {
            total += self.noise.sample_projected(dir * frequency) * amplitude;
            amplitude *= self.params.gain;
            frequency *= self.params.lacunarity;
        }

        if total.is_finite() { total } else { 0.0 }
    }

    /// Geometric sum of the layer amplitudes times the per-layer bound of 0.5.
    pub fn max_amplitude(&self) -> f32 {
        let mut sum = 0.0;
        let mut amplitude = self.params.base_amp.abs();
        for _ in 0..self.params.octaves {
            sum += amplitude * 0.5;
            amplitude *= self.params.gain.abs();
        }
        sum
    }

    pub fn params(&self) -> &NoiseConfig {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dirs() -> impl Iterator<Item = Vec3> {
        (0..50).map(|i| {
            let t = i as f32 * 0.41;
            Vec3::new(t.sin(), (t * 1.7).cos(), (t * 0.3).sin() + 0.1).normalize()
        })
    }

    #[test]
    fn test_single_octave_is_scaled_noise() {
        let params = NoiseConfig {
            octaves: 1,
            base_amp: 3.5,
            base_freq: 2.0,
            ..NoiseConfig::default()
        };
        let fbm = FractalNoise::new(42, &params);
        let raw = SurfaceNoise::new(42);
        for d in dirs() {
            let expected = raw.sample_projected(d * 2.0) * 3.5;
            assert!(
                (fbm.sample(d) - expected).abs() < 1e-6,
                "one octave should equal one scaled layer at {d:?}"
            );
        }
    }

    #[test]
    fn test_zero_octaves_is_flat() {
        let fbm = FractalNoise::new(9, &NoiseConfig::flat());
        assert!(dirs().all(|d| fbm.sample(d) == 0.0));
        assert_eq!(fbm.max_amplitude(), 0.0);
    }

    #[test]
    fn test_samples_within_max_amplitude() {
        let fbm = FractalNoise::new(5, &NoiseConfig::default());
        let bound = fbm.max_amplitude();
        assert!((bound - 0.875).abs() < 1e-6);
        for d in dirs() {
            assert!(fbm.sample(d).abs() <= bound + 1e-6);
        }
    }

    #[test]
    fn test_deterministic() {
        let a = FractalNoise::new(123, &NoiseConfig::default());
        let b = FractalNoise::new(123, &NoiseConfig::default());
        assert!(dirs().all(|d| a.sample(d) == b.sample(d)));
    }
}
