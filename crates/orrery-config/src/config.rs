//! Configuration structs with sensible defaults and RON persistence.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Deepest icosphere subdivision accepted by mesh generation.
///
/// Level 7 already yields 163 842 vertices per planet.
pub const MAX_RECURSION_LEVEL: u32 = 7;

/// File name inside the config directory.
const CONFIG_FILE: &str = "config.ron";

/// Top-level simulation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Default planet generation settings.
    pub planet: PlanetGenConfig,
    /// Planet-relative locomotion tuning.
    pub locomotion: LocomotionConfig,
    /// Free-flight tuning.
    pub free_flight: FreeFlightConfig,
    /// Solar system assembly ranges.
    pub system: SystemConfig,
    /// Host loop timing.
    pub sim: SimConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Shape, terrain and coloring parameters for one planet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PlanetGenConfig {
    /// Icosphere subdivision level (0 = bare icosahedron).
    pub recursion_level: u32,
    /// Nominal radius before terrain displacement.
    pub radius: f32,
    /// Gravity acceleration applied to walking players, in m/s².
    pub surface_gravity: f32,
    /// Fractal noise settings.
    pub noise: NoiseConfig,
    /// Crater and mountain stamp settings.
    pub stamps: StampConfig,
    /// Vertex color banding.
    pub bands: BandConfig,
}

/// Fractal Brownian motion parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NoiseConfig {
    /// Number of layers. Zero disables noise entirely.
    pub octaves: u32,
    /// Amplitude of the first layer.
    pub base_amp: f32,
    /// Frequency of the first layer.
    pub base_freq: f32,
    /// Frequency multiplier between layers.
    pub lacunarity: f32,
    /// Amplitude multiplier between layers.
    pub gain: f32,
}

/// Randomly scattered craters and mountains.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StampConfig {
    pub crater_count: u32,
    pub mountain_count: u32,
    /// Crater angular radius range in degrees.
    pub crater_radius_deg: (f32, f32),
    /// Mountain angular radius range in degrees.
    pub mountain_radius_deg: (f32, f32),
    /// Mountain height is this times `base_amp`.
    pub mountain_amp_mul: f32,
    /// Crater depth is this times `base_amp`.
    pub crater_depth_mul: f32,
}

/// Three-band vertex coloring by normalized radius.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct BandConfig {
    /// Cutoff between the low and mid bands, in [0, 1].
    pub cut_low_mid: f32,
    /// Cutoff between the mid and high bands, in [0, 1].
    pub cut_mid_high: f32,
    /// Largest allowed half-width of a blend zone.
    pub max_blend_half_width: f32,
    /// Scales `max_blend_half_width`; values at or below zero give hard edges.
    pub blend_softness: f32,
    /// Linear RGBA.
    pub low_color: [f32; 4],
    pub mid_color: [f32; 4],
    pub high_color: [f32; 4],
}

/// Tuning for planet-relative flight and walking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LocomotionConfig {
    pub walk_speed: f32,
    /// Tangent-plane speed while flying near a planet.
    pub hover_speed: f32,
    /// Ascend/descend speed while flying near a planet.
    pub radial_speed: f32,
    pub jump_speed: f32,
    /// Degrees of rotation per unit of look input.
    pub look_sensitivity: f32,
    /// Target gap between the foot probe and the terrain.
    pub surface_clearance: f32,
    /// Steepest ground, in degrees from local up, that can be walked up.
    pub max_walk_slope_deg: f32,
    /// How far ahead the walk probe looks for walls.
    pub wall_check_ahead: f32,
    /// Maximum upward correction speed when snapping to the surface.
    pub ground_snap_speed: f32,
    /// Radius of the downward surface probe.
    pub foot_radius: f32,
    /// How far above the player the flight probe starts.
    pub flight_probe_lift: f32,
    /// Rate at which body up re-aligns to radial up (per second).
    pub up_alignment_rate: f32,
}

/// Tuning for inertial free flight between planets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FreeFlightConfig {
    pub max_speed: f32,
    pub accel_rate: f32,
    pub decel_rate: f32,
    /// Degrees of rotation per unit of look input.
    pub look_sensitivity: f32,
    /// Radius of the proximity query used by the capture test.
    pub capture_search_radius: f32,
}

/// Ranges used when assembling a random solar system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SystemConfig {
    pub star_radius: (f32, f32),
    pub star_intensity: (f32, f32),
    /// Inclusive planet count range.
    pub planet_count: (u32, u32),
    pub min_orbit_radius: f32,
    pub orbit_step: f32,
    /// Maximum orbital plane tilt in degrees.
    pub max_inclination_deg: f32,
    /// Orbital angular speed range in degrees per second.
    pub orbit_speed_deg: (f32, f32),
    /// Maximum absolute self spin in degrees per second.
    pub max_self_spin_deg: f32,
}

/// Host loop timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimConfig {
    /// Physics-rate timestep in seconds.
    pub fixed_dt: f64,
    /// Render-rate delta fed by the headless runner, in seconds.
    pub frame_dt: f64,
    /// Upper bound on fixed steps per frame.
    pub max_fixed_steps: u32,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level override (e.g., "debug", "info", "warn").
    pub log_level: String,
    /// Write JSON logs next to the config file in debug builds.
    pub json_log_file: bool,
}

// --- Default implementations ---

impl Default for PlanetGenConfig {
    fn default() -> Self {
        Self {
            recursion_level: 3,
            radius: 5.0,
            surface_gravity: 12.0,
            noise: NoiseConfig::default(),
            stamps: StampConfig::default(),
            bands: BandConfig::default(),
        }
    }
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            octaves: 3,
            base_amp: 1.0,
            base_freq: 1.0,
            lacunarity: 2.0,
            gain: 0.5,
        }
    }
}

impl NoiseConfig {
    /// Noise settings that leave the sphere untouched.
    pub fn flat() -> Self {
        Self {
            octaves: 0,
            ..Self::default()
        }
    }
}

impl Default for StampConfig {
    fn default() -> Self {
        Self {
            crater_count: 0,
            mountain_count: 0,
            crater_radius_deg: (5.0, 15.0),
            mountain_radius_deg: (10.0, 20.0),
            mountain_amp_mul: 2.0,
            crater_depth_mul: 1.0,
        }
    }
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            cut_low_mid: 0.35,
            cut_mid_high: 0.65,
            max_blend_half_width: 0.15,
            blend_softness: 1.0,
            low_color: [0.0, 1.0, 0.0, 1.0],
            mid_color: [0.5, 0.5, 0.5, 1.0],
            high_color: [1.0, 0.92, 0.016, 1.0],
        }
    }
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            walk_speed: 6.0,
            hover_speed: 12.0,
            radial_speed: 25.0,
            jump_speed: 8.0,
            look_sensitivity: 2.0,
            surface_clearance: 0.3,
            max_walk_slope_deg: 50.0,
            wall_check_ahead: 2.0,
            ground_snap_speed: 10.0,
            foot_radius: 0.7,
            flight_probe_lift: 5.0,
            up_alignment_rate: 10.0,
        }
    }
}

impl Default for FreeFlightConfig {
    fn default() -> Self {
        Self {
            max_speed: 240.0,
            accel_rate: 60.0,
            decel_rate: 120.0,
            look_sensitivity: 2.0,
            capture_search_radius: 10_000.0,
        }
    }
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            star_radius: (50.0, 300.0),
            star_intensity: (800_000.0, 1_000_000.0),
            planet_count: (1, 9),
            min_orbit_radius: 300.0,
            orbit_step: 400.0,
            max_inclination_deg: 30.0,
            orbit_speed_deg: (0.1, 0.3),
            max_self_spin_deg: 0.6,
        }
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            fixed_dt: 1.0 / 60.0,
            frame_dt: 1.0 / 60.0,
            max_fixed_steps: 10,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_log_file: false,
        }
    }
}

// --- Validation ---

impl PlanetGenConfig {
    /// Reject settings that mesh generation cannot honor.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(ConfigError::invalid(
                "planet.radius",
                format!("must be positive, got {}", self.radius),
            ));
        }
        if self.recursion_level > MAX_RECURSION_LEVEL {
            return Err(ConfigError::invalid(
                "planet.recursion_level",
                format!("{} exceeds maximum {MAX_RECURSION_LEVEL}", self.recursion_level),
            ));
        }
        check_range("planet.stamps.crater_radius_deg", self.stamps.crater_radius_deg)?;
        check_range("planet.stamps.mountain_radius_deg", self.stamps.mountain_radius_deg)?;
        if self.bands.cut_low_mid > self.bands.cut_mid_high {
            return Err(ConfigError::invalid(
                "planet.bands",
                format!(
                    "cutoffs out of order: {} > {}",
                    self.bands.cut_low_mid, self.bands.cut_mid_high
                ),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Validate every section that has hard constraints.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.planet.validate()?;
        check_range("system.star_radius", self.system.star_radius)?;
        check_range("system.orbit_speed_deg", self.system.orbit_speed_deg)?;
        let (lo, hi) = self.system.planet_count;
        if lo == 0 || lo > hi {
            return Err(ConfigError::invalid(
                "system.planet_count",
                format!("range ({lo}, {hi}) is empty"),
            ));
        }
        if !(self.sim.fixed_dt > 0.0) {
            return Err(ConfigError::invalid(
                "sim.fixed_dt",
                format!("must be positive, got {}", self.sim.fixed_dt),
            ));
        }
        Ok(())
    }
}

fn check_range(field: &'static str, (lo, hi): (f32, f32)) -> Result<(), ConfigError> {
    if lo.is_finite() && hi.is_finite() && lo <= hi {
        Ok(())
    } else {
        Err(ConfigError::invalid(
            field,
            format!("range ({lo}, {hi}) is inverted or not finite"),
        ))
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let config = read_config(&config_path)?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(|source| ConfigError::Write {
            path: config_dir.to_path_buf(),
            source,
        })?;

        let config_path = config_dir.join(CONFIG_FILE);
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized = ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::Serialize)?;

        std::fs::write(&config_path, serialized).map_err(|source| ConfigError::Write {
            path: config_path,
            source,
        })
    }

    /// Re-read `config.ron`; `Some` only when it differs from `self`.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = read_config(&config_dir.join(CONFIG_FILE))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    /// Platform config directory (`~/.config/orrery` on Linux).
    pub fn default_dir() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|dir| dir.join("orrery"))
    }
}

fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    ron::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(!ron_str.is_empty());
        assert!(ron_str.contains("recursion_level: 3"));
        assert!(ron_str.contains("walk_speed: 6.0"));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let ron_str = ron::to_string(&config).unwrap();
        let deserialized: Config = ron::from_str(&ron_str).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(planet: (), debug: ())";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.locomotion, LocomotionConfig::default());
        assert_eq!(config.free_flight, FreeFlightConfig::default());
    }

    #[test]
    fn test_missing_nested_field_uses_default() {
        let ron_str = "(planet: (radius: 40.0, noise: (octaves: 5)))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert_eq!(config.planet.radius, 40.0);
        assert_eq!(config.planet.noise.octaves, 5);
        assert_eq!(config.planet.noise.lacunarity, 2.0);
        assert_eq!(config.planet.recursion_level, 3);
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(future_setting: true)");
        assert!(result.is_ok());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.planet.radius = 80.0;
        config.locomotion.jump_speed = 11.0;

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_or_create_writes_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.planet.noise.gain = 0.25;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert_eq!(result.unwrap().planet.noise.gain, 0.25);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_file_reports_its_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.ron"), "{{not valid}}").unwrap();
        match Config::load_or_create(dir.path()) {
            Err(ConfigError::Parse { path, .. }) => assert!(path.ends_with("config.ron")),
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_negative_radius_rejected() {
        let mut config = Config::default();
        config.planet.radius = -1.0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.field(), Some("planet.radius"));
    }

    #[test]
    fn test_excessive_recursion_rejected() {
        let planet = PlanetGenConfig {
            recursion_level: MAX_RECURSION_LEVEL + 1,
            ..Default::default()
        };
        assert!(planet.validate().is_err());
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut config = Config::default();
        config.planet.stamps.crater_radius_deg = (20.0, 5.0);
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.system.planet_count = (4, 2);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("system.planet_count"), "{err}");
    }

    #[test]
    fn test_flat_noise_has_no_octaves() {
        assert_eq!(NoiseConfig::flat().octaves, 0);
    }
}
