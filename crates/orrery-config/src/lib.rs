//! Configuration system for the orrery simulator.
//!
//! Provides runtime-configurable settings that persist to disk as RON files.
//! Supports CLI overrides via clap, hot-reload detection, validation, and
//! forward/backward compatible serialization.

mod cli;
mod config;
mod error;

pub use cli::CliArgs;
pub use config::{
    BandConfig, Config, DebugConfig, FreeFlightConfig, LocomotionConfig, MAX_RECURSION_LEVEL,
    NoiseConfig, PlanetGenConfig, SimConfig, StampConfig, SystemConfig,
};
pub use error::ConfigError;
