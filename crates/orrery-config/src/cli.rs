//! Command-line argument parsing for the orrery simulator.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Simulator command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "orrery", about = "Procedural solar system with planet-relative locomotion")]
pub struct CliArgs {
    /// Seed for the whole solar system.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Simulated seconds to run before exiting.
    #[arg(long, default_value_t = 60.0)]
    pub seconds: f64,

    /// Force an exact planet count.
    #[arg(long)]
    pub planets: Option<u32>,

    /// Icosphere subdivision level for every planet.
    #[arg(long)]
    pub recursion_level: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(count) = args.planets {
            self.system.planet_count = (count, count);
        }
        if let Some(level) = args.recursion_level {
            self.planet.recursion_level = level;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            planets: Some(3),
            log_level: Some("debug".to_string()),
            ..Default::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.system.planet_count, (3, 3));
        assert_eq!(config.debug.log_level, "debug");
        // Non-overridden fields retain defaults
        assert_eq!(config.planet.recursion_level, 3);
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_cli_parses_flags() {
        let args = CliArgs::parse_from(["orrery", "--seed", "7", "--recursion-level", "2"]);
        assert_eq!(args.seed, 7);
        assert_eq!(args.recursion_level, Some(2));
        assert_eq!(args.seconds, 60.0);
    }
}
