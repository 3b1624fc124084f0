//! Headless simulator: assembles a solar system and flies a scripted player
//! through capture, landing, walking, take-off and release.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p orrery-sim -- --seed 7 --seconds 120`.

mod autopilot;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use orrery_config::{CliArgs, Config, SimConfig};
use orrery_log::DiagnosticsSink;
use orrery_player::Transition;
use orrery_system::assemble;
use tracing::{error, info};

use crate::autopilot::Autopilot;

fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Resolve config directory
    let config_dir = args
        .config
        .clone()
        .or_else(Config::default_dir)
        .unwrap_or_else(|| PathBuf::from(".orrery"));

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let diagnostics = DiagnosticsSink::default();
    let log_dir = config_dir.join("logs");
    orrery_log::init_logging(
        Some(&log_dir),
        cfg!(debug_assertions) || config.debug.json_log_file,
        Some(&config),
        Some(diagnostics.clone()),
    );

    let mut system = match assemble(args.seed, &config) {
        Ok(system) => system.with_diagnostics(diagnostics.clone()),
        Err(e) => {
            error!(seed = args.seed, "Failed to assemble solar system: {e}");
            return ExitCode::FAILURE;
        }
    };

    let frame_dt = if config.sim.frame_dt.is_finite() && config.sim.frame_dt > 0.0 {
        config.sim.frame_dt
    } else {
        SimConfig::default().frame_dt
    };
    let frames = (args.seconds.max(0.0) / frame_dt).ceil() as u64;

    let mut pilot = Autopilot::default();
    let mut transitions = 0usize;
    for _ in 0..frames {
        let input = pilot.control(&mut system, frame_dt as f32);
        for event in system.step_with_dt(input, frame_dt) {
            pilot.observe(&event.transition);
            log_transition(event.elapsed, &event.transition);
            transitions += 1;
        }
    }

    if let Some(player) = system.player() {
        info!(
            seconds = system.clock().elapsed,
            transitions,
            mode = ?player.kind(),
            phase = ?pilot.phase(),
            position = ?player.position(),
            diagnostics = diagnostics.len(),
            "Simulation finished"
        );
    }
    ExitCode::SUCCESS
}

fn log_transition(elapsed: f64, transition: &Transition) {
    match transition {
        Transition::Captured { planet, altitude } => {
            info!(t = elapsed, planet = planet.0, altitude, "Player captured");
        }
        Transition::Landed { planet } => info!(t = elapsed, planet = planet.0, "Player landed"),
        Transition::TookOff { planet } => info!(t = elapsed, planet = planet.0, "Player took off"),
        Transition::Released { planet, altitude } => {
            info!(t = elapsed, planet = planet.0, altitude, "Player released");
        }
        Transition::PlanetLost { planet } => {
            info!(t = elapsed, planet = planet.0, "Captured planet vanished");
        }
    }
}
