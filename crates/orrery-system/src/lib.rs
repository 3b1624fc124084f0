//! Solar system assembly and the simulation loop.
//!
//! [`assemble`] lays out a star, orbiting planets and a free-flying player
//! from a seed, generates every planet, and hosts them in a `bevy_ecs`
//! [`World`](bevy_ecs::world::World). [`SolarSystem::step`] runs one frame:
//! the variable stage (orbits, scene sync, look and capture) followed by
//! fixed-rate movement steps.

mod assembly;
mod components;
mod orbit;
mod schedule;
mod solar_system;
mod systems;

pub use assembly::{PlanetPlan, StarPlan, SystemPlan, plan_system};
pub use components::{
    BodyTransform, Collidable, Diagnostics, Planet, Player, PlayerInput, SimClock, Star,
    TransitionEvent, TransitionLog,
};
pub use orbit::Orbit;
pub use schedule::{SimSchedule, SimSchedules};
pub use solar_system::{PlanetView, SolarSystem, assemble};
pub use systems::{advance_orbits, player_look_and_capture, player_movement, sync_scene};

use bevy_ecs::schedule::ScheduleBuildError;
use orrery_config::ConfigError;
use orrery_physics::BodyId;
use orrery_planet::PlanetError;

/// Errors from assembling or editing a solar system.
#[derive(Debug, thiserror::Error)]
pub enum SystemError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("planet {index} failed to generate: {source}")]
    Planet {
        index: usize,
        #[source]
        source: PlanetError,
    },

    #[error("no planet with body {0:?}")]
    UnknownBody(BodyId),

    #[error("simulation schedule is invalid: {0}")]
    Schedule(#[from] ScheduleBuildError),
}
