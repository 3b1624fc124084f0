//! ECS components and resources for the solar system world.

use bevy_ecs::prelude::*;
use orrery_log::DiagnosticsSink;
use orrery_math::Frame;
use orrery_mesh::Color;
use orrery_physics::BodyId;
use orrery_planet::PlanetBody;
use orrery_player::{InputSnapshot, LocomotionStateMachine, Transition};

/// World-space frame of a body. Pushed into the physics scene every frame.
#[derive(Component, Clone, Copy, Debug, Default, PartialEq)]
pub struct BodyTransform(pub Frame);

/// Links an entity to its collider in the [`PhysicsScene`](orrery_physics::PhysicsScene).
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Collidable(pub BodyId);

/// The central star.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Star {
    pub radius: f32,
    /// Point light intensity, scaled with size.
    pub intensity: f32,
    pub color: Color,
    /// Light reach: farthest planet surface plus a margin.
    pub light_range: f32,
}

#[derive(Component, Clone, Debug)]
pub struct Planet {
    /// Position in spawn order, innermost first.
    pub index: usize,
    pub body: PlanetBody,
}

#[derive(Component, Clone, Debug)]
pub struct Player {
    pub machine: LocomotionStateMachine,
}

/// Controls for the current frame. The jump edge is cleared once a fixed step consumes it.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct PlayerInput(pub InputSnapshot);

/// Frame and fixed timing, written by the schedule runner.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct SimClock {
    /// Delta of the current frame in seconds.
    pub frame_dt: f32,
    pub fixed_dt: f32,
    /// Simulated seconds since assembly.
    pub elapsed: f64,
    /// Frames run so far.
    pub frame: u64,
}

impl Default for SimClock {
    fn default() -> Self {
        Self {
            frame_dt: 0.0,
            fixed_dt: 1.0 / 60.0,
            elapsed: 0.0,
            frame: 0,
        }
    }
}

/// A transition stamped with the frame it happened in.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransitionEvent {
    pub frame: u64,
    pub elapsed: f64,
    pub transition: Transition,
}

/// Transitions not yet collected by the host.
#[derive(Resource, Clone, Debug, Default)]
pub struct TransitionLog {
    events: Vec<TransitionEvent>,
}

impl TransitionLog {
    pub fn push(&mut self, event: TransitionEvent) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[TransitionEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<TransitionEvent> {
        std::mem::take(&mut self.events)
    }
}

/// Optional diagnostics buffer; cleared whenever the player is captured.
#[derive(Resource, Clone, Debug)]
pub struct Diagnostics(pub DiagnosticsSink);
