//! Systems registered into the simulation stages.
//!
//! Variable stage, chained in this order: [`advance_orbits`],
//! [`sync_scene`], [`player_look_and_capture`]. Fixed stage:
//! [`player_movement`].

use bevy_ecs::prelude::*;
use orrery_physics::PhysicsScene;
use orrery_player::Transition;
use tracing::Level;

use crate::{
    BodyTransform, Collidable, Diagnostics, Orbit, Player, PlayerInput, SimClock, TransitionEvent,
    TransitionLog,
};

/// Move every orbiting body by this frame's delta.
///
/// **Stage:** Variable (writes `BodyTransform`, reads `Orbit` and `SimClock`).
pub fn advance_orbits(clock: Res<SimClock>, mut bodies: Query<(&Orbit, &mut BodyTransform)>) {
    for (orbit, mut transform) in &mut bodies {
        orbit.advance(&mut transform.0, clock.frame_dt);
    }
}

/// Push body frames into the physics scene, recording previous centers.
///
/// Runs for every body each frame so stationary bodies have a zero-length sweep.
///
/// **Stage:** Variable (writes `PhysicsScene`, reads `BodyTransform`).
pub fn sync_scene(
    mut scene: ResMut<PhysicsScene>,
    bodies: Query<(&Collidable, &BodyTransform)>,
) {
    scene.set_frames(
        bodies
            .iter()
            .map(|(collidable, transform)| (collidable.0, transform.0)),
    );
}

/// Look, orientation and the capture test for every player.
///
/// **Stage:** Variable (writes `Player`, `TransitionLog`; reads `PhysicsScene`).
pub fn player_look_and_capture(
    clock: Res<SimClock>,
    input: Res<PlayerInput>,
    scene: Res<PhysicsScene>,
    mut players: Query<&mut Player>,
    mut log: ResMut<TransitionLog>,
    diagnostics: Option<Res<Diagnostics>>,
) {
    for mut player in &mut players {
        let transitions = player.machine.update_variable(&input.0, clock.frame_dt, &*scene);
        record(&clock, transitions, &mut log, diagnostics.as_deref());
    }
}

/// Movement, probes and the release check for every player.
///
/// Clears the jump edge once consumed so extra fixed steps in the same frame
/// do not jump again.
///
/// **Stage:** Fixed (writes `Player`, `PlayerInput`, `TransitionLog`).
pub fn player_movement(
    clock: Res<SimClock>,
    mut input: ResMut<PlayerInput>,
    scene: Res<PhysicsScene>,
    mut players: Query<&mut Player>,
    mut log: ResMut<TransitionLog>,
    diagnostics: Option<Res<Diagnostics>>,
) {
    let controls = input.0;
    for mut player in &mut players {
        let transitions = player.machine.update_fixed(&controls, clock.fixed_dt, &*scene);
        record(&clock, transitions, &mut log, diagnostics.as_deref());
    }
    if controls.jump {
        input.0 = controls.without_jump();
    }
}

fn record(
    clock: &SimClock,
    transitions: Vec<Transition>,
    log: &mut TransitionLog,
    diagnostics: Option<&Diagnostics>,
) {
    for transition in transitions {
        if let (Transition::Captured { planet, altitude }, Some(diagnostics)) =
            (transition, diagnostics)
        {
            diagnostics.0.clear();
            diagnostics.0.record(
                Level::INFO,
                format!("Captured by planet {} at altitude {altitude:.1}", planet.0),
            );
        }
        log.push(TransitionEvent {
            frame: clock.frame,
            elapsed: clock.elapsed,
            transition,
        });
    }
}
