//! Scripted pilot that exercises every locomotion mode.
//!
//! Flies at the nearest planet until captured, descends until walking, walks
//! for a while, hops and takes off, then climbs until released and coasts.

use glam::Vec2;
use orrery_player::{InputSnapshot, ModeKind, Transition};
use orrery_system::SolarSystem;

/// Seconds spent walking before the hop.
const WALK_SECONDS: f32 = 3.0;
/// Delay after the hop before the take-off press, so the player is airborne.
const TAKE_OFF_DELAY: f32 = 0.3;
/// A hop that has not taken off by now is retried.
const HOP_RETRY: f32 = 2.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Approach,
    Descend,
    Walk,
    Hop,
    Ascend,
    Coast,
}

#[derive(Clone, Debug)]
pub struct Autopilot {
    phase: Phase,
    phase_time: f32,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            phase: Phase::Approach,
            phase_time: 0.0,
        }
    }
}

impl Autopilot {
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Controls for the next frame of `dt` seconds.
    pub fn control(&mut self, system: &mut SolarSystem, dt: f32) -> InputSnapshot {
        let elapsed = self.phase_time;
        self.phase_time += dt;

        match self.phase {
            Phase::Approach => {
                let target = system
                    .player()
                    .filter(|player| player.kind() == ModeKind::FreeFlight)
                    .and_then(|player| system.nearest_planet(player.position()));
                if let (Some(target), Some(mut player)) = (target, system.player_mut()) {
                    player.machine.face_towards(target.frame.position);
                }
                forward()
            }
            Phase::Descend => InputSnapshot {
                descend: true,
                ..Default::default()
            },
            Phase::Walk => {
                if elapsed >= WALK_SECONDS {
                    self.enter(Phase::Hop);
                    return InputSnapshot {
                        jump: true,
                        ..Default::default()
                    };
                }
                forward()
            }
            Phase::Hop => {
                if elapsed >= HOP_RETRY {
                    self.enter(Phase::Hop);
                    InputSnapshot {
                        jump: true,
                        ..Default::default()
                    }
                } else if elapsed >= TAKE_OFF_DELAY {
                    InputSnapshot {
                        jump: true,
                        modifier: true,
                        ..Default::default()
                    }
                } else {
                    InputSnapshot::default()
                }
            }
            Phase::Ascend => InputSnapshot {
                ascend: true,
                ..Default::default()
            },
            Phase::Coast => InputSnapshot::default(),
        }
    }

    /// Advance the script on a reported transition.
    pub fn observe(&mut self, transition: &Transition) {
        match transition {
            Transition::Captured { .. } => self.enter(Phase::Descend),
            Transition::Landed { .. } => self.enter(Phase::Walk),
            Transition::TookOff { .. } => self.enter(Phase::Ascend),
            Transition::Released { .. } | Transition::PlanetLost { .. } => self.enter(Phase::Coast),
        }
    }

    fn enter(&mut self, phase: Phase) {
        self.phase = phase;
        self.phase_time = 0.0;
    }
}

fn forward() -> InputSnapshot {
    InputSnapshot {
        movement: Vec2::new(0.0, 1.0),
        ..Default::default()
    }
}
