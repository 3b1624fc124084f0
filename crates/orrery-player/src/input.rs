//! Per-tick input snapshot supplied by the host.

use glam::Vec2;

/// Abstract controls for one tick. The host maps devices onto these.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    /// Look delta: `x` turns right, `y` looks up.
    pub look: Vec2,
    /// Movement axes: `x` strafes right, `y` moves forward.
    pub movement: Vec2,
    /// Held: rise along local up.
    pub ascend: bool,
    /// Held: sink along local up.
    pub descend: bool,
    /// Pressed this tick (edge, not level).
    pub jump: bool,
    /// Held: turns a jump into a take-off while airborne.
    pub modifier: bool,
}

impl InputSnapshot {
    /// Movement axes normalized so diagonals are not faster. Zero stays zero.
    pub fn movement_dir(&self) -> Vec2 {
        self.movement.normalize_or_zero()
    }

    pub fn has_movement(&self) -> bool {
        self.movement.length_squared() > 0.0
    }

    /// Same controls with the jump edge consumed.
    pub fn without_jump(self) -> Self {
        Self { jump: false, ..self }
    }
}
