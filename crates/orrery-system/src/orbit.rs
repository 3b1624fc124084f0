//! Circular orbits about a fixed center, with self spin.

use bevy_ecs::prelude::*;
use glam::{EulerRot, Quat, Vec3};
use orrery_math::Frame;

/// Revolution about `center` in the plane normal to `axis`.
///
/// Advancing rotates the whole frame, orientation included, so anything
/// stored in the body's local space is carried along.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Orbit {
    pub center: Vec3,
    /// Unit normal of the orbital plane.
    pub axis: Vec3,
    pub radius: f32,
    /// Degrees per second; negative is retrograde.
    pub speed_deg: f32,
    /// Degrees per second about the body's own Y axis.
    pub self_spin_deg: f32,
}

impl Orbit {
    /// Orbital plane normal tilted `inclination_deg` off world Y, then turned
    /// `heading_deg` about world Y.
    pub fn tilted_axis(inclination_deg: f32, heading_deg: f32) -> Vec3 {
        let rotation = Quat::from_euler(
            EulerRot::YXZ,
            heading_deg.to_radians(),
            inclination_deg.to_radians(),
            0.0,
        );
        (rotation * Vec3::Y).normalize()
    }

    /// Frame on the orbit at `phase_deg`, measured from a fixed in-plane reference.
    pub fn frame_at_phase(&self, phase_deg: f32) -> Frame {
        let reference = self.axis.any_orthonormal_vector();
        let offset = Quat::from_axis_angle(self.axis, phase_deg.to_radians()) * reference;
        Frame::from_position(self.center + offset * self.radius)
    }

    /// Move `frame` along the orbit by `dt` seconds, then apply self spin.
    pub fn advance(&self, frame: &mut Frame, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }
        if self.speed_deg != 0.0 {
            frame.rotate_around(self.center, self.axis, (self.speed_deg * dt).to_radians());
        }
        if self.self_spin_deg != 0.0 {
            frame.rotate_local(Vec3::Y, (self.self_spin_deg * dt).to_radians());
        }
    }

    /// Seconds per revolution; `None` for a stationary body.
    pub fn period(&self) -> Option<f32> {
        (self.speed_deg != 0.0).then(|| 360.0 / self.speed_deg.abs())
    }
}
