//! Rigid transforms (translation + rotation, no scale).

use glam::{Quat, Vec3};

/// Position and orientation of a body in world space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for Frame {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Frame {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            rotation: Quat::IDENTITY,
        }
    }

    /// Local point to world space.
    #[inline]
    pub fn transform_point(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }

    /// World point to local space.
    #[inline]
    pub fn inverse_transform_point(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * (world - self.position)
    }

    /// Local direction to world space.
    #[inline]
    pub fn transform_vector(&self, local: Vec3) -> Vec3 {
        self.rotation * local
    }

    /// World direction to local space.
    #[inline]
    pub fn inverse_transform_vector(&self, world: Vec3) -> Vec3 {
        self.rotation.inverse() * world
    }

    /// Rotate this frame about an axis through `pivot` (position and orientation).
    pub fn rotate_around(&mut self, pivot: Vec3, axis: Vec3, angle: f32) {
        let q = Quat::from_axis_angle(axis, angle);
        self.position = pivot + q * (self.position - pivot);
        self.rotation = (q * self.rotation).normalize();
    }

    /// Rotate about one of this frame's own axes.
    pub fn rotate_local(&mut self, local_axis: Vec3, angle: f32) {
        self.rotation = (self.rotation * Quat::from_axis_angle(local_axis, angle)).normalize();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_round_trip_point() {
        let frame = Frame::new(
            Vec3::new(10.0, -3.0, 7.0),
            Quat::from_euler(glam::EulerRot::YXZ, 0.4, -1.1, 0.3),
        );
        let p = Vec3::new(1.5, 2.0, -4.0);
        let back = frame.inverse_transform_point(frame.transform_point(p));
        assert!((back - p).length() < 1e-4);
    }

    #[test]
    fn test_rotate_around_moves_and_turns() {
        let mut frame = Frame::from_position(Vec3::new(10.0, 0.0, 0.0));
        frame.rotate_around(Vec3::ZERO, Vec3::Y, FRAC_PI_2);
        assert!((frame.position - Vec3::new(0.0, 0.0, -10.0)).length() < 1e-4);
        // The frame's local +X now points along world -Z as well.
        let x = frame.transform_vector(Vec3::X);
        assert!((x - Vec3::NEG_Z).length() < 1e-4);
    }

    #[test]
    fn test_local_point_follows_rotation() {
        let mut frame = Frame::from_position(Vec3::new(100.0, 0.0, 0.0));
        let surface_local = Vec3::new(0.0, 5.0, 0.0);
        frame.rotate_local(Vec3::Z, FRAC_PI_2);
        let world = frame.transform_point(surface_local);
        assert!((world - Vec3::new(95.0, 0.0, 0.0)).length() < 1e-4);
    }
}
