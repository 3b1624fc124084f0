//! Guarded vector helpers shared by generation and locomotion.

use glam::Vec3;

/// Squared length treated as zero by the guarded helpers.
pub const ZERO_LENGTH_SQ: f32 = 1e-12;

/// Normalize `v`, or return `fallback` when `v` is (near) zero or not finite.
#[inline]
pub fn normalize_or(v: Vec3, fallback: Vec3) -> Vec3 {
    let len_sq = v.length_squared();
    if len_sq > ZERO_LENGTH_SQ && len_sq.is_finite() {
        v / len_sq.sqrt()
    } else {
        fallback
    }
}

/// Angle between two vectors in degrees, in `[0, 180]`. Zero vectors give 0.
pub fn angle_between_deg(a: Vec3, b: Vec3) -> f32 {
    let denom = (a.length_squared() * b.length_squared()).sqrt();
    if denom <= ZERO_LENGTH_SQ {
        return 0.0;
    }
    (a.dot(b) / denom).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Remove the component of `v` along the plane normal `n` (unit length).
#[inline]
pub fn project_on_plane(v: Vec3, n: Vec3) -> Vec3 {
    v - n * v.dot(n)
}

/// Clamp the length of `v` to `max`.
#[inline]
pub fn clamp_length(v: Vec3, max: f32) -> Vec3 {
    v.clamp_length_max(max.max(0.0))
}
