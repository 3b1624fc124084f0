//! The collision primitives locomotion depends on.

use glam::Vec3;
use orrery_math::Frame;

use crate::CollisionLayers;

/// Stable handle for a body in the scene. Holding one does not keep the body alive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub u64);

/// First contact of a sphere cast.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceHit {
    /// Contact point on the surface.
    pub point: Vec3,
    /// Surface normal at the contact, unit length.
    pub normal: Vec3,
    /// Distance the sphere center traveled before touching.
    pub distance: f32,
}

/// Companion data a capturable planet carries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceInfo {
    pub outer_radius: f32,
    pub surface_gravity: f32,
}

/// A body's state as of the latest scene sync.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodySnapshot {
    pub id: BodyId,
    pub frame: Frame,
    /// Center at the previous sync, for swept tests.
    pub previous_position: Vec3,
    pub layer: CollisionLayers,
    /// `None` for bodies without generated planet data.
    pub surface: Option<SurfaceInfo>,
}

/// Overlap and sweep queries against the current scene.
pub trait SceneQuery {
    /// Bodies on `layers` whose bounds intersect the sphere. Order is by id.
    fn overlap_sphere(&self, center: Vec3, radius: f32, layers: CollisionLayers) -> Vec<BodyId>;

    /// Sweep a sphere from `origin` along `direction` (unit) up to `max_distance`.
    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        layers: CollisionLayers,
    ) -> Option<SurfaceHit>;

    /// Look a body up by id; `None` once it has been removed.
    fn body(&self, id: BodyId) -> Option<BodySnapshot>;
}
