//! Rapier-backed collision scene implementing [`SceneQuery`].
//!
//! Bodies are parentless Rapier colliders, so they never take part in the
//! dynamics; the pipeline is only stepped to keep the broad-phase BVH in sync
//! after colliders move, appear or change shape. Queries go through
//! [`QueryPipeline`](rapier3d::prelude::QueryPipeline) with a layer predicate.

use std::collections::BTreeMap;
use std::fmt;

use bevy_ecs::prelude::*;
use glam::{Quat, Vec3};
use orrery_math::{Frame, normalize_or};
use orrery_mesh::Mesh;
use rapier3d::math::{Pose, Rotation};
use rapier3d::parry::query::ShapeCastOptions;
use rapier3d::parry::shape::Ball;
use rapier3d::prelude::{
    BroadPhaseBvh, CCDSolver, ColliderBuilder, ColliderHandle, ColliderSet, ImpulseJointSet,
    IntegrationParameters, IslandManager, MultibodyJointSet, NarrowPhase, PhysicsPipeline,
    QueryFilter, RigidBodySet, SharedShape, Vector,
};
use tracing::{debug, warn};

use crate::{BodyId, BodySnapshot, CollisionLayers, SceneQuery, SurfaceHit, SurfaceInfo};

/// Smallest radius a query ball is given.
const MIN_QUERY_RADIUS: f32 = 1e-4;

/// Collision geometry in body-local space.
#[derive(Clone, Debug)]
pub enum ColliderShape {
    Sphere { radius: f32 },
    /// Outward-wound triangle mesh.
    TriMesh {
        vertices: Vec<Vec3>,
        indices: Vec<[u32; 3]>,
    },
}

impl ColliderShape {
    /// Triangle mesh from a render mesh. Degenerate faces are dropped.
    pub fn from_mesh(mesh: &Mesh) -> Self {
        let indices = mesh
            .triangles
            .iter()
            .copied()
            .filter(|&[a, b, c]| {
                let [a, b, c] = [a, b, c].map(|i| mesh.positions[i as usize]);
                (b - a).cross(c - a).length_squared() > 0.0
            })
            .collect();
        Self::TriMesh {
            vertices: mesh.positions.clone(),
            indices,
        }
    }

    /// Largest distance of the geometry from the body origin.
    pub fn bounding_radius(&self) -> f32 {
        match self {
            Self::Sphere { radius } => *radius,
            Self::TriMesh { vertices, .. } => vertices.iter().map(|v| v.length()).fold(0.0, f32::max),
        }
    }

    /// Rapier shape for this geometry.
    ///
    /// A mesh Rapier rejects falls back to its bounding ball.
    fn to_shared(&self) -> SharedShape {
        match self {
            Self::Sphere { radius } => SharedShape::ball(*radius),
            Self::TriMesh { vertices, indices } => {
                let points = vertices.iter().map(|&v| to_vector(v)).collect();
                match SharedShape::trimesh(points, indices.clone()) {
                    Ok(shape) => shape,
                    Err(e) => {
                        warn!(error = ?e, "Rejected collision mesh, using its bounding ball");
                        SharedShape::ball(self.bounding_radius())
                    }
                }
            }
        }
    }
}

/// A body registered with the scene.
#[derive(Clone, Debug)]
pub struct Collider {
    pub shape: ColliderShape,
    pub frame: Frame,
    pub previous_position: Vec3,
    pub layer: CollisionLayers,
    pub surface: Option<SurfaceInfo>,
}

impl Collider {
    pub fn new(shape: ColliderShape, frame: Frame, layer: CollisionLayers) -> Self {
        Self {
            shape,
            previous_position: frame.position,
            frame,
            layer,
            surface: None,
        }
    }

    pub fn with_surface(mut self, surface: SurfaceInfo) -> Self {
        self.surface = Some(surface);
        self
    }
}

struct Entry {
    handle: ColliderHandle,
    collider: Collider,
}

/// All colliders in the simulation, keyed by [`BodyId`].
///
/// Insert into the ECS world as a resource. Body frames are pushed in once per
/// frame with [`PhysicsScene::set_frames`], which also records the previous
/// center for swept tests.
#[derive(Resource)]
pub struct PhysicsScene {
    integration_parameters: IntegrationParameters,
    physics_pipeline: PhysicsPipeline,
    island_manager: IslandManager,
    broad_phase: BroadPhaseBvh,
    narrow_phase: NarrowPhase,
    rigid_body_set: RigidBodySet,
    collider_set: ColliderSet,
    impulse_joint_set: ImpulseJointSet,
    multibody_joint_set: MultibodyJointSet,
    ccd_solver: CCDSolver,
    entries: BTreeMap<BodyId, Entry>,
    next_id: u64,
}

impl Default for PhysicsScene {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PhysicsScene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicsScene")
            .field("bodies", &self.entries.len())
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl PhysicsScene {
    pub fn new() -> Self {
        Self {
            integration_parameters: IntegrationParameters::default(),
            physics_pipeline: PhysicsPipeline::new(),
            island_manager: IslandManager::new(),
            broad_phase: BroadPhaseBvh::new(),
            narrow_phase: NarrowPhase::new(),
            rigid_body_set: RigidBodySet::new(),
            collider_set: ColliderSet::new(),
            impulse_joint_set: ImpulseJointSet::new(),
            multibody_joint_set: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            entries: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn insert(&mut self, collider: Collider) -> BodyId {
        let id = BodyId(self.next_id);
        self.next_id += 1;

        let rapier_collider = ColliderBuilder::new(collider.shape.to_shared())
            .position(to_pose(&collider.frame))
            .user_data(pack_user_data(id, collider.layer))
            .build();
        let handle = self.collider_set.insert(rapier_collider);
        debug!(id = id.0, layer = collider.layer.0, "collider added");

        self.entries.insert(id, Entry { handle, collider });
        self.refresh();
        id
    }

    pub fn remove(&mut self, id: BodyId) -> Option<Collider> {
        let entry = self.entries.remove(&id)?;
        self.collider_set.remove(
            entry.handle,
            &mut self.island_manager,
            &mut self.rigid_body_set,
            false,
        );
        self.refresh();
        debug!(id = id.0, "collider removed");
        Some(entry.collider)
    }

    /// Move one body, keeping its old center as the previous position.
    ///
    /// Returns `false` for unknown ids.
    pub fn set_frame(&mut self, id: BodyId, frame: Frame) -> bool {
        self.set_frames([(id, frame)]) == 1
    }

    /// Move several bodies with one broad-phase refresh.
    ///
    /// Returns how many ids were known.
    pub fn set_frames(&mut self, frames: impl IntoIterator<Item = (BodyId, Frame)>) -> usize {
        let mut moved = 0;
        for (id, frame) in frames {
            let Some(entry) = self.entries.get_mut(&id) else {
                continue;
            };
            entry.collider.previous_position = entry.collider.frame.position;
            entry.collider.frame = frame;
            if let Some(collider) = self.collider_set.get_mut(entry.handle) {
                collider.set_position(to_pose(&frame));
            }
            moved += 1;
        }
        if moved > 0 {
            self.refresh();
        }
        moved
    }

    /// Swap a body's geometry (after regeneration) and companion data.
    pub fn replace_shape(
        &mut self,
        id: BodyId,
        shape: ColliderShape,
        surface: Option<SurfaceInfo>,
    ) -> bool {
        let Some(entry) = self.entries.get_mut(&id) else {
            return false;
        };
        if let Some(collider) = self.collider_set.get_mut(entry.handle) {
            collider.set_shape(shape.to_shared());
        }
        entry.collider.shape = shape;
        entry.collider.surface = surface;
        self.refresh();
        true
    }

    pub fn get(&self, id: BodyId) -> Option<&Collider> {
        self.entries.get(&id).map(|entry| &entry.collider)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Step the pipeline once so the broad phase sees every pending change.
    ///
    /// The scene holds no rigid bodies, so nothing is integrated.
    fn refresh(&mut self) {
        self.physics_pipeline.step(
            Vector::new(0.0, 0.0, 0.0),
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            &(),
            &(),
        );
    }
}

impl SceneQuery for PhysicsScene {
    fn overlap_sphere(&self, center: Vec3, radius: f32, layers: CollisionLayers) -> Vec<BodyId> {
        if !(center.is_finite() && radius.is_finite() && radius >= 0.0) {
            return Vec::new();
        }
        let on_layers = |_: ColliderHandle, c: &rapier3d::prelude::Collider| {
            unpack_layer(c.user_data).intersects(layers)
        };
        let query = self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.rigid_body_set,
            &self.collider_set,
            QueryFilter::new().predicate(&on_layers),
        );

        let ball = Ball::new(radius.max(MIN_QUERY_RADIUS));
        let mut ids: Vec<BodyId> = query
            .intersect_shape(to_pose(&Frame::from_position(center)), &ball)
            .map(|(_, c)| unpack_id(c.user_data))
            .collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    }

    fn sphere_cast(
        &self,
        origin: Vec3,
        radius: f32,
        direction: Vec3,
        max_distance: f32,
        layers: CollisionLayers,
    ) -> Option<SurfaceHit> {
        let direction = direction.try_normalize()?;
        if !(origin.is_finite() && max_distance.is_finite() && max_distance >= 0.0) {
            return None;
        }
        let on_layers = |_: ColliderHandle, c: &rapier3d::prelude::Collider| {
            unpack_layer(c.user_data).intersects(layers)
        };
        let query = self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.rigid_body_set,
            &self.collider_set,
            QueryFilter::new().predicate(&on_layers),
        );

        let radius = radius.max(MIN_QUERY_RADIUS);
        let ball = Ball::new(radius);
        let (_, hit) = query.cast_shape(
            &to_pose(&Frame::from_position(origin)),
            to_vector(direction),
            &ball,
            ShapeCastOptions::with_max_time_of_impact(max_distance),
        )?;

        // `normal1` is the ball's outward normal toward the surface; the ball
        // is unrotated, so it is already in world space.
        let toward = Vec3::new(hit.normal1.x, hit.normal1.y, hit.normal1.z);
        let normal = normalize_or(-toward, -direction);
        let distance = hit.time_of_impact;
        Some(SurfaceHit {
            point: origin + direction * distance - normal * radius,
            normal,
            distance,
        })
    }

    fn body(&self, id: BodyId) -> Option<BodySnapshot> {
        self.entries.get(&id).map(|entry| {
            let c = &entry.collider;
            BodySnapshot {
                id,
                frame: c.frame,
                previous_position: c.previous_position,
                layer: c.layer,
                surface: c.surface,
            }
        })
    }
}

// Rapier may re-export a different glam than the workspace; convert by component.

fn to_vector(v: Vec3) -> Vector {
    Vector::new(v.x, v.y, v.z)
}

fn to_rotation(q: Quat) -> Rotation {
    Rotation::from_xyzw(q.x, q.y, q.z, q.w)
}

fn to_pose(frame: &Frame) -> Pose {
    Pose::from_parts(to_vector(frame.position), to_rotation(frame.rotation))
}

/// Body id in the low 64 bits, layer mask above it.
fn pack_user_data(id: BodyId, layer: CollisionLayers) -> u128 {
    (u128::from(layer.0) << 64) | u128::from(id.0)
}

fn unpack_id(data: u128) -> BodyId {
    BodyId(data as u64)
}

fn unpack_layer(data: u128) -> CollisionLayers {
    CollisionLayers((data >> 64) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_mesh::IcoSphere;

    fn planet_scene(at: Vec3) -> (PhysicsScene, BodyId) {
        let mut scene = PhysicsScene::new();
        let mesh = IcoSphere::build(4, 5.0).unwrap();
        let id = scene.insert(
            Collider::new(
                ColliderShape::from_mesh(&mesh),
                Frame::from_position(at),
                CollisionLayers::PLANET,
            )
            .with_surface(SurfaceInfo {
                outer_radius: 5.0,
                surface_gravity: 12.0,
            }),
        );
        (scene, id)
    }

    /// One triangle in the XZ plane, wound so its normal is +Y.
    fn single_triangle_scene() -> PhysicsScene {
        let mut scene = PhysicsScene::new();
        scene.insert(Collider::new(
            ColliderShape::TriMesh {
                vertices: vec![Vec3::ZERO, Vec3::Z, Vec3::X],
                indices: vec![[0, 1, 2]],
            },
            Frame::IDENTITY,
            CollisionLayers::PLANET,
        ));
        scene
    }

    #[test]
    fn test_user_data_packing() {
        let data = pack_user_data(BodyId(77), CollisionLayers::STAR);
        assert_eq!(unpack_id(data), BodyId(77));
        assert_eq!(unpack_layer(data), CollisionLayers::STAR);
    }

    #[test]
    fn test_sphere_cast_down_onto_mesh() {
        let (scene, _) = planet_scene(Vec3::ZERO);
        let hit = scene
            .sphere_cast(Vec3::new(0.0, 20.0, 0.0), 0.7, Vec3::NEG_Y, 100.0, CollisionLayers::PLANET)
            .expect("cast straight down must hit the planet");
        assert!(
            (hit.distance - 14.3).abs() < 0.1,
            "expected ~14.3 travel, got {}",
            hit.distance
        );
        assert!(hit.normal.dot(Vec3::Y) > 0.95, "normal {:?}", hit.normal);
        assert!((hit.point.length() - 5.0).abs() < 0.1);
    }

    #[test]
    fn test_sphere_cast_touches_triangle_edge() {
        let scene = single_triangle_scene();
        let hit = scene
            .sphere_cast(
                Vec3::new(-0.3, 5.0, 0.5),
                0.5,
                Vec3::NEG_Y,
                10.0,
                CollisionLayers::PLANET,
            )
            .expect("a ball overhanging the edge must touch it");
        assert!((hit.distance - 4.6).abs() < 1e-3, "travel {}", hit.distance);
        let expected_normal = Vec3::new(-0.6, 0.8, 0.0);
        assert!(
            (hit.normal - expected_normal).length() < 1e-3,
            "edge normal {:?}",
            hit.normal
        );
        assert!((hit.point - Vec3::new(0.0, 0.0, 0.5)).length() < 1e-3, "point {:?}", hit.point);
    }

    #[test]
    fn test_sphere_cast_beside_triangle_misses() {
        let scene = single_triangle_scene();
        let hit = scene.sphere_cast(
            Vec3::new(-0.6, 5.0, 0.5),
            0.5,
            Vec3::NEG_Y,
            10.0,
            CollisionLayers::PLANET,
        );
        assert!(hit.is_none(), "ball clears the edge: {hit:?}");
    }

    #[test]
    fn test_sphere_cast_respects_max_distance_and_layers() {
        let (scene, _) = planet_scene(Vec3::ZERO);
        let origin = Vec3::new(0.0, 20.0, 0.0);
        assert!(scene.sphere_cast(origin, 0.7, Vec3::NEG_Y, 10.0, CollisionLayers::PLANET).is_none());
        assert!(scene.sphere_cast(origin, 0.7, Vec3::NEG_Y, 100.0, CollisionLayers::STAR).is_none());
        assert!(scene.sphere_cast(origin, 0.7, Vec3::Y, 100.0, CollisionLayers::PLANET).is_none());
        assert!(scene.sphere_cast(origin, 0.7, Vec3::ZERO, 100.0, CollisionLayers::ALL).is_none());
    }

    #[test]
    fn test_sphere_cast_follows_moved_and_rotated_body() {
        let (mut scene, id) = planet_scene(Vec3::ZERO);
        let frame = Frame::new(Vec3::new(100.0, 0.0, 0.0), Quat::from_rotation_z(0.7));
        assert!(scene.set_frame(id, frame));

        assert!(
            scene
                .sphere_cast(Vec3::new(0.0, 20.0, 0.0), 0.7, Vec3::NEG_Y, 100.0, CollisionLayers::ALL)
                .is_none(),
            "old position must be empty after the move"
        );
        let hit = scene
            .sphere_cast(Vec3::new(100.0, 20.0, 0.0), 0.7, Vec3::NEG_Y, 100.0, CollisionLayers::ALL)
            .expect("moved planet should still be hit");
        assert!((hit.distance - 14.3).abs() < 0.15);
        assert!((hit.point - Vec3::new(100.0, 5.0, 0.0)).length() < 0.2);
    }

    #[test]
    fn test_cast_starting_inside_reports_zero() {
        let (scene, _) = planet_scene(Vec3::ZERO);
        let hit = scene
            .sphere_cast(Vec3::new(0.0, 5.3, 0.0), 0.7, Vec3::NEG_Y, 10.0, CollisionLayers::PLANET)
            .expect("overlapping cast should hit");
        assert_eq!(hit.distance, 0.0);
        assert!(hit.normal.is_finite());
    }

    #[test]
    fn test_analytic_sphere_shape() {
        let mut scene = PhysicsScene::new();
        scene.insert(Collider::new(
            ColliderShape::Sphere { radius: 50.0 },
            Frame::from_position(Vec3::new(0.0, 0.0, -200.0)),
            CollisionLayers::STAR,
        ));
        let hit = scene
            .sphere_cast(Vec3::ZERO, 1.0, Vec3::NEG_Z, 500.0, CollisionLayers::STAR)
            .unwrap();
        assert!((hit.distance - 149.0).abs() < 1e-3);
        assert!((hit.normal - Vec3::Z).length() < 1e-3);
    }

    #[test]
    fn test_overlap_filters_by_layer() {
        let (mut scene, planet) = planet_scene(Vec3::new(30.0, 0.0, 0.0));
        let star = scene.insert(Collider::new(
            ColliderShape::Sphere { radius: 10.0 },
            Frame::IDENTITY,
            CollisionLayers::STAR,
        ));

        assert_eq!(scene.overlap_sphere(Vec3::ZERO, 30.0, CollisionLayers::ALL), vec![planet, star]);
        assert_eq!(scene.overlap_sphere(Vec3::ZERO, 30.0, CollisionLayers::PLANET), vec![planet]);
        assert!(scene.overlap_sphere(Vec3::ZERO, 20.0, CollisionLayers::PLANET).is_empty());
        assert!(scene.overlap_sphere(Vec3::ZERO, f32::NAN, CollisionLayers::ALL).is_empty());
    }

    #[test]
    fn test_set_frames_tracks_previous_position() {
        let (mut scene, id) = planet_scene(Vec3::ZERO);
        scene.set_frame(id, Frame::from_position(Vec3::X));
        let moved = scene.set_frames([
            (id, Frame::from_position(Vec3::new(3.0, 0.0, 0.0))),
            (BodyId(999), Frame::IDENTITY),
        ]);
        assert_eq!(moved, 1, "unknown ids are skipped");
        let snap = scene.body(id).unwrap();
        assert_eq!(snap.previous_position, Vec3::X);
        assert_eq!(snap.frame.position, Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(snap.surface.map(|s| s.outer_radius), Some(5.0));
    }

    #[test]
    fn test_replace_shape_changes_query_geometry() {
        let (mut scene, id) = planet_scene(Vec3::ZERO);
        let surface = SurfaceInfo {
            outer_radius: 8.0,
            surface_gravity: 12.0,
        };
        assert!(scene.replace_shape(id, ColliderShape::Sphere { radius: 8.0 }, Some(surface)));

        let hit = scene
            .sphere_cast(Vec3::new(0.0, 20.0, 0.0), 1.0, Vec3::NEG_Y, 100.0, CollisionLayers::PLANET)
            .unwrap();
        assert!((hit.distance - 11.0).abs() < 1e-3, "travel {}", hit.distance);
        assert_eq!(scene.body(id).unwrap().surface, Some(surface));
        assert!(!scene.replace_shape(BodyId(999), ColliderShape::Sphere { radius: 1.0 }, None));
    }

    #[test]
    fn test_removed_body_lookup_is_none() {
        let (mut scene, id) = planet_scene(Vec3::ZERO);
        assert!(scene.remove(id).is_some());
        assert!(scene.body(id).is_none());
        assert!(!scene.set_frame(id, Frame::IDENTITY));
        assert!(scene.remove(id).is_none());
        assert!(
            scene
                .sphere_cast(Vec3::new(0.0, 20.0, 0.0), 0.7, Vec3::NEG_Y, 100.0, CollisionLayers::ALL)
                .is_none(),
            "removed collider must not be hit"
        );
    }
}
