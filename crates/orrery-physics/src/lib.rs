//! Collision layers, the [`SceneQuery`] seam locomotion is written against,
//! and [`PhysicsScene`], a Rapier-backed implementation stored as an ECS resource.

mod layers;
mod query;
mod scene;

pub use layers::CollisionLayers;
pub use query::{BodyId, BodySnapshot, SceneQuery, SurfaceHit, SurfaceInfo};
pub use scene::{Collider, ColliderShape, PhysicsScene};
