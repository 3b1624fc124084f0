//! Swept capture test run from free flight.

use glam::Vec3;
use orrery_math::segment_distance;
use orrery_physics::{BodySnapshot, CollisionLayers, SceneQuery};
use tracing::warn;

/// Outer radius below which no extra capture margin is added.
pub const MARGIN_BASE_RADIUS: f32 = 5.0;
/// Extra release distance beyond the capture margin.
pub const RELEASE_EXTRA: f32 = 10.0;
/// Heuristic widening of the capture shell for the segment-distance sweep.
///
/// Not derived from a moving-sphere closest approach; tune against the
/// scenarios in the system tests before changing.
pub const CAPTURE_SWEEP_FACTOR: f32 = 2.0;
/// Minimum gap between the release distance and the capture threshold.
pub const RELEASE_HYSTERESIS: f32 = 5.0;

/// Margin added to the outer radius for capture, `ceil(R - 5)` floored at 0.
pub fn capture_margin(outer_radius: f32) -> f32 {
    (outer_radius - MARGIN_BASE_RADIUS).ceil().max(0.0)
}

/// Margin added to the outer radius for release.
///
/// At least [`RELEASE_HYSTERESIS`] past the capture threshold, so a player
/// released from a large planet is not swept back in on the next tick.
pub fn release_margin(outer_radius: f32) -> f32 {
    let past_capture = capture_threshold(outer_radius) - outer_radius + RELEASE_HYSTERESIS;
    (capture_margin(outer_radius) + RELEASE_EXTRA).max(past_capture)
}

/// Segment distance below which a planet captures the player.
pub fn capture_threshold(outer_radius: f32) -> f32 {
    CAPTURE_SWEEP_FACTOR * (outer_radius + capture_margin(outer_radius))
}

/// A planet that passed the sweep test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CaptureCandidate {
    pub body: BodySnapshot,
    pub outer_radius: f32,
    pub surface_gravity: f32,
    pub release_margin: f32,
    /// Minimum distance between the player's and the planet's motion segments.
    pub sweep_distance: f32,
}

/// Test every planet near `to` and return the nearest one that captures.
///
/// The player moved `from -> to` this frame; each planet's segment runs from
/// its previous to its current center. Planets without surface data are
/// skipped with a warning.
pub fn find_capture<Q: SceneQuery + ?Sized>(
    scene: &Q,
    from: Vec3,
    to: Vec3,
    search_radius: f32,
) -> Option<CaptureCandidate> {
    let mut best: Option<(f32, CaptureCandidate)> = None;

    for id in scene.overlap_sphere(to, search_radius, CollisionLayers::PLANET) {
        let Some(body) = scene.body(id) else {
            continue;
        };
        let Some(surface) = body.surface else {
            warn!(planet = id.0, "Planet without generated surface data, skipping capture");
            continue;
        };

        let sweep_distance = segment_distance(from, to, body.previous_position, body.frame.position);
        if sweep_distance >= capture_threshold(surface.outer_radius) {
            continue;
        }

        let center_distance = body.frame.position.distance_squared(to);
        if best.as_ref().is_none_or(|(d, _)| center_distance < *d) {
            best = Some((
                center_distance,
                CaptureCandidate {
                    body,
                    outer_radius: surface.outer_radius,
                    surface_gravity: surface.surface_gravity,
                    release_margin: release_margin(surface.outer_radius),
                    sweep_distance,
                },
            ));
        }
    }

    best.map(|(_, candidate)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_math::Frame;
    use orrery_physics::{BodyId, Collider, ColliderShape, PhysicsScene, SurfaceInfo};

    fn add_planet(scene: &mut PhysicsScene, at: Vec3, radius: f32, surface: bool) -> BodyId {
        let mut collider = Collider::new(
            ColliderShape::Sphere { radius },
            Frame::from_position(at),
            CollisionLayers::PLANET,
        );
        if surface {
            collider = collider.with_surface(SurfaceInfo {
                outer_radius: radius,
                surface_gravity: 9.0,
            });
        }
        scene.insert(collider)
    }

    #[test]
    fn test_margins() {
        assert_eq!(capture_margin(5.0), 0.0);
        assert_eq!(capture_margin(3.0), 0.0);
        assert_eq!(capture_margin(5.2), 1.0);
        assert_eq!(capture_margin(40.0), 35.0);
        assert_eq!(release_margin(5.0), 10.0);
        assert_eq!(release_margin(40.0), 115.0);
        assert_eq!(capture_threshold(5.0), 10.0);
        assert_eq!(capture_threshold(40.0), 150.0);
    }

    #[test]
    fn test_release_distance_clears_capture_threshold() {
        for r in [1.0, 5.0, 5.2, 7.5, 10.0, 40.0, 120.0, 240.0] {
            let release_distance = r + release_margin(r);
            assert!(
                release_distance >= capture_threshold(r) + RELEASE_HYSTERESIS - 1e-3,
                "R={r}: release at {release_distance}, capture below {}",
                capture_threshold(r)
            );
        }
    }

    #[test]
    fn test_position_past_release_distance_is_not_captured() {
        let mut scene = PhysicsScene::new();
        add_planet(&mut scene, Vec3::ZERO, 40.0, true);
        let p = Vec3::new(0.0, 40.0 + release_margin(40.0) + 0.01, 0.0);
        assert!(find_capture(&scene, p, p, 10_000.0).is_none());
    }

    #[test]
    fn test_capture_just_inside_threshold() {
        let mut scene = PhysicsScene::new();
        let id = add_planet(&mut scene, Vec3::ZERO, 5.0, true);
        let eps = 1e-3;

        // Player passes sideways at a constant offset along +Y.
        let y = capture_threshold(5.0) - eps;
        let hit = find_capture(&scene, Vec3::new(-50.0, y, 0.0), Vec3::new(50.0, y, 0.0), 10_000.0)
            .expect("threshold - eps must capture");
        assert_eq!(hit.body.id, id);
        assert!((hit.sweep_distance - y).abs() < 1e-4);
        assert_eq!(hit.release_margin, 10.0);
    }

    #[test]
    fn test_no_capture_just_outside_threshold() {
        let mut scene = PhysicsScene::new();
        add_planet(&mut scene, Vec3::ZERO, 5.0, true);
        let y = capture_threshold(5.0) + 1e-3;
        assert!(find_capture(&scene, Vec3::new(-50.0, y, 0.0), Vec3::new(50.0, y, 0.0), 10_000.0).is_none());
    }

    #[test]
    fn test_moving_planet_segment_is_used() {
        let mut scene = PhysicsScene::new();
        let id = add_planet(&mut scene, Vec3::new(100.0, 0.0, 0.0), 5.0, true);
        // The planet swept from x=100 to x=20 while the player sat near the origin.
        scene.set_frame(id, Frame::from_position(Vec3::new(20.0, 0.0, 0.0)));
        let p = Vec3::new(50.0, 8.0, 0.0);
        assert!(find_capture(&scene, p, p, 10_000.0).is_some());
    }

    #[test]
    fn test_nearest_passing_planet_wins() {
        let mut scene = PhysicsScene::new();
        let _far = add_planet(&mut scene, Vec3::new(0.0, 9.0, 0.0), 5.0, true);
        let near = add_planet(&mut scene, Vec3::new(0.0, -3.0, 6.0), 5.0, true);
        let hit = find_capture(&scene, Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0), 10_000.0).unwrap();
        assert_eq!(hit.body.id, near);
    }

    #[test]
    fn test_planet_without_surface_is_skipped() {
        let mut scene = PhysicsScene::new();
        add_planet(&mut scene, Vec3::new(3.0, 0.0, 0.0), 5.0, false);
        assert!(find_capture(&scene, Vec3::ZERO, Vec3::X, 10_000.0).is_none());
    }

    #[test]
    fn test_empty_scene_is_a_no_op() {
        let scene = PhysicsScene::new();
        assert!(find_capture(&scene, Vec3::ZERO, Vec3::X, 10_000.0).is_none());
    }
}
