//! Player locomotion: inertial free flight between planets, and flight or
//! walking relative to a captured planet.
//!
//! One [`LocomotionStateMachine`] holds every mode's data in a tagged [`Mode`]
//! and dispatches on it each tick. While captured, the planet-local offset is
//! the only stored position; world position is re-derived from the planet's
//! current frame before anything reads it, so orbiting and spinning planets
//! carry the player along.
//!
//! Each simulation tick runs [`update_variable`](LocomotionStateMachine::update_variable)
//! (look, orientation, capture test) and then zero or more
//! [`update_fixed`](LocomotionStateMachine::update_fixed) steps (movement,
//! probes, offset recompute, release check).

use glam::{Quat, Vec2, Vec3};
use orrery_config::{FreeFlightConfig, LocomotionConfig};
use orrery_math::{ZERO_LENGTH_SQ, angle_between_deg, clamp_length, normalize_or, project_on_plane};
use orrery_physics::{BodyId, BodySnapshot, CollisionLayers, SceneQuery};
use tracing::{info, warn};

use crate::{InputSnapshot, find_capture};

/// Camera pitch limit in degrees, either side of the horizon.
pub const MAX_PITCH_DEG: f32 = 89.0;

/// Smallest push-out that counts as touching the ground.
const CONTACT_EPSILON: f32 = 0.01;
/// How far past the feet the walk probe starts.
const WALK_PROBE_EXTRA: f32 = 0.6;
/// Height and radius of the forward wall probe.
const WALL_PROBE_RAISE: f32 = 0.5;
const WALL_PROBE_RADIUS: f32 = 0.5;

// --- State ---

/// Sub-mode while attached to a planet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Gait {
    Flight,
    Walk,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FreeFlightState {
    pub velocity: Vec3,
    /// Position at the previous variable update; start of the capture sweep.
    pub last_position: Vec3,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanetRelativeState {
    /// Looked up every tick; a missing body means the planet is gone.
    pub planet: BodyId,
    pub outer_radius: f32,
    pub release_margin: f32,
    pub gravity: f32,
    /// Player position in the planet's local frame.
    pub local_offset: Vec3,
    pub gait: Gait,
    /// Radial speed under gravity; only integrated while walking.
    pub vertical_velocity: f32,
}

impl PlanetRelativeState {
    /// Height above the outer radius.
    pub fn altitude(&self) -> f32 {
        self.local_offset.length() - self.outer_radius
    }

    /// Local offset length beyond which the planet lets go.
    pub fn release_distance(&self) -> f32 {
        self.outer_radius + self.release_margin
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mode {
    FreeFlight(FreeFlightState),
    PlanetRelative(PlanetRelativeState),
}

/// Flattened mode discriminant for logging and assertions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModeKind {
    FreeFlight,
    PlanetFlight,
    PlanetWalk,
}

/// A mode change reported by an update.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Transition {
    Captured { planet: BodyId, altitude: f32 },
    Landed { planet: BodyId },
    TookOff { planet: BodyId },
    Released { planet: BodyId, altitude: f32 },
    /// The captured planet disappeared; treated as a release.
    PlanetLost { planet: BodyId },
}

// --- Machine ---

#[derive(Clone, Debug)]
pub struct LocomotionStateMachine {
    mode: Mode,
    position: Vec3,
    /// Body orientation. Forward is -Z, right +X, up +Y.
    orientation: Quat,
    /// Accumulated yaw in degrees.
    yaw: f32,
    /// Look pitch in degrees, clamped to `±MAX_PITCH_DEG`.
    pitch: f32,
    locomotion: LocomotionConfig,
    free_flight: FreeFlightConfig,
}

impl LocomotionStateMachine {
    /// Start in free flight at `position`, level, facing `yaw_deg`.
    pub fn new(
        position: Vec3,
        yaw_deg: f32,
        locomotion: LocomotionConfig,
        free_flight: FreeFlightConfig,
    ) -> Self {
        Self {
            mode: Mode::FreeFlight(FreeFlightState {
                velocity: Vec3::ZERO,
                last_position: position,
            }),
            position,
            orientation: free_flight_rotation(yaw_deg, 0.0),
            yaw: yaw_deg,
            pitch: 0.0,
            locomotion,
            free_flight,
        }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn kind(&self) -> ModeKind {
        match self.mode {
            Mode::FreeFlight(_) => ModeKind::FreeFlight,
            Mode::PlanetRelative(PlanetRelativeState {
                gait: Gait::Flight, ..
            }) => ModeKind::PlanetFlight,
            Mode::PlanetRelative(PlanetRelativeState {
                gait: Gait::Walk, ..
            }) => ModeKind::PlanetWalk,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn forward(&self) -> Vec3 {
        self.orientation * Vec3::NEG_Z
    }

    pub fn up(&self) -> Vec3 {
        self.orientation * Vec3::Y
    }

    /// Camera rotation. Free flight bakes pitch into the body; on a planet
    /// pitch only tilts the camera.
    pub fn view_rotation(&self) -> Quat {
        match self.mode {
            Mode::FreeFlight(_) => self.orientation,
            Mode::PlanetRelative(_) => {
                self.orientation * Quat::from_rotation_x(self.pitch.to_radians())
            }
        }
    }

    pub fn captured_planet(&self) -> Option<BodyId> {
        match self.mode {
            Mode::PlanetRelative(state) => Some(state.planet),
            Mode::FreeFlight(_) => None,
        }
    }

    /// Height above the captured planet's outer radius.
    pub fn altitude(&self) -> Option<f32> {
        match self.mode {
            Mode::PlanetRelative(state) => Some(state.altitude()),
            Mode::FreeFlight(_) => None,
        }
    }

    /// Free-flight velocity; zero while captured.
    pub fn velocity(&self) -> Vec3 {
        match self.mode {
            Mode::FreeFlight(state) => state.velocity,
            Mode::PlanetRelative(_) => Vec3::ZERO,
        }
    }

    /// Set the free-flight velocity. Returns `false` (and does nothing) while captured.
    pub fn set_velocity(&mut self, velocity: Vec3) -> bool {
        match &mut self.mode {
            Mode::FreeFlight(state) => {
                state.velocity = velocity;
                true
            }
            Mode::PlanetRelative(_) => false,
        }
    }

    /// Turn to look at `target` while in free flight.
    pub fn face_towards(&mut self, target: Vec3) -> bool {
        if !matches!(self.mode, Mode::FreeFlight(_)) {
            return false;
        }
        let dir = target - self.position;
        let Some(dir) = dir.try_normalize() else {
            return false;
        };
        if dir.x.abs() + dir.z.abs() > 1e-6 {
            self.yaw = dir.x.atan2(-dir.z).to_degrees();
        }
        self.pitch = dir.y.clamp(-1.0, 1.0).asin().to_degrees().clamp(-MAX_PITCH_DEG, MAX_PITCH_DEG);
        self.orientation = free_flight_rotation(self.yaw, self.pitch);
        true
    }

    // --- Variable-rate phase ---

    /// Look, orientation and the capture test.
    pub fn update_variable<Q: SceneQuery + ?Sized>(
        &mut self,
        input: &InputSnapshot,
        dt: f32,
        scene: &Q,
    ) -> Vec<Transition> {
        let mut transitions = Vec::new();

        match self.mode {
            Mode::FreeFlight(state) => {
                let start = self.position;
                self.free_look(input.look);

                let search = self.free_flight.capture_search_radius;
                match find_capture(scene, state.last_position, start, search) {
                    Some(hit) => transitions.push(self.capture(
                        &hit.body,
                        hit.outer_radius,
                        hit.release_margin,
                        hit.surface_gravity,
                    )),
                    None => {
                        if let Mode::FreeFlight(state) = &mut self.mode {
                            state.last_position = start;
                        }
                    }
                }
            }
            Mode::PlanetRelative(state) => {
                let Some(body) = scene.body(state.planet) else {
                    transitions.push(self.lose_planet(state.planet));
                    return transitions;
                };
                self.position = body.frame.transform_point(state.local_offset);
                let radial_up = self.radial_up(&body);
                self.surface_look(input.look, radial_up, dt);
            }
        }

        transitions
    }

    fn free_look(&mut self, look: Vec2) {
        let sensitivity = self.free_flight.look_sensitivity;
        self.yaw += look.x * sensitivity;
        self.pitch = (self.pitch + look.y * sensitivity).clamp(-MAX_PITCH_DEG, MAX_PITCH_DEG);
        self.orientation = free_flight_rotation(self.yaw, self.pitch);
    }

    fn surface_look(&mut self, look: Vec2, radial_up: Vec3, dt: f32) {
        let sensitivity = self.locomotion.look_sensitivity;
        let turn = look.x * sensitivity;
        self.yaw += turn;
        self.pitch = (self.pitch + look.y * sensitivity).clamp(-MAX_PITCH_DEG, MAX_PITCH_DEG);

        // Turning right is a negative rotation about up.
        let yaw_rotation = Quat::from_axis_angle(radial_up, -turn.to_radians());
        self.orientation = (yaw_rotation * self.orientation).normalize();
        self.align_up(radial_up, dt);
    }

    /// Blend body up toward `radial_up` at `up_alignment_rate` per second.
    fn align_up(&mut self, radial_up: Vec3, dt: f32) {
        let rate = self.locomotion.up_alignment_rate;
        let target = up_aligned(self.orientation, radial_up);
        let t = if rate.is_finite() && rate > 0.0 {
            1.0 - (-rate * dt.max(0.0)).exp()
        } else {
            1.0
        };
        self.orientation = self.orientation.slerp(target, t).normalize();
    }

    // --- Fixed-rate phase ---

    /// Movement, probes, offset recompute and the release check.
    pub fn update_fixed<Q: SceneQuery + ?Sized>(
        &mut self,
        input: &InputSnapshot,
        dt: f32,
        scene: &Q,
    ) -> Vec<Transition> {
        let mut transitions = Vec::new();
        if !(dt.is_finite() && dt > 0.0) {
            return transitions;
        }

        match self.mode {
            Mode::FreeFlight(state) => self.free_flight_step(state, input, dt),
            Mode::PlanetRelative(mut state) => {
                let Some(body) = scene.body(state.planet) else {
                    transitions.push(self.lose_planet(state.planet));
                    return transitions;
                };
                self.position = body.frame.transform_point(state.local_offset);
                let radial_up = self.radial_up(&body);

                match state.gait {
                    Gait::Flight => {
                        self.planet_flight_step(&mut state, input, radial_up, dt, scene, &mut transitions)
                    }
                    Gait::Walk => {
                        self.walk_step(&mut state, input, radial_up, dt, scene, &mut transitions)
                    }
                }

                state.local_offset = body.frame.inverse_transform_point(self.position);
                self.mode = Mode::PlanetRelative(state);

                if state.local_offset.length() > state.release_distance() {
                    transitions.extend(self.release());
                }
            }
        }

        transitions
    }

    fn free_flight_step(&mut self, state: FreeFlightState, input: &InputSnapshot, dt: f32) {
        let cfg = &self.free_flight;
        let dir = input.movement_dir();
        let up = self.orientation * Vec3::Y;
        let mut desired = self.orientation * Vec3::NEG_Z * dir.y + self.orientation * Vec3::X * dir.x;
        if input.ascend {
            desired += up;
        }
        if input.descend {
            desired -= up;
        }

        let mut velocity = state.velocity;
        if desired.length_squared() > ZERO_LENGTH_SQ {
            velocity += desired.normalize() * cfg.accel_rate * dt;
            velocity = clamp_length(velocity, cfg.max_speed);
        } else {
            let speed = (velocity.length() - cfg.decel_rate * dt).max(0.0);
            velocity = velocity.normalize_or_zero() * speed;
        }

        self.position += velocity * dt;
        self.mode = Mode::FreeFlight(FreeFlightState { velocity, ..state });
    }

    fn planet_flight_step<Q: SceneQuery + ?Sized>(
        &mut self,
        state: &mut PlanetRelativeState,
        input: &InputSnapshot,
        radial_up: Vec3,
        dt: f32,
        scene: &Q,
        transitions: &mut Vec<Transition>,
    ) {
        let cfg = &self.locomotion;
        let dir = input.movement_dir();
        let forward = self.orientation * Vec3::NEG_Z;
        let right = self.orientation * Vec3::X;

        let tangent = normalize_or(
            project_on_plane(forward * dir.y + right * dir.x, radial_up),
            Vec3::ZERO,
        );

        let mut motion = tangent * cfg.hover_speed * dt;
        if input.descend {
            motion -= radial_up * cfg.radial_speed * dt;
        }
        if input.ascend {
            motion += radial_up * cfg.radial_speed * dt;
        }
        self.position += motion;

        // Push-only terrain clamp.
        let lift = cfg.flight_probe_lift;
        let reach = (state.outer_radius * 2.0).max(lift + cfg.surface_clearance + cfg.foot_radius);
        let Some(hit) = scene.sphere_cast(
            self.position + radial_up * lift,
            cfg.foot_radius,
            -radial_up,
            reach,
            CollisionLayers::PLANET,
        ) else {
            return;
        };

        let gap = hit.distance - lift;
        let push = cfg.surface_clearance - gap;
        if push > CONTACT_EPSILON {
            self.position += radial_up * push.min(cfg.ground_snap_speed * dt);
            if !input.ascend {
                state.gait = Gait::Walk;
                state.vertical_velocity = 0.0;
                info!(planet = state.planet.0, "Mode -> Walk");
                transitions.push(Transition::Landed {
                    planet: state.planet,
                });
            }
        }
    }

    fn walk_step<Q: SceneQuery + ?Sized>(
        &mut self,
        state: &mut PlanetRelativeState,
        input: &InputSnapshot,
        radial_up: Vec3,
        dt: f32,
        scene: &Q,
        transitions: &mut Vec<Transition>,
    ) {
        let cfg = &self.locomotion;
        let dir = input.movement_dir();
        let forward = self.orientation * Vec3::NEG_Z;
        let right = self.orientation * Vec3::X;
        let mut desired = normalize_or(
            project_on_plane(forward * dir.y + right * dir.x, radial_up),
            Vec3::ZERO,
        );

        if desired != Vec3::ZERO {
            if let Some(wall) = scene.sphere_cast(
                self.position + radial_up * WALL_PROBE_RAISE,
                WALL_PROBE_RADIUS,
                desired,
                cfg.wall_check_ahead,
                CollisionLayers::PLANET,
            ) {
                desired = reject_steep_uphill(desired, wall.normal, radial_up, cfg.max_walk_slope_deg);
            }
        }

        let mut motion = desired * cfg.walk_speed * dt;
        state.vertical_velocity -= state.gravity * dt;

        let lift = cfg.surface_clearance + WALK_PROBE_EXTRA;
        let reach = lift + cfg.surface_clearance + CONTACT_EPSILON;
        let mut grounded = false;
        if let Some(ground) = scene.sphere_cast(
            self.position + radial_up * lift,
            cfg.foot_radius,
            -radial_up,
            reach,
            CollisionLayers::PLANET,
        ) {
            if angle_between_deg(ground.normal, radial_up) > cfg.max_walk_slope_deg {
                // Too steep to stand on: only slide along the ground plane.
                motion = project_on_plane(desired, ground.normal) * cfg.walk_speed * dt;
            }

            let gap = ground.distance - lift;
            if gap < cfg.surface_clearance + CONTACT_EPSILON {
                grounded = true;
                if state.vertical_velocity < 0.0 {
                    state.vertical_velocity = 0.0;
                }
                let push = (cfg.surface_clearance - gap).clamp(0.0, cfg.ground_snap_speed * dt);
                self.position += radial_up * push;
            }
        }

        if input.jump && !input.modifier && grounded {
            state.vertical_velocity = cfg.jump_speed;
        } else if input.jump && input.modifier && !grounded {
            state.gait = Gait::Flight;
            state.vertical_velocity = 0.0;
            info!(planet = state.planet.0, "Mode -> Flight");
            transitions.push(Transition::TookOff {
                planet: state.planet,
            });
            return;
        }

        motion += radial_up * state.vertical_velocity * dt;
        self.position += motion;
    }

    // --- Transitions ---

    /// Attach to `planet`: store the local offset, align up to the planet and
    /// start in flight. Replaces any current capture.
    pub fn capture(
        &mut self,
        planet: &BodySnapshot,
        outer_radius: f32,
        release_margin: f32,
        gravity: f32,
    ) -> Transition {
        let radial_up = self.radial_up(planet);
        self.orientation = up_aligned(self.orientation, radial_up);
        self.pitch = 0.0;

        let state = PlanetRelativeState {
            planet: planet.id,
            outer_radius,
            release_margin,
            gravity,
            local_offset: planet.frame.inverse_transform_point(self.position),
            gait: Gait::Flight,
            vertical_velocity: 0.0,
        };
        self.mode = Mode::PlanetRelative(state);

        let altitude = state.altitude();
        info!(planet = planet.id.0, radius = outer_radius, altitude, "Captured by planet");
        Transition::Captured {
            planet: planet.id,
            altitude,
        }
    }

    /// Drop the captured planet and return to level free flight.
    ///
    /// Returns `None` when already in free flight.
    pub fn release(&mut self) -> Option<Transition> {
        let Mode::PlanetRelative(state) = self.mode else {
            return None;
        };
        let altitude = state.altitude();
        self.enter_free_flight();
        info!(
            planet = state.planet.0,
            radius = state.outer_radius,
            altitude,
            "Released from planet"
        );
        Some(Transition::Released {
            planet: state.planet,
            altitude,
        })
    }

    fn lose_planet(&mut self, planet: BodyId) -> Transition {
        warn!(planet = planet.0, "Captured planet no longer exists, releasing");
        self.enter_free_flight();
        Transition::PlanetLost { planet }
    }

    /// Keep yaw, zero pitch and roll, and stop.
    fn enter_free_flight(&mut self) {
        let forward = self.orientation * Vec3::NEG_Z;
        if forward.x.abs() + forward.z.abs() > 1e-4 {
            self.yaw = forward.x.atan2(-forward.z).to_degrees();
        }
        self.pitch = 0.0;
        self.orientation = free_flight_rotation(self.yaw, 0.0);
        self.mode = Mode::FreeFlight(FreeFlightState {
            velocity: Vec3::ZERO,
            last_position: self.position,
        });
    }

    fn radial_up(&self, planet: &BodySnapshot) -> Vec3 {
        normalize_or(self.position - planet.frame.position, self.orientation * Vec3::Y)
    }
}

// --- Helpers ---

/// Body rotation for free flight: yaw about world Y, then pitch.
pub fn free_flight_rotation(yaw_deg: f32, pitch_deg: f32) -> Quat {
    Quat::from_rotation_y(-yaw_deg.to_radians()) * Quat::from_rotation_x(pitch_deg.to_radians())
}

/// `orientation` turned by the shortest arc that maps its up onto `up`.
fn up_aligned(orientation: Quat, up: Vec3) -> Quat {
    let current = orientation * Vec3::Y;
    (Quat::from_rotation_arc(current, up) * orientation).normalize()
}

/// Remove the part of `desired` that climbs a surface steeper than `max_slope_deg`.
///
/// Surfaces at or below the limit leave `desired` unchanged, as does motion
/// that runs along or away from the slope.
pub fn reject_steep_uphill(desired: Vec3, normal: Vec3, up: Vec3, max_slope_deg: f32) -> Vec3 {
    if angle_between_deg(normal, up) <= max_slope_deg {
        return desired;
    }
    let uphill = normalize_or(-project_on_plane(normal, up), Vec3::ZERO);
    let into = desired.dot(uphill);
    if into > 0.0 { desired - uphill * into } else { desired }
}

#[cfg(test)]
#[path = "locomotion_tests.rs"]
mod tests;
