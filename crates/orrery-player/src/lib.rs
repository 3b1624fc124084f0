//! Player locomotion across a solar system: inertial free flight, capture by
//! a nearby planet, hover flight and surface walking, and release.

mod capture;
mod input;
mod locomotion;

pub use capture::{
    CAPTURE_SWEEP_FACTOR, CaptureCandidate, MARGIN_BASE_RADIUS, RELEASE_EXTRA, RELEASE_HYSTERESIS,
    capture_margin, capture_threshold, find_capture, release_margin,
};
pub use input::InputSnapshot;
pub use locomotion::{
    FreeFlightState, Gait, LocomotionStateMachine, MAX_PITCH_DEG, Mode, ModeKind,
    PlanetRelativeState, Transition, free_flight_rotation, reject_steep_uphill,
};
