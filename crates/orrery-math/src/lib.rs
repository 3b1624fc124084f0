//! Rigid frames, segment distance, and guarded vector math for the orrery crates.

mod frame;
mod segment;
mod vector;

pub use frame::Frame;
pub use segment::{SegmentClosest, closest_points_segments, segment_distance};
pub use vector::{ZERO_LENGTH_SQ, angle_between_deg, clamp_length, normalize_or, project_on_plane};
