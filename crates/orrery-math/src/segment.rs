//! Closest points between line segments.

use glam::Vec3;

/// Squared length below which a segment is treated as a point.
const DEGENERATE_EPSILON: f32 = 1e-6;

/// Result of a segment-segment closest point query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentClosest {
    /// Parameter along the first segment, in `[0, 1]`.
    pub s: f32,
    /// Parameter along the second segment, in `[0, 1]`.
    pub t: f32,
    /// Closest point on the first segment.
    pub point_a: Vec3,
    /// Closest point on the second segment.
    pub point_b: Vec3,
}

impl SegmentClosest {
    pub fn distance(&self) -> f32 {
        self.point_a.distance(self.point_b)
    }
}

/// Closest points between segments `p1..q1` and `p2..q2`.
///
/// Follows Ericson, *Real-Time Collision Detection* §5.1.9. Either segment
/// may be degenerate (a single point).
pub fn closest_points_segments(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> SegmentClosest {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.dot(d1);
    let e = d2.dot(d2);
    let f = d2.dot(r);

    let (s, t) = if a <= DEGENERATE_EPSILON && e <= DEGENERATE_EPSILON {
        (0.0, 0.0)
    } else if a <= DEGENERATE_EPSILON {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(r);
        if e <= DEGENERATE_EPSILON {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(d2);
            let denom = a * e - b * b;

            // Parallel segments: any s works, pick the start and let t fix it.
            let mut s = if denom > 0.0 {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let mut t = (b * s + f) / e;

            if t < 0.0 {
                t = 0.0;
                s = (-c / a).clamp(0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = ((b - c) / a).clamp(0.0, 1.0);
            }
            (s, t)
        }
    };

    SegmentClosest {
        s,
        t,
        point_a: p1 + d1 * s,
        point_b: p2 + d2 * t,
    }
}

/// Minimum distance between segments `p1..q1` and `p2..q2`.
pub fn segment_distance(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> f32 {
    closest_points_segments(p1, q1, p2, q2).distance()
}
