//! Linear RGBA vertex color.

use bytemuck::{Pod, Zeroable};

/// Per-vertex color, laid out for direct upload as a vertex attribute.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Color {
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);
    pub const GREEN: Self = Self::rgba(0.0, 1.0, 0.0, 1.0);
    pub const GREY: Self = Self::rgba(0.5, 0.5, 0.5, 1.0);
    pub const YELLOW: Self = Self::rgba(1.0, 0.92, 0.016, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_array([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }

    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// Component-wise linear interpolation, `t` clamped to `[0, 1]`.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    /// Convert hue/saturation/value (all in `[0, 1]`) to an opaque color.
    pub fn from_hsv(hue: f32, saturation: f32, value: f32) -> Self {
        let h = hue.rem_euclid(1.0) * 6.0;
        let s = saturation.clamp(0.0, 1.0);
        let v = value.clamp(0.0, 1.0);

        let sector = h.floor();
        let f = h - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - s * f);
        let t = v * (1.0 - s * (1.0 - f));

        let (r, g, b) = match sector as u32 {
            0 => (v, t, p),
            1 => (q, v, p),
            2 => (p, v, t),
            3 => (p, q, v),
            4 => (t, p, v),
            _ => (v, p, q),
        };
        Self::rgba(r, g, b, 1.0)
    }

    pub fn with_alpha(self, a: f32) -> Self {
        Self { a, ..self }
    }

    pub fn is_finite(&self) -> bool {
        self.r.is_finite() && self.g.is_finite() && self.b.is_finite() && self.a.is_finite()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Color, b: Color) -> bool {
        a.to_array()
            .iter()
            .zip(b.to_array())
            .all(|(x, y)| (x - y).abs() < 1e-5)
    }

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        assert!(approx(Color::GREEN.lerp(Color::WHITE, 0.0), Color::GREEN));
        assert!(approx(Color::GREEN.lerp(Color::WHITE, 1.0), Color::WHITE));
        assert!(approx(
            Color::GREEN.lerp(Color::WHITE, 0.5),
            Color::rgba(0.5, 1.0, 0.5, 1.0)
        ));
    }

    #[test]
    fn test_lerp_clamps() {
        assert!(approx(Color::GREEN.lerp(Color::WHITE, 3.0), Color::WHITE));
    }

    #[test]
    fn test_hsv_primaries() {
        assert!(approx(Color::from_hsv(0.0, 1.0, 1.0), Color::rgba(1.0, 0.0, 0.0, 1.0)));
        assert!(approx(Color::from_hsv(1.0 / 3.0, 1.0, 1.0), Color::rgba(0.0, 1.0, 0.0, 1.0)));
        assert!(approx(Color::from_hsv(2.0 / 3.0, 1.0, 1.0), Color::rgba(0.0, 0.0, 1.0, 1.0)));
        assert!(approx(Color::from_hsv(0.5, 0.0, 0.25), Color::rgba(0.25, 0.25, 0.25, 1.0)));
    }

    #[test]
    fn test_pod_layout() {
        let colors = [Color::GREEN, Color::YELLOW];
        let bytes: &[u8] = bytemuck::cast_slice(&colors);
        assert_eq!(bytes.len(), 32);
    }
}
