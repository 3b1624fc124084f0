//! Three-band vertex coloring by normalized radius.

use orrery_config::BandConfig;
use orrery_mesh::Color;

/// Relative radius spread below which a mesh counts as a perfect sphere.
const DEGENERATE_RANGE: f32 = 1e-5;

/// Low/mid/high palette with soft blend zones around two cutoffs.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorBands {
    pub cut_low_mid: f32,
    pub cut_mid_high: f32,
    /// Half-width of each blend zone; zero gives hard edges.
    pub half_width: f32,
    pub low: Color,
    pub mid: Color,
    pub high: Color,
}

impl ColorBands {
    pub fn from_config(config: &BandConfig) -> Self {
        let half_width = (config.max_blend_half_width * config.blend_softness).max(0.0);
        Self {
            cut_low_mid: config.cut_low_mid,
            cut_mid_high: config.cut_mid_high,
            half_width: if half_width.is_finite() { half_width } else { 0.0 },
            low: Color::from_array(config.low_color),
            mid: Color::from_array(config.mid_color),
            high: Color::from_array(config.high_color),
        }
    }

    /// Map `radius` into `[0, 1]` over `[min, max]`.
    ///
    /// A range within float noise of zero (or invalid) maps everything to 0,
    /// the low band.
    pub fn normalize(radius: f32, min: f32, max: f32) -> f32 {
        let range = max - min;
        let tolerance = DEGENERATE_RANGE * max.abs().max(1.0);
        if !(range.is_finite() && range > tolerance) {
            return 0.0;
        }
        ((radius - min) / range).clamp(0.0, 1.0)
    }

    /// Color for a normalized height `h01`.
    pub fn color_at(&self, h01: f32) -> Color {
        if !h01.is_finite() {
            return self.low;
        }
        let w = self.half_width;
        let (a, b) = (self.cut_low_mid, self.cut_mid_high);

        if h01 < a - w {
            self.low
        } else if h01 < a + w {
            self.low.lerp(self.mid, inverse_lerp(a - w, a + w, h01))
        } else if h01 < b - w {
            self.mid
        } else if h01 < b + w {
            self.mid.lerp(self.high, inverse_lerp(b - w, b + w, h01))
        } else {
            self.high
        }
    }
}

fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    let span = b - a;
    if span.abs() <= f32::EPSILON {
        0.0
    } else {
        ((v - a) / span).clamp(0.0, 1.0)
    }
}
