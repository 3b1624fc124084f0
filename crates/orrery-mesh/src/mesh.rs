//! Indexed triangle mesh with per-vertex normals and colors.

use glam::Vec3;

use crate::Color;

/// Axis-aligned bounds plus the farthest vertex distance from the origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
    /// Largest vertex magnitude. For a planet this is its outer radius.
    pub radius: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: Vec3::ZERO,
            max: Vec3::ZERO,
            radius: 0.0,
        }
    }
}

impl Bounds {
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }
}

/// Renderable triangle mesh centered on the origin.
///
/// Invariant: every index in `triangles` is `< positions.len()`, and
/// `normals`/`colors` are either empty or the same length as `positions`.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub name: String,
    pub positions: Vec<Vec3>,
    /// Counter-clockwise (outward-facing) triangles.
    pub triangles: Vec<[u32; 3]>,
    pub normals: Vec<Vec3>,
    pub colors: Vec<Color>,
    pub bounds: Bounds,
}

impl Mesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Flattened index buffer for renderers that want `u32` triples.
    pub fn indices(&self) -> Vec<u32> {
        self.triangles.iter().flatten().copied().collect()
    }

    /// Area-weighted vertex normals.
    ///
    /// Vertices that end up with no usable face contribution (isolated or
    /// only degenerate triangles) fall back to their radial direction.
    pub fn recalculate_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];

        for &[a, b, c] in &self.triangles {
            let (pa, pb, pc) = (
                self.positions[a as usize],
                self.positions[b as usize],
                self.positions[c as usize],
            );
            // Length is twice the triangle area
            let face = (pb - pa).cross(pc - pa);
            normals[a as usize] += face;
            normals[b as usize] += face;
            normals[c as usize] += face;
        }

        for (normal, position) in normals.iter_mut().zip(&self.positions) {
            let radial = position.try_normalize().unwrap_or(Vec3::Y);
            *normal = normal.try_normalize().unwrap_or(radial);
        }

        self.normals = normals;
    }

    pub fn recalculate_bounds(&mut self) {
        let Some(&first) = self.positions.first() else {
            self.bounds = Bounds::default();
            return;
        };

        let mut bounds = Bounds {
            min: first,
            max: first,
            radius: 0.0,
        };
        for &p in &self.positions {
            bounds.min = bounds.min.min(p);
            bounds.max = bounds.max.max(p);
            bounds.radius = bounds.radius.max(p.length());
        }
        self.bounds = bounds;
    }

    /// Smallest and largest vertex distance from the origin.
    pub fn radius_range(&self) -> Option<(f32, f32)> {
        self.positions.iter().map(|p| p.length()).fold(None, |acc, r| match acc {
            None => Some((r, r)),
            Some((lo, hi)) => Some((lo.min(r), hi.max(r))),
        })
    }

    /// Check the index and attribute invariants.
    pub fn is_valid(&self) -> bool {
        let n = self.positions.len();
        let attrs_ok = (self.normals.is_empty() || self.normals.len() == n)
            && (self.colors.is_empty() || self.colors.len() == n);
        attrs_ok
            && self
                .triangles
                .iter()
                .all(|tri| tri.iter().all(|&i| (i as usize) < n))
    }

    /// Paint every vertex with one color.
    pub fn fill_colors(&mut self, color: Color) {
        self.colors = vec![color; self.positions.len()];
    }
}
