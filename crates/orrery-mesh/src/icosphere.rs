//! Geodesic sphere built by recursively subdividing an icosahedron.

use std::collections::HashMap;

use glam::Vec3;
use tracing::debug;

use crate::{Mesh, MeshError};

/// Deepest subdivision accepted by [`IcoSphere::build`].
pub const MAX_SUBDIVISION: u32 = 7;

/// The 20 faces of the base icosahedron, counter-clockwise seen from outside.
const ICOSAHEDRON_FACES: [[u32; 3]; 20] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Icosphere mesher.
pub struct IcoSphere;

impl IcoSphere {
    /// Build a sphere of `radius` after `level` 4-way subdivisions.
    pub fn build(level: u32, radius: f32) -> Result<Mesh, MeshError> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(MeshError::InvalidRadius(radius));
        }
        let mut mesh = Self::build_unit(level)?;
        for p in &mut mesh.positions {
            *p *= radius;
        }
        mesh.recalculate_bounds();
        Ok(mesh)
    }

    /// Unit-radius sphere; positions double as vertex directions.
    pub fn build_unit(level: u32) -> Result<Mesh, MeshError> {
        if level > MAX_SUBDIVISION {
            return Err(MeshError::SubdivisionTooDeep {
                level,
                max: MAX_SUBDIVISION,
            });
        }

        let mut positions = icosahedron_vertices();
        let mut triangles = ICOSAHEDRON_FACES.to_vec();

        for _ in 0..level {
            triangles = subdivide(&mut positions, &triangles);
        }

        debug!(
            level,
            vertices = positions.len(),
            triangles = triangles.len(),
            "built icosphere"
        );

        let mut mesh = Mesh {
            name: format!("IcoSphere_{level}"),
            positions,
            triangles,
            ..Default::default()
        };
        mesh.recalculate_normals();
        mesh.recalculate_bounds();
        Ok(mesh)
    }
}

/// Vertices after `level` subdivisions: each level adds one vertex per edge.
pub fn vertex_count_for_level(level: u32) -> usize {
    let (mut vertices, mut edges, mut faces) = (12usize, 30usize, 20usize);
    for _ in 0..level {
        vertices += edges;
        // Every edge splits in two and each old face adds 3 interior edges.
        edges = edges * 2 + faces * 3;
        faces *= 4;
    }
    vertices
}

/// Faces after `level` subdivisions.
pub fn triangle_count_for_level(level: u32) -> usize {
    20 * 4usize.pow(level)
}

fn icosahedron_vertices() -> Vec<Vec3> {
    let t = (1.0 + 5.0_f32.sqrt()) * 0.5;
    [
        Vec3::new(-1.0, t, 0.0),
        Vec3::new(1.0, t, 0.0),
        Vec3::new(-1.0, -t, 0.0),
        Vec3::new(1.0, -t, 0.0),
        Vec3::new(0.0, -1.0, t),
        Vec3::new(0.0, 1.0, t),
        Vec3::new(0.0, -1.0, -t),
        Vec3::new(0.0, 1.0, -t),
        Vec3::new(t, 0.0, -1.0),
        Vec3::new(t, 0.0, 1.0),
        Vec3::new(-t, 0.0, -1.0),
        Vec3::new(-t, 0.0, 1.0),
    ]
    .into_iter()
    .map(Vec3::normalize)
    .collect()
}

/// Split every triangle into 4, sharing midpoints across edges.
fn subdivide(positions: &mut Vec<Vec3>, triangles: &[[u32; 3]]) -> Vec<[u32; 3]> {
    let mut midpoint_cache: HashMap<(u32, u32), u32> = HashMap::with_capacity(triangles.len() * 3 / 2);
    let mut new_triangles = Vec::with_capacity(triangles.len() * 4);

    let mut midpoint = |a: u32, b: u32, positions: &mut Vec<Vec3>| -> u32 {
        let key = if a < b { (a, b) } else { (b, a) };
        *midpoint_cache.entry(key).or_insert_with(|| {
            // Projected onto the sphere, not left on the flat face.
            let mid = (positions[a as usize] + positions[b as usize]).normalize();
            positions.push(mid);
            (positions.len() - 1) as u32
        })
    };

    for &[v1, v2, v3] in triangles {
        let a = midpoint(v1, v2, positions);
        let b = midpoint(v2, v3, positions);
        let c = midpoint(v3, v1, positions);

        new_triangles.push([v1, a, c]);
        new_triangles.push([v2, b, a]);
        new_triangles.push([v3, c, b]);
        new_triangles.push([a, b, c]);
    }

    new_triangles
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_vertex_count_recurrence() {
        // V(L) = 10 * 4^L + 2 for icosahedral subdivision.
        for level in 0..=5 {
            assert_eq!(
                vertex_count_for_level(level),
                10 * 4usize.pow(level) + 2,
                "recurrence disagrees at level {level}"
            );
        }
    }

    #[test]
    fn test_counts_match_recurrence_levels_0_to_5() {
        for level in 0..=5 {
            let mesh = IcoSphere::build(level, 3.5).unwrap();
            assert_eq!(mesh.vertex_count(), vertex_count_for_level(level));
            assert_eq!(mesh.triangle_count(), triangle_count_for_level(level));
        }
    }

    #[test]
    fn test_vertices_lie_on_radius() {
        for level in 0..=5 {
            let radius = 7.25;
            let mesh = IcoSphere::build(level, radius).unwrap();
            for p in &mesh.positions {
                assert!(
                    (p.length() - radius).abs() < 1e-4,
                    "vertex {p:?} at {} not on radius {radius} (level {level})",
                    p.length()
                );
            }
        }
    }

    #[test]
    fn test_level_two_has_no_duplicate_vertices() {
        let mesh = IcoSphere::build(2, 1.0).unwrap();
        let level1_vertices = vertex_count_for_level(1);
        let level1_edges = 30 * 4;
        assert_eq!(mesh.vertex_count(), level1_vertices + level1_edges);

        let unique: HashSet<[i32; 3]> = mesh
            .positions
            .iter()
            .map(|p| {
                let q = (*p * 1e5).round();
                [q.x as i32, q.y as i32, q.z as i32]
            })
            .collect();
        assert_eq!(unique.len(), mesh.vertex_count(), "duplicate positions found");
        assert_eq!(unique.len(), 162);
    }

    #[test]
    fn test_every_edge_shared_by_two_triangles() {
        let mesh = IcoSphere::build_unit(3).unwrap();
        let mut edges: HashMap<(u32, u32), u32> = HashMap::new();
        for &[a, b, c] in &mesh.triangles {
            for (x, y) in [(a, b), (b, c), (c, a)] {
                *edges.entry((x.min(y), x.max(y))).or_default() += 1;
            }
        }
        assert!(edges.values().all(|&n| n == 2), "mesh is not closed");
    }

    #[test]
    fn test_winding_is_outward() {
        for level in 0..=3 {
            let mesh = IcoSphere::build_unit(level).unwrap();
            for &[a, b, c] in &mesh.triangles {
                let (pa, pb, pc) = (
                    mesh.positions[a as usize],
                    mesh.positions[b as usize],
                    mesh.positions[c as usize],
                );
                let normal = (pb - pa).cross(pc - pa);
                let centroid = (pa + pb + pc) / 3.0;
                assert!(normal.dot(centroid) > 0.0, "inward face at level {level}");
            }
        }
    }

    #[test]
    fn test_normals_point_outward() {
        let mesh = IcoSphere::build(3, 2.0).unwrap();
        for (n, p) in mesh.normals.iter().zip(&mesh.positions) {
            assert!(n.dot(p.normalize()) > 0.99);
        }
    }

    #[test]
    fn test_indices_valid_and_bounds_match_radius() {
        let mesh = IcoSphere::build(4, 12.0).unwrap();
        assert!(mesh.is_valid());
        assert!((mesh.bounds.radius - 12.0).abs() < 1e-3);
        assert!((mesh.bounds.max.y - 12.0).abs() < 0.5);
    }

    #[test]
    fn test_invalid_radius_rejected() {
        assert_eq!(IcoSphere::build(1, -2.0).unwrap_err(), MeshError::InvalidRadius(-2.0));
        assert!(IcoSphere::build(1, 0.0).is_err());
        assert!(IcoSphere::build(1, f32::NAN).is_err());
    }

    #[test]
    fn test_too_deep_rejected() {
        assert!(matches!(
            IcoSphere::build(MAX_SUBDIVISION + 1, 1.0),
            Err(MeshError::SubdivisionTooDeep { .. })
        ));
    }
}
