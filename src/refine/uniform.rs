use super::edges::EdgeMidpoints;
use super::store::VertexStore;
use super::subdivide::quadrisect;
use crate::error::RefineError;
use crate::field::ScalarField;
use crate::geometry::{icosahedron_corners, ICOSAHEDRON_FACE_INDICES};
use crate::mesh::Mesh;

/// Uniformly subdivided icosphere with every vertex sampled from `field`.
///
/// Each level splits every triangle 1-to-4 with a shared midpoint cache, giving
/// `10·4^L + 2` vertices and `20·4^L` triangles. Used as the baseline that
/// adaptive meshes are compared against.
pub fn uniform_icosphere<F: ScalarField + ?Sized>(
    levels: u32,
    field: &F,
) -> Result<Mesh, RefineError> {
    let mut store = VertexStore::new();
    for corner in icosahedron_corners() {
        store.add_vertex(corner, field)?;
    }

    let mut triangles = ICOSAHEDRON_FACE_INDICES.to_vec();
    for level in 0..levels {
        // Midpoints from the previous level never reappear.
        let mut midpoints = EdgeMidpoints::new();
        let mut next = Vec::with_capacity(triangles.len() * 4);
        for tri in triangles {
            next.extend(quadrisect(tri, &mut midpoints, &mut store, field)?);
        }
        triangles = next;
        log::debug!(
            "Icosphere level {}: {} vertices, {} triangles",
            level + 1,
            store.len(),
            triangles.len()
        );
    }

    let (vertices, elevations) = store.into_parts();
    Ok(Mesh {
        vertices,
        elevations,
        triangles,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn test_level_counts() {
        let field = |d: DVec3| d.x;
        for (level, vertices, triangles) in [(0, 12, 20), (1, 42, 80), (2, 162, 320), (3, 642, 1280)] {
            let mesh = uniform_icosphere(level, &field).unwrap();
            assert_eq!(mesh.num_vertices(), vertices, "level {}", level);
            assert_eq!(mesh.num_triangles(), triangles, "level {}", level);
        }
    }

    #[test]
    fn test_icosphere_is_valid_and_sampled() {
        let field = |d: DVec3| 500.0 * d.y;
        let mesh = uniform_icosphere(2, &field).unwrap();

        let v = mesh.validate();
        assert!(v.is_valid(), "{} issues", v.issue_count());
        for (p, e) in mesh.vertices.iter().zip(&mesh.elevations) {
            assert!((p.length() - 1.0).abs() < 1e-12);
            assert!((e - 500.0 * p.y).abs() < 1e-9);
        }
    }
}
