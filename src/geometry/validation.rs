//! Validation utilities for triangle meshes on the unit sphere.
//!
//! These checks catch the topology defects adaptive refinement can introduce:
//! cracks (T-junctions show up as orphan edges), inverted triangles and
//! inconsistent winding between neighbors.

use glam::DVec3;
use rustc_hash::FxHashMap;

use super::signed_spherical_area;

/// Results of validating a spherical triangle mesh.
#[derive(Debug, Clone, Default)]
pub struct MeshValidation {
    /// Total number of triangles
    pub num_triangles: usize,
    /// Triangles that repeat a vertex index
    pub degenerate_triangles: Vec<usize>,
    /// Triangles that reference a vertex index past the end of the vertex list
    pub out_of_range_triangles: Vec<usize>,
    /// Edges that appear in only one triangle (cracks or T-junctions)
    pub orphan_edges: Vec<(u32, u32)>,
    /// Edges that appear in more than 2 triangles (non-manifold)
    pub overcounted_edges: Vec<(u32, u32, usize)>, // (a, b, count)
    /// Edges traversed in the same direction by both neighbors (flipped winding)
    pub misoriented_edges: Vec<(u32, u32)>,
    /// Triangles whose normal points into the sphere
    pub inward_triangles: Vec<usize>,
    /// Sum of spherical triangle areas (4π for a closed mesh)
    pub total_area: f64,
    /// Euler characteristic components (V - E + F should equal 2)
    pub euler_v: usize,
    pub euler_e: usize,
    pub euler_f: usize,
}

impl MeshValidation {
    /// True when the mesh is closed, manifold and consistently outward-facing.
    pub fn is_valid(&self) -> bool {
        self.is_watertight()
            && self.degenerate_triangles.is_empty()
            && self.out_of_range_triangles.is_empty()
            && self.misoriented_edges.is_empty()
            && self.inward_triangles.is_empty()
            && self.euler_check()
    }

    /// Every edge is shared by exactly two triangles.
    pub fn is_watertight(&self) -> bool {
        self.orphan_edges.is_empty() && self.overcounted_edges.is_empty()
    }

    /// Check Euler characteristic: V - E + F = 2 for a sphere
    pub fn euler_check(&self) -> bool {
        (self.euler_v as i64) - (self.euler_e as i64) + (self.euler_f as i64) == 2
    }

    /// Check if total area is close to 4π (within 1%)
    pub fn area_check(&self) -> bool {
        let expected = 4.0 * std::f64::consts::PI;
        (self.total_area - expected).abs() / expected < 0.01
    }

    /// Total number of hard issues found
    pub fn issue_count(&self) -> usize {
        self.degenerate_triangles.len()
            + self.out_of_range_triangles.len()
            + self.orphan_edges.len()
            + self.overcounted_edges.len()
            + self.misoriented_edges.len()
            + self.inward_triangles.len()
            + if self.euler_check() { 0 } else { 1 }
    }

    /// Print a summary of validation results
    pub fn print_summary(&self) {
        println!("Mesh Validation Results:");
        println!("  Total triangles: {}", self.num_triangles);
        println!(
            "  Euler: V={} E={} F={} (V-E+F={})",
            self.euler_v,
            self.euler_e,
            self.euler_f,
            (self.euler_v as i64) - (self.euler_e as i64) + (self.euler_f as i64)
        );
        println!(
            "  Total area: {:.6} (expected {:.6}, error {:.2}%)",
            self.total_area,
            4.0 * std::f64::consts::PI,
            100.0 * (self.total_area - 4.0 * std::f64::consts::PI).abs()
                / (4.0 * std::f64::consts::PI)
        );

        if self.is_valid() {
            println!("  Status: VALID");
            return;
        }

        println!("  Status: INVALID");
        if !self.euler_check() {
            println!("  Euler characteristic FAILED (expected V-E+F=2)");
        }
        if !self.degenerate_triangles.is_empty() {
            println!(
                "  Degenerate triangles (repeated vertex): {}",
                self.degenerate_triangles.len()
            );
        }
        if !self.out_of_range_triangles.is_empty() {
            println!(
                "  Triangles with out-of-range indices: {}",
                self.out_of_range_triangles.len()
            );
        }
        if !self.orphan_edges.is_empty() {
            println!(
                "  Orphan edges (cracks / T-junctions): {}",
                self.orphan_edges.len()
            );
        }
        if !self.overcounted_edges.is_empty() {
            println!(
                "  Overcounted edges (in >2 triangles): {}",
                self.overcounted_edges.len()
            );
        }
        if !self.misoriented_edges.is_empty() {
            println!("  Misoriented edges: {}", self.misoriented_edges.len());
        }
        if !self.inward_triangles.is_empty() {
            println!("  Inward-facing triangles: {}", self.inward_triangles.len());
        }
    }
}

/// Validate a triangle mesh whose vertices lie on the unit sphere.
pub fn validate_mesh(vertices: &[DVec3], triangles: &[[u32; 3]]) -> MeshValidation {
    let mut result = MeshValidation {
        num_triangles: triangles.len(),
        euler_v: vertices.len(),
        euler_f: triangles.len(),
        ..Default::default()
    };

    // Key: (min, max) vertex pair. Value: (uses as min->max, uses as max->min).
    let mut edge_uses: FxHashMap<(u32, u32), (usize, usize)> = FxHashMap::default();

    for (tri_idx, tri) in triangles.iter().enumerate() {
        if tri.iter().any(|&v| v as usize >= vertices.len()) {
            result.out_of_range_triangles.push(tri_idx);
            continue;
        }
        if tri[0] == tri[1] || tri[1] == tri[2] || tri[2] == tri[0] {
            result.degenerate_triangles.push(tri_idx);
            continue;
        }

        for i in 0..3 {
            let a = tri[i];
            let b = tri[(i + 1) % 3];
            let entry = edge_uses.entry((a.min(b), a.max(b))).or_default();
            if a < b {
                entry.0 += 1;
            } else {
                entry.1 += 1;
            }
        }

        let [p0, p1, p2] = tri.map(|v| vertices[v as usize]);
        let area = signed_spherical_area(p0, p1, p2);
        if area <= 0.0 {
            result.inward_triangles.push(tri_idx);
        }
        result.total_area += area;
    }

    result.euler_e = edge_uses.len();

    for (&(a, b), &(forward, backward)) in &edge_uses {
        match forward + backward {
            1 => result.orphan_edges.push((a, b)),
            2 => {
                if forward != 1 {
                    result.misoriented_edges.push((a, b));
                }
            }
            count => result.overcounted_edges.push((a, b, count)),
        }
    }

    // Hash iteration order is arbitrary; keep reports stable.
    result.orphan_edges.sort_unstable();
    result.overcounted_edges.sort_unstable();
    result.misoriented_edges.sort_unstable();

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{icosahedron_corners, ICOSAHEDRON_FACE_INDICES};

    fn icosahedron() -> (Vec<DVec3>, Vec<[u32; 3]>) {
        let vertices = icosahedron_corners().map(|c| c.normalize()).to_vec();
        (vertices, ICOSAHEDRON_FACE_INDICES.to_vec())
    }

    #[test]
    fn test_icosahedron_valid() {
        let (vertices, triangles) = icosahedron();
        let result = validate_mesh(&vertices, &triangles);
        assert!(result.is_valid(), "{:?}", result);
        assert!(result.area_check());
        assert_eq!(result.euler_e, 30);
    }

    #[test]
    fn test_detects_t_junction() {
        let (mut vertices, mut triangles) = icosahedron();

        // Bisect face (0, 11, 5) along edge 0-11 without touching its neighbor.
        let mid = (vertices[0] + vertices[11]).normalize();
        vertices.push(mid);
        let m = (vertices.len() - 1) as u32;
        triangles[0] = [0, m, 5];
        triangles.push([m, 11, 5]);

        let result = validate_mesh(&vertices, &triangles);
        assert!(!result.is_watertight());
        assert_eq!(result.orphan_edges, vec![(0, 11), (0, m), (11, m)]);
    }

    #[test]
    fn test_detects_flipped_triangle() {
        let (vertices, mut triangles) = icosahedron();
        triangles[3].swap(1, 2);

        let result = validate_mesh(&vertices, &triangles);
        assert!(result.is_watertight());
        assert_eq!(result.inward_triangles, vec![3]);
        assert_eq!(result.misoriented_edges.len(), 3);
        assert!(!result.is_valid());
    }

    #[test]
    fn test_detects_bad_indices() {
        let (vertices, mut triangles) = icosahedron();
        triangles.push([0, 0, 1]);
        triangles.push([0, 1, 99]);

        let result = validate_mesh(&vertices, &triangles);
        assert_eq!(result.degenerate_triangles, vec![20]);
        assert_eq!(result.out_of_range_triangles, vec![21]);
    }
}
