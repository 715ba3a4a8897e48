//! Conforming triangle subdivision.
//!
//! The replacement triangulation depends on how many of the triangle's edges
//! already carry a midpoint in the shared cache:
//!
//! | split edges | pattern                | children | new vertices |
//! |-------------|------------------------|----------|--------------|
//! | 0           | [`SplitPattern::Quadrisect`] | 4  | 3            |
//! | 1           | [`SplitPattern::Bisect`]     | 2  | 0            |
//! | 2           | [`SplitPattern::Trisect`]    | 3  | 0            |
//! | 3           | [`SplitPattern::Conform`]    | 4  | 0            |
//!
//! Every child keeps the parent's counter-clockwise (outward) winding.

use super::edges::{triangle_edges, Edge, EdgeMidpoints};
use super::store::VertexStore;
use crate::error::RefineError;
use crate::field::ScalarField;

/// How a triangle is replaced. Edge positions follow [`triangle_edges`]:
/// 0 = v0v1, 1 = v1v2, 2 = v2v0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SplitPattern {
    /// No edge split yet: 1-to-4, creating all three midpoints.
    Quadrisect,
    /// Exactly one edge split: 1-to-2 along that edge.
    Bisect { edge: usize },
    /// Two edges split: 1-to-3, edge `unsplit` stays whole.
    Trisect { unsplit: usize },
    /// All three edges split: 1-to-4 from cached midpoints.
    Conform,
}

impl SplitPattern {
    /// Pick the pattern from the current state of the midpoint cache.
    pub fn classify(tri: [u32; 3], midpoints: &EdgeMidpoints) -> Self {
        let split = triangle_edges(tri).map(|e| midpoints.contains(e));
        match split {
            [false, false, false] => SplitPattern::Quadrisect,
            [true, true, true] => SplitPattern::Conform,
            _ => {
                let count = split.iter().filter(|&&s| s).count();
                if count == 1 {
                    let edge = split.iter().position(|&s| s).unwrap_or(0);
                    SplitPattern::Bisect { edge }
                } else {
                    let unsplit = split.iter().position(|&s| !s).unwrap_or(0);
                    SplitPattern::Trisect { unsplit }
                }
            }
        }
    }

    /// Number of the triangle's edges that were already split (`k`).
    pub fn split_edges(self) -> usize {
        match self {
            SplitPattern::Quadrisect => 0,
            SplitPattern::Bisect { .. } => 1,
            SplitPattern::Trisect { .. } => 2,
            SplitPattern::Conform => 3,
        }
    }

    /// Vertices this pattern adds to the store.
    pub fn new_vertices(self) -> usize {
        match self {
            SplitPattern::Quadrisect => 3,
            _ => 0,
        }
    }

    pub fn child_count(self) -> usize {
        match self {
            SplitPattern::Quadrisect | SplitPattern::Conform => 4,
            SplitPattern::Bisect { .. } => 2,
            SplitPattern::Trisect { .. } => 3,
        }
    }
}

/// Replacement triangles for one subdivided triangle.
#[derive(Debug, Clone, PartialEq)]
pub struct Subdivision {
    pub pattern: SplitPattern,
    pub children: Vec<[u32; 3]>,
}

/// Subdivide `tri` conformingly with the cached midpoints.
pub fn subdivide<F: ScalarField + ?Sized>(
    tri: [u32; 3],
    midpoints: &mut EdgeMidpoints,
    store: &mut VertexStore,
    field: &F,
) -> Result<Subdivision, RefineError> {
    let pattern = SplitPattern::classify(tri, midpoints);

    let children = match pattern {
        SplitPattern::Quadrisect | SplitPattern::Conform => {
            quadrisect(tri, midpoints, store, field)?.to_vec()
        }
        SplitPattern::Bisect { edge } => {
            // Rotate so the split edge is a-b.
            let [a, b, c] = rotate(tri, edge);
            let m = cached(midpoints, a, b)?;
            vec![[a, m, c], [m, b, c]]
        }
        SplitPattern::Trisect { unsplit } => {
            // Rotate so the whole edge is a-b; b-c and c-a carry midpoints.
            let [a, b, c] = rotate(tri, unsplit);
            let m_bc = cached(midpoints, b, c)?;
            let m_ca = cached(midpoints, c, a)?;
            vec![[a, b, m_ca], [b, m_bc, m_ca], [m_ca, m_bc, c]]
        }
    };

    Ok(Subdivision { pattern, children })
}

/// Standard 1-to-4 split, creating any midpoint that is not cached yet.
pub fn quadrisect<F: ScalarField + ?Sized>(
    tri: [u32; 3],
    midpoints: &mut EdgeMidpoints,
    store: &mut VertexStore,
    field: &F,
) -> Result<[[u32; 3]; 4], RefineError> {
    let [v0, v1, v2] = tri;
    let m01 = midpoints.get_or_create_midpoint(store, field, v0, v1)?;
    let m12 = midpoints.get_or_create_midpoint(store, field, v1, v2)?;
    let m20 = midpoints.get_or_create_midpoint(store, field, v2, v0)?;

    Ok([
        [v0, m01, m20],
        [v1, m12, m01],
        [v2, m20, m12],
        [m01, m12, m20],
    ])
}

/// Cyclic rotation that starts the triangle at corner `start`.
#[inline]
fn rotate(tri: [u32; 3], start: usize) -> [u32; 3] {
    [tri[start % 3], tri[(start + 1) % 3], tri[(start + 2) % 3]]
}

fn cached(midpoints: &EdgeMidpoints, a: u32, b: u32) -> Result<u32, RefineError> {
    midpoints
        .get(Edge::new(a, b))
        .ok_or(RefineError::MissingMidpoint { a, b })
}
