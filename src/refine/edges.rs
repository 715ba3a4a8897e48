use rustc_hash::FxHashMap;

use super::store::VertexStore;
use crate::error::RefineError;
use crate::field::ScalarField;

/// An undirected edge, stored with the smaller vertex index first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge(u32, u32);

impl Edge {
    #[inline]
    pub fn new(a: u32, b: u32) -> Self {
        if a < b {
            Edge(a, b)
        } else {
            Edge(b, a)
        }
    }

    #[inline]
    pub fn endpoints(self) -> (u32, u32) {
        (self.0, self.1)
    }
}

/// The three edges of a triangle, in the order 01, 12, 20.
///
/// Split patterns refer to edges by position in this array.
#[inline]
pub fn triangle_edges(tri: [u32; 3]) -> [Edge; 3] {
    [
        Edge::new(tri[0], tri[1]),
        Edge::new(tri[1], tri[2]),
        Edge::new(tri[2], tri[0]),
    ]
}

/// Edge -> midpoint vertex cache shared by every subdivision.
///
/// An edge is "split" exactly when it has an entry here. Entries are never
/// removed, so each edge gets at most one midpoint for the life of the mesh.
#[derive(Debug, Clone, Default)]
pub struct EdgeMidpoints {
    map: FxHashMap<Edge, u32>,
}

impl EdgeMidpoints {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn get(&self, edge: Edge) -> Option<u32> {
        self.map.get(&edge).copied()
    }

    #[inline]
    pub fn contains(&self, edge: Edge) -> bool {
        self.map.contains_key(&edge)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Midpoint of edge `a`-`b`, creating (and sampling) it on first request.
    pub fn get_or_create_midpoint<F: ScalarField + ?Sized>(
        &mut self,
        store: &mut VertexStore,
        field: &F,
        a: u32,
        b: u32,
    ) -> Result<u32, RefineError> {
        let edge = Edge::new(a, b);
        if let Some(mid) = self.get(edge) {
            return Ok(mid);
        }

        let chord_mid = 0.5 * (store.position(a) + store.position(b));
        let mid = store.add_vertex(chord_mid, field)?;
        self.map.insert(edge, mid);
        Ok(mid)
    }
}
