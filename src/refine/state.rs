//! Mutable state of one refinement run.
//!
//! `RefinementState` owns everything the scheduler touches: the vertex store,
//! the midpoint cache, the live triangles, their edge adjacency and the error
//! queue. Triangles are only ever replaced through [`RefinementState::split`].
//!
//! Splitting follows red-green refinement. A refined triangle is split 1-to-4
//! ("red") and every neighbor across a freshly split edge is re-triangulated
//! with the 2- or 3-way conforming pattern ("green"). Green triangles are
//! never split themselves: when one is picked, its group is merged back into
//! the parent and the parent is split 1-to-4 instead. A red triangle that
//! borders a coarser green group along half of the group's split edge first
//! refines that group's parent. Red triangles are therefore always 1-to-4
//! descendants of the icosahedron and keep its shape, and between calls no
//! live triangle has an edge carrying a cached midpoint.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::{smallvec, SmallVec};

use super::edges::{triangle_edges, Edge, EdgeMidpoints};
use super::estimate::estimate_error;
use super::queue::{QueueEntry, RefinementQueue};
use super::store::VertexStore;
use super::subdivide::{quadrisect, subdivide, SplitPattern};
use super::TriangleId;
use crate::error::RefineError;
use crate::field::ScalarField;
use crate::geometry::{angular_distance, icosahedron_corners, ICOSAHEDRON_FACE_INDICES};
use crate::mesh::Mesh;

/// A live triangle. Immutable: subdivision retires it and creates new ids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub id: TriangleId,
    pub vertices: [u32; 3],
    pub error: f64,
}

impl Triangle {
    #[inline]
    pub fn edges(&self) -> [Edge; 3] {
        triangle_edges(self.vertices)
    }
}

/// What one call to [`RefinementState::split`] did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitReport {
    /// Triangles split 1-to-4, in order. Each pattern records how many of
    /// the triangle's edges were already split. The requested triangle (or
    /// the parent of its green group) comes last.
    pub refined: Vec<SplitPattern>,
    /// Vertices added to the store.
    pub new_vertices: usize,
    /// Patterns applied to neighbors closed across fresh edges.
    pub conformed: Vec<SplitPattern>,
    /// Green groups merged back into their parent before it was split.
    pub merged: usize,
}

type Children = SmallVec<[TriangleId; 4]>;

pub struct RefinementState<'f, F: ScalarField + ?Sized> {
    field: &'f F,
    store: VertexStore,
    midpoints: EdgeMidpoints,
    live: FxHashMap<TriangleId, Triangle>,
    /// A closed manifold edge has exactly two faces.
    edge_faces: FxHashMap<Edge, SmallVec<[TriangleId; 2]>>,
    /// Green triangle -> the parent it was cut from.
    green_of: FxHashMap<TriangleId, [u32; 3]>,
    /// Parent corners -> its live green children.
    groups: FxHashMap<[u32; 3], Children>,
    queue: RefinementQueue,
    next_id: TriangleId,
}

impl<'f, F: ScalarField + ?Sized> RefinementState<'f, F> {
    /// Seed the state with the icosahedron: 12 sampled vertices and 20
    /// queued faces.
    pub fn new(field: &'f F) -> Result<Self, RefineError> {
        let mut state = Self {
            field,
            store: VertexStore::new(),
            midpoints: EdgeMidpoints::new(),
            live: FxHashMap::default(),
            edge_faces: FxHashMap::default(),
            green_of: FxHashMap::default(),
            groups: FxHashMap::default(),
            queue: RefinementQueue::new(),
            next_id: 0,
        };

        for corner in icosahedron_corners() {
            state.store.add_vertex(corner, field)?;
        }
        for face in ICOSAHEDRON_FACE_INDICES {
            let error = estimate_error(face, &state.store, field)?;
            state.insert(face, error);
        }

        Ok(state)
    }

    pub fn field(&self) -> &'f F {
        self.field
    }

    pub fn store(&self) -> &VertexStore {
        &self.store
    }

    pub fn midpoints(&self) -> &EdgeMidpoints {
        &self.midpoints
    }

    pub fn num_vertices(&self) -> usize {
        self.store.len()
    }

    pub fn num_live(&self) -> usize {
        self.live.len()
    }

    /// Queue entries, stale ones included.
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn triangle(&self, id: TriangleId) -> Option<&Triangle> {
        self.live.get(&id)
    }

    #[inline]
    pub fn is_live(&self, id: TriangleId) -> bool {
        self.live.contains_key(&id)
    }

    /// True for a live triangle cut by the 2- or 3-way closure pattern.
    #[inline]
    pub fn is_green(&self, id: TriangleId) -> bool {
        self.green_of.contains_key(&id)
    }

    /// Corners of the triangle a green triangle was cut from.
    pub fn green_parent(&self, id: TriangleId) -> Option<[u32; 3]> {
        self.green_of.get(&id).copied()
    }

    pub fn live_triangles(&self) -> impl Iterator<Item = &Triangle> {
        self.live.values()
    }

    /// Live triangles containing `edge`.
    pub fn faces_on(&self, edge: Edge) -> &[TriangleId] {
        self.edge_faces
            .get(&edge)
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// Pop the highest-error entry. The id may no longer be live.
    pub fn pop(&mut self) -> Option<QueueEntry> {
        self.queue.pop()
    }

    /// Pattern a conforming subdivision of `tri` would use right now.
    pub fn classify(&self, tri: &Triangle) -> SplitPattern {
        SplitPattern::classify(tri.vertices, &self.midpoints)
    }

    /// Longest edge of `tri` in radians.
    ///
    /// Repeated corners, by index or by position, are invariant violations.
    pub fn max_edge_length(&self, tri: &Triangle) -> Result<f64, RefineError> {
        let [a, b, c] = tri.vertices;
        let [pa, pb, pc] = self.store.corners(tri.vertices);
        if a == b || b == c || c == a || pa == pb || pb == pc || pc == pa {
            return Err(RefineError::DegenerateTriangle {
                id: tri.id,
                vertices: tri.vertices,
            });
        }

        Ok(angular_distance(pa, pb)
            .max(angular_distance(pb, pc))
            .max(angular_distance(pc, pa)))
    }

    /// Vertices that [`split`](Self::split) would add for triangle `id`,
    /// counting the coarser groups it has to refine first.
    pub fn split_cost(&self, id: TriangleId) -> Result<usize, RefineError> {
        let tri = self.live.get(&id).ok_or(RefineError::UnknownTriangle(id))?;
        let mut visited = FxHashSet::default();
        let mut fresh = FxHashSet::default();
        self.plan(self.red_target(tri), &mut visited, &mut fresh);
        Ok(fresh.len())
    }

    /// Split live triangle `id` 1-to-4 and close the neighbors across every
    /// edge that gained a midpoint.
    ///
    /// A green triangle hands the split to its parent. Closure only reuses
    /// cached midpoints, so `new_vertices` equals [`split_cost`](Self::split_cost).
    pub fn split(&mut self, id: TriangleId) -> Result<SplitReport, RefineError> {
        let tri = *self.live.get(&id).ok_or(RefineError::UnknownTriangle(id))?;
        let before = self.store.len();

        let mut report = SplitReport::default();
        self.refine_red(self.red_target(&tri), &mut report)?;
        report.new_vertices = self.store.len() - before;
        Ok(report)
    }

    /// Consume the state, returning the live mesh ordered by triangle id and
    /// the matching per-triangle error estimates.
    pub fn into_mesh(self) -> (Mesh, Vec<f64>) {
        let mut triangles: Vec<Triangle> = self.live.into_values().collect();
        triangles.sort_unstable_by_key(|t| t.id);

        let errors = triangles.iter().map(|t| t.error).collect();
        let (vertices, elevations) = self.store.into_parts();
        let mesh = Mesh {
            vertices,
            elevations,
            triangles: triangles.into_iter().map(|t| t.vertices).collect(),
        };
        (mesh, errors)
    }

    /// The triangle that actually gets split 1-to-4 when `tri` is picked.
    fn red_target(&self, tri: &Triangle) -> [u32; 3] {
        self.green_of.get(&tri.id).copied().unwrap_or(tri.vertices)
    }

    /// Parents of green groups across `edge` that only touch half of it.
    ///
    /// Such a group is a level coarser than the triangle on the other side
    /// and must be split before that triangle can be.
    fn coarser_groups(&self, edge: Edge) -> SmallVec<[[u32; 3]; 2]> {
        self.faces_on(edge)
            .iter()
            .filter_map(|face| self.green_of.get(face))
            .filter(|parent| !triangle_edges(**parent).contains(&edge))
            .copied()
            .collect()
    }

    /// Dry run of [`refine_red`](Self::refine_red): collects the edges that
    /// would gain a midpoint.
    fn plan(
        &self,
        target: [u32; 3],
        visited: &mut FxHashSet<[u32; 3]>,
        fresh: &mut FxHashSet<Edge>,
    ) {
        if !visited.insert(target) {
            return;
        }
        for edge in triangle_edges(target) {
            if self.midpoints.contains(edge) {
                continue;
            }
            for parent in self.coarser_groups(edge) {
                self.plan(parent, visited, fresh);
            }
            fresh.insert(edge);
        }
    }

    /// Split `target` 1-to-4, refining coarser groups along its unsplit
    /// edges first.
    fn refine_red(
        &mut self,
        target: [u32; 3],
        report: &mut SplitReport,
    ) -> Result<(), RefineError> {
        for edge in triangle_edges(target) {
            if self.midpoints.contains(edge) {
                continue;
            }
            for parent in self.coarser_groups(edge) {
                // An earlier branch may already have split it.
                if self.groups.contains_key(&parent) {
                    self.refine_red(parent, report)?;
                }
            }
        }

        // Closures while refining coarser groups can re-cut the target.
        let merged = self.groups.contains_key(&target);
        let Some(cover) = self.cover(target) else {
            return Ok(());
        };

        let pattern = SplitPattern::classify(target, &self.midpoints);
        let fresh: SmallVec<[Edge; 3]> = triangle_edges(target)
            .into_iter()
            .filter(|&e| !self.midpoints.contains(e))
            .collect();

        let children = quadrisect(target, &mut self.midpoints, &mut self.store, self.field)?;
        self.replace(&cover, &children, None)?;
        report.refined.push(pattern);
        if merged {
            report.merged += 1;
        }

        for edge in fresh {
            let neighbors = self.faces_on(edge).to_vec();
            for neighbor in neighbors {
                if self.is_live(neighbor) {
                    report.conformed.push(self.close(neighbor)?);
                }
            }
        }
        Ok(())
    }

    /// Re-triangulate the live neighbor `id` (or its whole green group) to
    /// match the cached midpoints.
    fn close(&mut self, id: TriangleId) -> Result<SplitPattern, RefineError> {
        let tri = *self.live.get(&id).ok_or(RefineError::UnknownTriangle(id))?;
        let (parent, cover) = match self.green_of.get(&id) {
            Some(&parent) => (parent, self.groups.get(&parent).cloned().unwrap_or_default()),
            None => (tri.vertices, smallvec![id]),
        };

        let closure = subdivide(parent, &mut self.midpoints, &mut self.store, self.field)?;
        debug_assert_eq!(closure.pattern.new_vertices(), 0);
        let green = match closure.pattern {
            SplitPattern::Bisect { .. } | SplitPattern::Trisect { .. } => Some(parent),
            SplitPattern::Quadrisect | SplitPattern::Conform => None,
        };
        self.replace(&cover, &closure.children, green)?;
        Ok(closure.pattern)
    }

    /// Live triangles currently covering `corners`: its green group, or the
    /// red triangle itself. `None` once it has been split.
    fn cover(&self, corners: [u32; 3]) -> Option<Children> {
        if let Some(children) = self.groups.get(&corners) {
            return Some(children.clone());
        }
        self.faces_on(Edge::new(corners[0], corners[1]))
            .iter()
            .copied()
            .find(|id| {
                !self.is_green(*id) && self.live.get(id).is_some_and(|t| t.vertices == corners)
            })
            .map(|id| smallvec![id])
    }

    /// Retire `parents` and insert `children` as one step. Child errors are
    /// computed before anything is touched, so a sampler failure leaves the
    /// live set unchanged. With `green` set the children form a new group.
    fn replace(
        &mut self,
        parents: &[TriangleId],
        children: &[[u32; 3]],
        green: Option<[u32; 3]>,
    ) -> Result<(), RefineError> {
        let errors = children
            .iter()
            .map(|&child| estimate_error(child, &self.store, self.field))
            .collect::<Result<Vec<_>, _>>()?;

        for &parent in parents {
            self.retire(parent);
        }
        let ids: Children = children
            .iter()
            .zip(errors)
            .map(|(&child, error)| self.insert(child, error))
            .collect();

        if let Some(parent) = green {
            for &id in &ids {
                self.green_of.insert(id, parent);
            }
            self.groups.insert(parent, ids);
        }
        Ok(())
    }

    fn insert(&mut self, vertices: [u32; 3], error: f64) -> TriangleId {
        let id = self.next_id;
        self.next_id += 1;

        let tri = Triangle {
            id,
            vertices,
            error,
        };
        for edge in tri.edges() {
            self.edge_faces.entry(edge).or_default().push(id);
        }
        self.live.insert(id, tri);
        self.queue.push(id, error);
        id
    }

    fn retire(&mut self, id: TriangleId) -> Option<Triangle> {
        let tri = self.live.remove(&id)?;
        for edge in tri.edges() {
            if let Some(faces) = self.edge_faces.get_mut(&edge) {
                faces.retain(|f| *f != id);
                if faces.is_empty() {
                    self.edge_faces.remove(&edge);
                }
            }
        }
        if let Some(parent) = self.green_of.remove(&id) {
            self.groups.remove(&parent);
        }
        Some(tri)
    }
}
