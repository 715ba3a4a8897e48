//! Error-driven adaptive refinement of the icosahedron.
//!
//! Starting from the 20 icosahedron faces, the triangle with the largest
//! estimated interpolation error is split repeatedly until every queued
//! triangle is within tolerance, the vertex budget is spent, or nothing
//! splittable is left. Splits follow red-green refinement (see
//! [`RefinementState`]) so the mesh is watertight after every step and
//! triangles keep the icosahedron's shape however deep they go.
//!
//! ```ignore
//! let config = RefineConfig::default().with_max_vertices(20_000);
//! let output = refine(&|d: DVec3| 1000.0 * d.z, &config)?;
//! println!("{} triangles ({})", output.mesh.num_triangles(), output.stop_reason);
//! ```

mod config;
mod edges;
mod estimate;
mod queue;
mod state;
mod store;
mod subdivide;
mod uniform;

pub use config::RefineConfig;
pub use edges::{triangle_edges, Edge, EdgeMidpoints};
pub use estimate::{estimate_error, idw_interpolate, IDW_EPSILON};
pub use queue::{QueueEntry, RefinementQueue};
pub use state::{RefinementState, SplitReport, Triangle};
pub use store::VertexStore;
pub use subdivide::{quadrisect, subdivide, SplitPattern, Subdivision};
pub use uniform::uniform_icosphere;

use std::fmt;

use serde::Serialize;

use crate::error::RefineError;
use crate::field::ScalarField;
use crate::mesh::Mesh;
use crate::util::Timed;

/// Unique, never reused triangle identifier. Later triangles get larger ids.
pub type TriangleId = u64;

/// Splits between debug progress lines.
const PROGRESS_INTERVAL: usize = 1000;

/// Shortest edge (radians) that is still split, whatever the configured
/// floor. Midpoints of shorter edges are no longer well separated from their
/// endpoints in `f64`.
pub const RESOLUTION_LIMIT: f64 = 1e-10;

/// Why the refinement loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// The highest queued error fell below the threshold.
    Converged,
    /// The vertex budget was reached, or the next split would exceed it.
    VertexBudget,
    /// Every remaining triangle was below the resolution floor.
    QueueExhausted,
    /// `max_iterations` splits were performed.
    IterationLimit,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StopReason::Converged => "converged",
            StopReason::VertexBudget => "vertex budget reached",
            StopReason::QueueExhausted => "queue exhausted",
            StopReason::IterationLimit => "iteration limit reached",
        };
        f.write_str(s)
    }
}

/// Counters collected while refining.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefineStats {
    /// Queue entries popped, stale ones included.
    pub pops: usize,
    /// Triangles split because of their error.
    pub splits: usize,
    /// 1-to-4 splits, including parents of merged green groups and coarser
    /// groups refined ahead of a split.
    pub refinements: usize,
    /// Green groups merged back into their parent.
    pub merges: usize,
    /// Neighbors re-triangulated to close a split.
    pub conforming_splits: usize,
    /// Popped entries whose triangle was already replaced.
    pub stale_discarded: usize,
    /// Triangles dropped from the queue for being below the resolution floor.
    pub floor_discarded: usize,
    /// Replaced triangles, indexed by how many of their edges were already
    /// split.
    pub patterns: [usize; 4],
}

impl RefineStats {
    fn record(&mut self, report: &SplitReport) {
        self.splits += 1;
        self.merges += report.merged;
        for pattern in &report.refined {
            self.refinements += 1;
            self.patterns[pattern.split_edges()] += 1;
        }
        for pattern in &report.conformed {
            self.conforming_splits += 1;
            self.patterns[pattern.split_edges()] += 1;
        }
    }
}

/// Result of a refinement run.
#[derive(Debug, Clone)]
pub struct RefineOutput {
    pub mesh: Mesh,
    /// Estimated error of each triangle, parallel to `mesh.triangles`.
    pub errors: Vec<f64>,
    pub stats: RefineStats,
    pub stop_reason: StopReason,
}

impl RefineOutput {
    /// Largest estimated error among the output triangles.
    pub fn max_error(&self) -> f64 {
        self.errors.iter().copied().fold(0.0, f64::max)
    }
}

/// Refine the icosahedron against `field` until a stop condition is met.
///
/// The configuration is validated before any sampling happens. Triangles
/// shorter than [`RESOLUTION_LIMIT`] are treated like the configured floor.
/// A sampler failure or a degenerate triangle aborts the run with no partial
/// mesh.
pub fn refine<F: ScalarField + ?Sized>(
    field: &F,
    config: &RefineConfig,
) -> Result<RefineOutput, RefineError> {
    config.validate()?;
    let _t = Timed::info("Adaptive refinement");
    log::info!(
        "Refining: max_vertices={}, threshold={}, floor={:.3e} rad",
        config.max_vertices,
        config.error_threshold,
        config.min_edge_length
    );

    let mut state = RefinementState::new(field)?;
    let mut stats = RefineStats::default();
    let floor = config.min_edge_length.max(RESOLUTION_LIMIT);

    let stop_reason = loop {
        if state.num_vertices() >= config.max_vertices {
            break StopReason::VertexBudget;
        }
        if config.max_iterations.is_some_and(|limit| stats.splits >= limit) {
            break StopReason::IterationLimit;
        }

        let Some(entry) = state.pop() else {
            break StopReason::QueueExhausted;
        };
        stats.pops += 1;

        let Some(tri) = state.triangle(entry.id).copied() else {
            stats.stale_discarded += 1;
            continue;
        };
        if tri.error < config.error_threshold {
            break StopReason::Converged;
        }
        if state.max_edge_length(&tri)? < floor {
            log::trace!("Triangle {} below resolution floor", tri.id);
            stats.floor_discarded += 1;
            continue;
        }

        if state.num_vertices() + state.split_cost(tri.id)? > config.max_vertices {
            break StopReason::VertexBudget;
        }

        let report = state.split(tri.id)?;
        stats.record(&report);

        if stats.splits % PROGRESS_INTERVAL == 0 {
            log::debug!(
                "{} splits: {} vertices, {} triangles, current error {:.3}",
                stats.splits,
                state.num_vertices(),
                state.num_live(),
                tri.error
            );
        }
    };

    let (mesh, errors) = state.into_mesh();
    log::info!(
        "Refinement finished ({}): {} vertices, {} triangles, {} splits, {} merges, {} stale, {} floor-limited",
        stop_reason,
        mesh.num_vertices(),
        mesh.num_triangles(),
        stats.splits,
        stats.merges,
        stats.stale_discarded,
        stats.floor_discarded
    );

    Ok(RefineOutput {
        mesh,
        errors,
        stats,
        stop_reason,
    })
}
