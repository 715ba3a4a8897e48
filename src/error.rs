//! Error types for refinement, field loading and mesh I/O.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal errors raised by mesh refinement.
///
/// Stale queue entries and triangles that hit the resolution floor are
/// routine and never surface here; they are counted in
/// [`RefineStats`](crate::refine::RefineStats) instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RefineError {
    /// Configuration rejected before any mesh state was built.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Attempted to project a zero-length (or non-finite) vector onto the sphere.
    #[error("cannot normalize zero-length vector ({x}, {y}, {z})")]
    ZeroVector { x: f64, y: f64, z: f64 },

    /// The scalar field could not be evaluated at a direction.
    #[error("field returned non-finite value {value} at ({x:.6}, {y:.6}, {z:.6})")]
    NonFiniteSample { value: f64, x: f64, y: f64, z: f64 },

    /// A triangle with repeated corners or a zero-length edge reached the scheduler.
    #[error("degenerate triangle {id} with vertices {vertices:?}")]
    DegenerateTriangle { id: u64, vertices: [u32; 3] },

    /// A split pattern expected a cached midpoint that is not there.
    #[error("no cached midpoint for edge {a}-{b}")]
    MissingMidpoint { a: u32, b: u32 },

    /// A split was requested for a triangle that is not live.
    #[error("triangle {0} is not live")]
    UnknownTriangle(u64),

    /// Vertex indices are stored as `u32`.
    #[error("vertex count exceeds u32 index range")]
    IndexOverflow,
}

/// Errors raised while loading sampled field data.
#[derive(Error, Debug)]
pub enum FieldError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("raw f32 data has {0} bytes, not a multiple of 4")]
    RaggedData(usize),

    #[error("{pixels} pixels is not a valid HEALPix map (expected 12 * nside^2)")]
    InvalidHealpixSize { pixels: usize },

    #[error("HEALPix map with nside={nside} needs {expected} pixels, got {actual}")]
    HealpixSizeMismatch {
        nside: u32,
        expected: usize,
        actual: usize,
    },

    #[error("grid of {len} samples cannot be {width} wide with at least 2 rows")]
    InvalidGridShape { len: usize, width: usize },
}

/// Errors raised while reading or writing `ADAMESH` files.
#[derive(Error, Debug)]
pub enum MeshIoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid header: expected ADAMESH, found {0:?}")]
    InvalidHeader(Vec<u8>),

    #[error("unsupported ADAMESH version {0}")]
    UnsupportedVersion(u8),

    #[error("mesh has {vertices} vertices but {elevations} elevations")]
    LengthMismatch { vertices: usize, elevations: usize },

    #[error("triangle {triangle} references vertex {index}, mesh has {num_vertices}")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        num_vertices: usize,
    },

    #[error("{0} exceeds the u32 count field")]
    TooLarge(&'static str),
}
