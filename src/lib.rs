//! Adaptive triangle meshes of scalar fields on the unit sphere.
//!
//! A field (elevation, usually) is sampled by refining an icosahedron where
//! linear interpolation across a triangle misses the field the most. The
//! result is a watertight, outward-wound [`Mesh`] that spends its vertex
//! budget where the field has detail.
//!
//! - [`field`] - the [`ScalarField`] trait and samplers for HEALPix maps,
//!   lat/lon grids and procedural noise
//! - [`refine`] - the adaptive refinement loop and uniform icosphere baseline
//! - [`mesh`] - the output mesh, `ADAMESH` file format and statistics
//! - [`geometry`] - sphere primitives and mesh validation

pub mod error;
pub mod field;
pub mod geometry;
pub mod mesh;
pub mod refine;
pub mod util;

pub use error::{FieldError, MeshIoError, RefineError};
pub use field::ScalarField;
pub use mesh::Mesh;
pub use refine::{refine, RefineConfig, RefineOutput, RefineStats, StopReason};
