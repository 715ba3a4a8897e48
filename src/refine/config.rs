use serde::Serialize;

use crate::error::RefineError;
use crate::field::{nyquist_floor, DEFAULT_LMAX};
use crate::geometry::ICOSAHEDRON_VERTICES;

/// Parameters for adaptive refinement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RefineConfig {
    /// Upper bound on the vertex count, icosahedron included.
    pub max_vertices: usize,
    /// Triangles whose estimated error is below this are left alone.
    pub error_threshold: f64,
    /// Triangles whose longest edge (radians) is below this are never split.
    pub min_edge_length: f64,
    /// Optional cap on the number of splits performed.
    pub max_iterations: Option<usize>,
}

impl Default for RefineConfig {
    fn default() -> Self {
        Self {
            max_vertices: 100_000,
            error_threshold: 10.0,
            min_edge_length: nyquist_floor(DEFAULT_LMAX),
            max_iterations: None,
        }
    }
}

impl RefineConfig {
    /// Defaults with the resolution floor set to the Nyquist spacing of a
    /// field band-limited at degree `lmax`.
    pub fn with_bandwidth(lmax: u32) -> Self {
        Self {
            min_edge_length: nyquist_floor(lmax),
            ..Self::default()
        }
    }

    pub fn with_max_vertices(mut self, max_vertices: usize) -> Self {
        self.max_vertices = max_vertices;
        self
    }

    pub fn with_error_threshold(mut self, threshold: f64) -> Self {
        self.error_threshold = threshold;
        self
    }

    pub fn with_min_edge_length(mut self, radians: f64) -> Self {
        self.min_edge_length = radians;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: Option<usize>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn validate(&self) -> Result<(), RefineError> {
        if self.max_vertices < ICOSAHEDRON_VERTICES {
            return Err(RefineError::InvalidConfig(format!(
                "max_vertices must be at least {}, got {}",
                ICOSAHEDRON_VERTICES, self.max_vertices
            )));
        }
        if !self.error_threshold.is_finite() || self.error_threshold <= 0.0 {
            return Err(RefineError::InvalidConfig(format!(
                "error_threshold must be finite and positive, got {}",
                self.error_threshold
            )));
        }
        if !self.min_edge_length.is_finite() || self.min_edge_length < 0.0 {
            return Err(RefineError::InvalidConfig(format!(
                "min_edge_length must be finite and non-negative, got {}",
                self.min_edge_length
            )));
        }
        if self.max_iterations == Some(0) {
            return Err(RefineError::InvalidConfig(
                "max_iterations must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}
