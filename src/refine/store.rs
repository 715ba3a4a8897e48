use glam::DVec3;

use crate::error::RefineError;
use crate::field::ScalarField;
use crate::geometry::normalize;

/// Append-only registry of unit directions and their sampled elevations.
///
/// Vertices are referenced everywhere else by `u32` index and never move.
#[derive(Debug, Clone, Default)]
pub struct VertexStore {
    positions: Vec<DVec3>,
    elevations: Vec<f64>,
}

impl VertexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize `p`, sample the field there once, and append the vertex.
    pub fn add_vertex<F: ScalarField + ?Sized>(
        &mut self,
        p: DVec3,
        field: &F,
    ) -> Result<u32, RefineError> {
        let direction = normalize(p)?;
        let index = u32::try_from(self.positions.len()).map_err(|_| RefineError::IndexOverflow)?;
        let elevation = sample_finite(field, direction)?;

        self.positions.push(direction);
        self.elevations.push(elevation);
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    #[inline]
    pub fn position(&self, index: u32) -> DVec3 {
        self.positions[index as usize]
    }

    #[inline]
    pub fn elevation(&self, index: u32) -> f64 {
        self.elevations[index as usize]
    }

    /// Positions of a triangle's three corners.
    #[inline]
    pub fn corners(&self, tri: [u32; 3]) -> [DVec3; 3] {
        tri.map(|v| self.position(v))
    }

    pub fn positions(&self) -> &[DVec3] {
        &self.positions
    }

    pub fn elevations(&self) -> &[f64] {
        &self.elevations
    }

    pub fn into_parts(self) -> (Vec<DVec3>, Vec<f64>) {
        (self.positions, self.elevations)
    }
}

/// Sample a field, treating a non-finite result as a sampler failure.
pub(crate) fn sample_finite<F: ScalarField + ?Sized>(
    field: &F,
    direction: DVec3,
) -> Result<f64, RefineError> {
    let value = field.sample(direction);
    if value.is_finite() {
        Ok(value)
    } else {
        Err(RefineError::NonFiniteSample {
            value,
            x: direction.x,
            y: direction.y,
            z: direction.z,
        })
    }
}
