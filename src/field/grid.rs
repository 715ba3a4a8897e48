use std::f64::consts::{PI, TAU};
use std::path::Path;

use glam::DVec3;

use super::{load_raw_f32, to_spherical, ScalarField};
use crate::error::FieldError;

/// A row-major latitude/longitude grid sampled with bilinear interpolation.
///
/// Row 0 lies on the north pole and the last row on the south pole; column 0
/// lies on longitude 0 and columns wrap around the antimeridian.
#[derive(Debug, Clone)]
pub struct EquirectGrid {
    width: usize,
    height: usize,
    values: Vec<f32>,
}

impl EquirectGrid {
    pub fn new(width: usize, values: Vec<f32>) -> Result<Self, FieldError> {
        let len = values.len();
        if width == 0 || len % width != 0 || len / width < 2 {
            return Err(FieldError::InvalidGridShape { len, width });
        }
        Ok(Self {
            width,
            height: len / width,
            values,
        })
    }

    /// Load a raw little-endian `f32` grid of the given width.
    pub fn load(path: &Path, width: usize) -> Result<Self, FieldError> {
        Self::new(width, load_raw_f32(path)?)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn at(&self, row: usize, col: usize) -> f64 {
        self.values[row * self.width + col % self.width] as f64
    }
}

impl ScalarField for EquirectGrid {
    fn sample(&self, direction: DVec3) -> f64 {
        let (theta, phi) = to_spherical(direction);

        let y = theta / PI * (self.height - 1) as f64;
        let x = phi / TAU * self.width as f64;

        let row0 = (y.floor() as usize).min(self.height - 2);
        let col0 = x.floor() as usize % self.width;
        let fy = (y - row0 as f64).clamp(0.0, 1.0);
        let fx = x - x.floor();

        let top = self.at(row0, col0) * (1.0 - fx) + self.at(row0, col0 + 1) * fx;
        let bottom = self.at(row0 + 1, col0) * (1.0 - fx) + self.at(row0 + 1, col0 + 1) * fx;
        top * (1.0 - fy) + bottom * fy
    }
}
