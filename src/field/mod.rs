//! Scalar fields sampled over the unit sphere.
//!
//! Refinement only ever asks a field one question: the value in a given unit
//! direction. The samplers here cover the usual data sources:
//! - [`HealpixMap`] - nearest-pixel lookup in a RING-ordered HEALPix map
//! - [`EquirectGrid`] - bilinear interpolation on a latitude/longitude grid
//! - [`NoiseField`] - seeded procedural terrain for demos and benchmarks

mod grid;
mod healpix;
mod procedural;

pub use self::grid::EquirectGrid;
pub use self::healpix::HealpixMap;
pub use self::procedural::NoiseField;

use std::f64::consts::{PI, TAU};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};
use glam::DVec3;

use crate::error::FieldError;

/// Highest spherical-harmonic degree of the reference elevation model.
pub const DEFAULT_LMAX: u32 = 2160;

/// A scalar function over unit directions.
///
/// Implementations must be defined over the whole sphere. Returning a
/// non-finite value signals that the field cannot be evaluated there, which
/// aborts refinement.
pub trait ScalarField {
    fn sample(&self, direction: DVec3) -> f64;
}

impl<F> ScalarField for F
where
    F: Fn(DVec3) -> f64,
{
    fn sample(&self, direction: DVec3) -> f64 {
        self(direction)
    }
}

/// Minimum useful edge length (radians) for a field band-limited at degree `lmax`.
///
/// The shortest represented wavelength is `π / lmax`; sampling at half of it
/// is the Nyquist spacing.
pub fn nyquist_floor(lmax: u32) -> f64 {
    PI / (2.0 * lmax.max(1) as f64)
}

/// Colatitude in `[0, π]` and longitude in `[0, 2π)` of a unit direction.
pub fn to_spherical(direction: DVec3) -> (f64, f64) {
    let theta = direction.z.clamp(-1.0, 1.0).acos();
    let mut phi = direction.y.atan2(direction.x);
    if phi < 0.0 {
        phi += TAU;
    }
    // atan2 can return exactly -0.0 + TAU rounding up to TAU.
    if phi >= TAU {
        phi -= TAU;
    }
    (theta, phi)
}

/// Read a file of little-endian `f32` samples.
pub fn load_raw_f32(path: &Path) -> Result<Vec<f32>, FieldError> {
    let bytes = std::fs::read(path).map_err(|source| FieldError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    decode_f32_le(&bytes)
}

fn decode_f32_le(bytes: &[u8]) -> Result<Vec<f32>, FieldError> {
    if bytes.len() % 4 != 0 {
        return Err(FieldError::RaggedData(bytes.len()));
    }
    let mut values = vec![0f32; bytes.len() / 4];
    LittleEndian::read_f32_into(bytes, &mut values);
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nyquist_floor_reference() {
        assert!((nyquist_floor(DEFAULT_LMAX) - PI / 4320.0).abs() < 1e-18);
        assert!(nyquist_floor(0).is_finite());
    }

    #[test]
    fn test_closure_is_field() {
        let field = |d: DVec3| 1000.0 * d.z;
        assert_eq!(field.sample(DVec3::Z), 1000.0);
        assert_eq!(field.sample(-DVec3::Z), -1000.0);
    }

    #[test]
    fn test_to_spherical_ranges() {
        let (theta, phi) = to_spherical(DVec3::Z);
        assert_eq!(theta, 0.0);
        assert_eq!(phi, 0.0);

        let (theta, phi) = to_spherical(-DVec3::Y);
        assert!((theta - PI / 2.0).abs() < 1e-12);
        assert!((phi - 1.5 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_decode_f32_le() {
        let mut bytes = vec![0u8; 8];
        LittleEndian::write_f32_into(&[1.5, -2.0], &mut bytes);
        assert_eq!(decode_f32_le(&bytes).unwrap(), vec![1.5, -2.0]);
        assert!(matches!(
            decode_f32_le(&bytes[..7]),
            Err(FieldError::RaggedData(7))
        ));
    }
}
