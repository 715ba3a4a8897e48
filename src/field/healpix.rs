use std::f64::consts::FRAC_2_PI;
use std::path::Path;

use glam::DVec3;

use super::{load_raw_f32, to_spherical, ScalarField};
use crate::error::FieldError;

/// A HEALPix map in RING ordering, sampled by nearest pixel.
#[derive(Debug, Clone)]
pub struct HealpixMap {
    nside: u32,
    pixels: Vec<f32>,
}

impl HealpixMap {
    /// Wrap a pixel array, inferring `nside` from its length.
    pub fn new(pixels: Vec<f32>) -> Result<Self, FieldError> {
        let nside = infer_nside(pixels.len())?;
        Ok(Self { nside, pixels })
    }

    /// Wrap a pixel array with an explicit `nside`.
    pub fn with_nside(nside: u32, pixels: Vec<f32>) -> Result<Self, FieldError> {
        let expected = 12 * (nside as usize) * (nside as usize);
        if nside == 0 || pixels.len() != expected {
            return Err(FieldError::HealpixSizeMismatch {
                nside,
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self { nside, pixels })
    }

    /// Load a raw little-endian `f32` map.
    ///
    /// A requested `nside` that disagrees with the file size is overridden by
    /// the size-derived one.
    pub fn load(path: &Path, nside: Option<u32>) -> Result<Self, FieldError> {
        let pixels = load_raw_f32(path)?;
        let map = Self::new(pixels)?;
        if let Some(requested) = nside.filter(|&n| n != map.nside) {
            log::warn!(
                "{}: inferred nside={} from {} pixels (requested {})",
                path.display(),
                map.nside,
                map.pixels.len(),
                requested
            );
        }
        Ok(map)
    }

    pub fn nside(&self) -> u32 {
        self.nside
    }

    pub fn num_pixels(&self) -> usize {
        self.pixels.len()
    }

    pub fn pixels(&self) -> &[f32] {
        &self.pixels
    }

    /// RING-scheme pixel containing a unit direction.
    pub fn pixel_index(&self, direction: DVec3) -> usize {
        let (theta, phi) = to_spherical(direction);
        ang2pix_ring(self.nside as i64, theta.cos(), phi) as usize
    }
}

impl ScalarField for HealpixMap {
    fn sample(&self, direction: DVec3) -> f64 {
        self.pixels[self.pixel_index(direction)] as f64
    }
}

fn infer_nside(pixels: usize) -> Result<u32, FieldError> {
    if pixels == 0 || pixels % 12 != 0 {
        return Err(FieldError::InvalidHealpixSize { pixels });
    }
    let nside = ((pixels / 12) as f64).sqrt().round() as usize;
    if 12 * nside * nside != pixels {
        return Err(FieldError::InvalidHealpixSize { pixels });
    }
    u32::try_from(nside).map_err(|_| FieldError::InvalidHealpixSize { pixels })
}

/// RING pixel index for `z = cos(colatitude)` and longitude `phi` in `[0, 2π)`.
fn ang2pix_ring(nside: i64, z: f64, phi: f64) -> i64 {
    let npix = 12 * nside * nside;
    let ncap = 2 * nside * (nside - 1);
    let za = z.abs();
    let tt = phi * FRAC_2_PI; // [0, 4)

    let pix = if za <= 2.0 / 3.0 {
        // Equatorial belt
        let temp1 = nside as f64 * (0.5 + tt);
        let temp2 = nside as f64 * z * 0.75;
        let jp = (temp1 - temp2) as i64;
        let jm = (temp1 + temp2) as i64;

        let ir = nside + 1 + jp - jm; // ring index counted from z = 2/3, in [1, 2nside + 1]
        let kshift = 1 - (ir & 1);
        let ip = ((jp + jm - nside + kshift + 1) / 2).rem_euclid(4 * nside);

        ncap + (ir - 1) * 4 * nside + ip
    } else {
        // Polar caps
        let tp = tt - tt.floor();
        let tmp = nside as f64 * (3.0 * (1.0 - za)).sqrt();
        let jp = (tp * tmp) as i64;
        let jm = ((1.0 - tp) * tmp) as i64;

        let ir = jp + jm + 1; // ring index counted from the closest pole
        let ip = ((tt * ir as f64) as i64).rem_euclid(4 * ir);

        if z > 0.0 {
            2 * ir * (ir - 1) + ip
        } else {
            npix - 2 * ir * (ir + 1) + ip
        }
    };

    pix.clamp(0, npix - 1)
}
