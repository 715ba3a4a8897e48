//! Heuristic interpolation error of a spherical triangle.
//!
//! The field is sampled at the centroid and the three edge midpoints, each
//! projected onto the sphere, and compared against an inverse-distance blend
//! of the corner elevations. Sample points are computed geometrically and never
//! touch the midpoint cache.

use glam::DVec3;

use super::store::{sample_finite, VertexStore};
use crate::error::RefineError;
use crate::field::ScalarField;
use crate::geometry::normalize;

/// Keeps inverse-distance weights finite when a sample point lands on a corner.
pub const IDW_EPSILON: f64 = 1e-10;

/// Maximum absolute difference between the field and the interpolated corner
/// values over the four sample points.
pub fn estimate_error<F: ScalarField + ?Sized>(
    tri: [u32; 3],
    store: &VertexStore,
    field: &F,
) -> Result<f64, RefineError> {
    let corners = store.corners(tri);
    let values = tri.map(|v| store.elevation(v));
    let [p0, p1, p2] = corners;

    let points = [
        (p0 + p1 + p2) / 3.0,
        0.5 * (p0 + p1),
        0.5 * (p1 + p2),
        0.5 * (p2 + p0),
    ];

    let mut max_error = 0.0f64;
    for p in points {
        let point = normalize(p)?;
        let actual = sample_finite(field, point)?;
        let interpolated = idw_interpolate(point, corners, values);
        max_error = max_error.max((actual - interpolated).abs());
    }
    Ok(max_error)
}

/// Inverse-distance weighted blend of three corner values at `point`.
///
/// Weights are `1 / (chord distance + ε)`, normalized to sum to one.
pub fn idw_interpolate(point: DVec3, corners: [DVec3; 3], values: [f64; 3]) -> f64 {
    let weights = corners.map(|c| 1.0 / (point.distance(c) + IDW_EPSILON));
    let total: f64 = weights.iter().sum();
    weights
        .iter()
        .zip(values)
        .map(|(w, v)| w / total * v)
        .sum()
}
