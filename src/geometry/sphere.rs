use glam::DVec3;

use crate::error::RefineError;

/// Number of vertices in the base icosahedron.
pub const ICOSAHEDRON_VERTICES: usize = 12;

/// Number of faces in the base icosahedron.
pub const ICOSAHEDRON_FACES: usize = 20;

/// Icosahedron faces, counter-clockwise when viewed from outside.
pub const ICOSAHEDRON_FACE_INDICES: [[u32; 3]; ICOSAHEDRON_FACES] = [
    [0, 11, 5],
    [0, 5, 1],
    [0, 1, 7],
    [0, 7, 10],
    [0, 10, 11],
    [1, 5, 9],
    [5, 11, 4],
    [11, 10, 2],
    [10, 7, 6],
    [7, 1, 8],
    [3, 9, 4],
    [3, 4, 2],
    [3, 2, 6],
    [3, 6, 8],
    [3, 8, 9],
    [4, 9, 5],
    [2, 4, 11],
    [6, 2, 10],
    [8, 6, 7],
    [9, 8, 1],
];

/// Unnormalized icosahedron corners built from the golden ratio.
pub fn icosahedron_corners() -> [DVec3; ICOSAHEDRON_VERTICES] {
    let t = (1.0 + 5.0_f64.sqrt()) / 2.0;
    [
        DVec3::new(-1.0, t, 0.0),
        DVec3::new(1.0, t, 0.0),
        DVec3::new(-1.0, -t, 0.0),
        DVec3::new(1.0, -t, 0.0),
        DVec3::new(0.0, -1.0, t),
        DVec3::new(0.0, 1.0, t),
        DVec3::new(0.0, -1.0, -t),
        DVec3::new(0.0, 1.0, -t),
        DVec3::new(t, 0.0, -1.0),
        DVec3::new(t, 0.0, 1.0),
        DVec3::new(-t, 0.0, -1.0),
        DVec3::new(-t, 0.0, 1.0),
    ]
}

/// Project a vector onto the unit sphere.
///
/// Zero and non-finite vectors have no direction and are rejected.
pub fn normalize(v: DVec3) -> Result<DVec3, RefineError> {
    v.try_normalize().ok_or(RefineError::ZeroVector {
        x: v.x,
        y: v.y,
        z: v.z,
    })
}

/// Great-circle distance between two unit vectors, in radians.
///
/// Same angle as `acos(clamp(a·b, -1, 1))`, but `acos` loses everything below
/// about 1e-8 rad where the dot product rounds to 1.
pub fn angular_distance(a: DVec3, b: DVec3) -> f64 {
    a.cross(b).length().atan2(a.dot(b))
}

/// Signed area of the spherical triangle `abc` on the unit sphere.
///
/// Positive for counter-clockwise winding viewed from outside.
pub fn signed_spherical_area(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    // tan(E/2) = a·(b×c) / (1 + a·b + b·c + c·a)
    // a·(b×c) == a·((b-a)×(c-a)); the edge form keeps its sign on tiny triangles.
    let triple = a.dot((b - a).cross(c - a));
    let denom = 1.0 + a.dot(b) + b.dot(c) + c.dot(a);
    2.0 * triple.atan2(denom)
}

/// Spherical triangle area from its side lengths via L'Huilier's theorem.
pub fn lhuilier_area(a: DVec3, b: DVec3, c: DVec3) -> f64 {
    let sa = angular_distance(b, c);
    let sb = angular_distance(c, a);
    let sc = angular_distance(a, b);
    let s = 0.5 * (sa + sb + sc);

    let product = (0.5 * s).tan()
        * (0.5 * (s - sa)).tan()
        * (0.5 * (s - sb)).tan()
        * (0.5 * (s - sc)).tan();
    4.0 * product.max(0.0).sqrt().atan()
}

/// Generate `n` uniformly distributed random directions using a provided RNG.
#[cfg(test)]
pub fn random_sphere_points_with_rng<R: rand::Rng>(n: usize, rng: &mut R) -> Vec<DVec3> {
    (0..n)
        .map(|_| {
            // Uniform z and azimuth give a uniform density on the sphere.
            let z: f64 = rng.gen_range(-1.0..1.0);
            let theta: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
            let r = (1.0 - z * z).sqrt();
            DVec3::new(r * theta.cos(), r * theta.sin(), z)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_points_on_unit_sphere() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let points = random_sphere_points_with_rng(100, &mut rng);
        for p in &points {
            let len = p.length();
            assert!(
                (len - 1.0).abs() < 1e-12,
                "Point not on unit sphere: length = {}",
                len
            );
        }
    }

    #[test]
    fn test_normalize_rejects_zero() {
        assert!(matches!(
            normalize(DVec3::ZERO),
            Err(RefineError::ZeroVector { .. })
        ));
        assert!(normalize(DVec3::new(f64::NAN, 0.0, 1.0)).is_err());

        let n = normalize(DVec3::new(0.0, 3.0, 4.0)).unwrap();
        assert!((n - DVec3::new(0.0, 0.6, 0.8)).length() < 1e-15);
    }

    #[test]
    fn test_angular_distance() {
        let a = DVec3::new(1.0, 0.0, 0.0);
        assert_eq!(angular_distance(a, a * (1.0 + 1e-15)), 0.0);
        assert!((angular_distance(a, -a) - PI).abs() < 1e-12);
        assert!((angular_distance(a, DVec3::Y) - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_angular_distance_small_angles() {
        let a = DVec3::X;
        for angle in [1e-6_f64, 1e-9, 1e-12] {
            let b = DVec3::new(angle.cos(), angle.sin(), 0.0);
            let d = angular_distance(a, b);
            assert!((d - angle).abs() < 1e-6 * angle, "{} vs {}", d, angle);
        }
    }

    #[test]
    fn test_tiny_triangle_keeps_orientation() {
        let a = DVec3::new(0.3, -0.2, 0.9).normalize();
        let u = a.any_orthonormal_vector();
        let w = a.cross(u);
        let b = (a + 1e-9 * u).normalize();
        let c = (a + 1e-9 * w).normalize();
        assert!(signed_spherical_area(a, b, c) > 0.0);
        assert!(signed_spherical_area(a, c, b) < 0.0);
    }

    #[test]
    fn test_icosahedron_is_regular_and_outward() {
        let corners: Vec<DVec3> = icosahedron_corners()
            .iter()
            .map(|&c| normalize(c).unwrap())
            .collect();
        let expected_edge = angular_distance(corners[0], corners[11]);

        let mut total_area = 0.0;
        for face in ICOSAHEDRON_FACE_INDICES {
            let [a, b, c] = face.map(|i| corners[i as usize]);
            for (p, q) in [(a, b), (b, c), (c, a)] {
                assert!((angular_distance(p, q) - expected_edge).abs() < 1e-12);
            }
            let area = signed_spherical_area(a, b, c);
            assert!(area > 0.0, "face {:?} winds inward", face);
            total_area += area;
        }
        assert!((total_area - 4.0 * PI).abs() < 1e-9);
    }

    #[test]
    fn test_lhuilier_matches_signed_area() {
        let a = DVec3::X;
        let b = DVec3::Y;
        let c = DVec3::Z;
        // One octant of the sphere.
        assert!((lhuilier_area(a, b, c) - FRAC_PI_2).abs() < 1e-12);
        assert!((signed_spherical_area(a, b, c) - FRAC_PI_2).abs() < 1e-12);
        assert!((signed_spherical_area(a, c, b) + FRAC_PI_2).abs() < 1e-12);
    }
}
