use glam::DVec3;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin, RidgedMulti};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::ScalarField;

/// Octaves of the continental-scale layer.
const MACRO_OCTAVES: usize = 5;
/// Octaves of the mountain ridge layer.
const RIDGE_OCTAVES: usize = 4;
/// Spatial frequency of the continental layer on the unit sphere.
const MACRO_FREQUENCY: f64 = 1.6;
/// Spatial frequency of the ridge layer.
const RIDGE_FREQUENCY: f64 = 4.0;
/// Ridge amplitude relative to the continental layer.
const RIDGE_WEIGHT: f64 = 0.35;

/// Seeded procedural terrain: fBm continents plus ridged mountains.
///
/// Values are roughly in `[-amplitude, amplitude]`, in the same units as the
/// refinement error threshold (metres for the defaults).
pub struct NoiseField {
    macro_fbm: Fbm<Perlin>,
    ridges: RidgedMulti<Perlin>,
    amplitude: f64,
}

impl NoiseField {
    pub fn new(seed: u64, amplitude: f64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        Self {
            macro_fbm: Fbm::new(rng.gen()).set_octaves(MACRO_OCTAVES),
            ridges: RidgedMulti::new(rng.gen()).set_octaves(RIDGE_OCTAVES),
            amplitude,
        }
    }

    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }
}

impl ScalarField for NoiseField {
    fn sample(&self, direction: DVec3) -> f64 {
        let m = direction * MACRO_FREQUENCY;
        let r = direction * RIDGE_FREQUENCY;
        let continents = self.macro_fbm.get([m.x, m.y, m.z]);
        let mountains = self.ridges.get([r.x, r.y, r.z]);
        // Ridges only rise on land.
        let land = continents.max(0.0);
        self.amplitude * (continents + RIDGE_WEIGHT * land * mountains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::random_sphere_points_with_rng;

    #[test]
    fn test_noise_field_is_deterministic() {
        let a = NoiseField::new(42, 1000.0);
        let b = NoiseField::new(42, 1000.0);
        let c = NoiseField::new(43, 1000.0);

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let points = random_sphere_points_with_rng(64, &mut rng);
        let mut differs = false;
        for p in points {
            let va = a.sample(p);
            assert!(va.is_finite());
            assert_eq!(va, b.sample(p));
            differs |= va != c.sample(p);
        }
        assert!(differs, "different seeds should give different terrain");
    }
}
