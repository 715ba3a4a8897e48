//! End-to-end tests of adaptive refinement, from field to saved mesh.

use std::collections::HashSet;
use std::path::PathBuf;

use adamesh::field::{HealpixMap, NoiseField, ScalarField};
use adamesh::refine::uniform_icosphere;
use adamesh::{refine, Mesh, RefineConfig, RefineError, StopReason};
use glam::DVec3;

fn linear_z(d: DVec3) -> f64 {
    1000.0 * d.z
}

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("adamesh-{}-{}", std::process::id(), name))
}

fn assert_valid(mesh: &Mesh) {
    let v = mesh.validate();
    if !v.is_valid() {
        v.print_summary();
    }
    assert!(v.is_valid(), "mesh has {} issues", v.issue_count());
    assert!(v.area_check(), "total area {} is not 4π", v.total_area);
}

/// Smallest planar corner angle over all triangles, in degrees.
fn min_corner_angle(mesh: &Mesh) -> f64 {
    let mut min = f64::INFINITY;
    for tri in &mesh.triangles {
        let [a, b, c] = tri.map(|v| mesh.vertices[v as usize]);
        for (p, q, r) in [(a, b, c), (b, c, a), (c, a, b)] {
            min = min.min((q - p).angle_between(r - p).to_degrees());
        }
    }
    min
}

/// Direction-dependent point singularity: the value jumps with the bearing
/// from `center`, at every scale.
fn bearing_field(center: DVec3, axis: DVec3) -> impl Fn(DVec3) -> f64 {
    move |d: DVec3| {
        (d - center)
            .try_normalize()
            .map_or(0.0, |v| 1000.0 * v.dot(axis))
    }
}

fn assert_no_duplicate_vertices(mesh: &Mesh) {
    let mut seen = HashSet::new();
    for p in &mesh.vertices {
        let key = (*p * 1e9).round().as_i64vec3().to_array();
        assert!(seen.insert(key), "duplicate vertex at {:?}", p);
    }
}

#[test]
fn test_constant_zero_field_stays_icosahedron() {
    let config = RefineConfig::default()
        .with_max_vertices(1000)
        .with_error_threshold(0.001);
    let out = refine(&|_: DVec3| 0.0, &config).unwrap();

    assert_eq!(out.stop_reason, StopReason::Converged);
    assert_eq!(out.mesh.num_vertices(), 12);
    assert_eq!(out.mesh.num_triangles(), 20);
    assert!(out.mesh.elevations.iter().all(|&e| e == 0.0));
    assert_eq!(out.stats.splits, 0);
    assert_valid(&out.mesh);
}

#[test]
fn test_linear_field_with_tight_threshold_spends_budget() {
    let config = RefineConfig::default()
        .with_max_vertices(10_000)
        .with_error_threshold(1.0)
        .with_min_edge_length(0.0);
    let out = refine(&linear_z, &config).unwrap();

    assert_eq!(out.stop_reason, StopReason::VertexBudget);
    assert!(out.mesh.num_vertices() > 12);
    assert!(out.mesh.num_vertices() <= 10_000);
    assert_eq!(out.mesh.elevations.len(), out.mesh.num_vertices());
    assert_valid(&out.mesh);
    assert_no_duplicate_vertices(&out.mesh);
}

#[test]
fn test_linear_field_converges_with_reachable_threshold() {
    let config = RefineConfig::default()
        .with_max_vertices(10_000)
        .with_error_threshold(50.0)
        .with_min_edge_length(0.0);
    let out = refine(&linear_z, &config).unwrap();

    assert_eq!(out.stop_reason, StopReason::Converged);
    assert!(out.mesh.num_vertices() > 12);
    assert!(out.mesh.num_vertices() < 10_000);
    assert!(
        out.errors.iter().all(|&e| e < 50.0),
        "max error {}",
        out.max_error()
    );
    assert_eq!(out.stats.floor_discarded, 0);
    assert_valid(&out.mesh);
}

#[test]
fn test_resolution_floor_exhausts_queue() {
    let config = RefineConfig::default()
        .with_max_vertices(10_000)
        .with_error_threshold(1.0)
        .with_min_edge_length(0.5);
    let out = refine(&linear_z, &config).unwrap();

    assert_eq!(out.stop_reason, StopReason::QueueExhausted);
    assert!(out.stats.floor_discarded > 0);
    assert!(out.mesh.num_vertices() < 10_000);
    assert_valid(&out.mesh);
}

#[test]
fn test_small_budget_is_respected() {
    let config = RefineConfig::default()
        .with_max_vertices(200)
        .with_error_threshold(1.0)
        .with_min_edge_length(0.0);
    let out = refine(&linear_z, &config).unwrap();

    assert_eq!(out.stop_reason, StopReason::VertexBudget);
    assert!(out.mesh.num_vertices() <= 200);
    assert!(out.mesh.num_vertices() > 170);
    assert_valid(&out.mesh);
}

#[test]
fn test_refinement_is_deterministic() {
    let field = NoiseField::new(7, 3000.0);
    let config = RefineConfig::default()
        .with_max_vertices(1500)
        .with_error_threshold(5.0);

    let a = refine(&field, &config).unwrap();
    let b = refine(&field, &config).unwrap();
    assert_eq!(a.mesh, b.mesh);
    assert_eq!(a.stats, b.stats);
}

#[test]
fn test_refinement_concentrates_on_detail() {
    // Flat south, steep band north of the equator.
    let field = |d: DVec3| if d.z > 0.0 { 2000.0 * (8.0 * d.z).sin() } else { 0.0 };
    let config = RefineConfig::default()
        .with_max_vertices(3000)
        .with_error_threshold(1.0);
    let out = refine(&field, &config).unwrap();

    let north = out.mesh.vertices.iter().filter(|p| p.z > 0.05).count();
    let south = out.mesh.vertices.iter().filter(|p| p.z < -0.05).count();
    assert!(north > 4 * south, "north {} vs south {}", north, south);
    assert_valid(&out.mesh);
}

#[test]
fn test_invalid_configs_are_rejected() {
    let bad = [
        RefineConfig::default().with_max_vertices(5),
        RefineConfig::default().with_error_threshold(0.0),
        RefineConfig::default().with_min_edge_length(f64::NAN),
    ];
    for config in bad {
        assert!(matches!(
            refine(&linear_z, &config),
            Err(RefineError::InvalidConfig(_))
        ));
    }
}

#[test]
fn test_sampler_failure_aborts() {
    let out = refine(&|_: DVec3| f64::NAN, &RefineConfig::default());
    assert!(matches!(out, Err(RefineError::NonFiniteSample { .. })));

    // Fails only in a small cap around the north pole.
    let field = |d: DVec3| if d.z > 0.97 { f64::INFINITY } else { 1000.0 * d.z };
    let config = RefineConfig::default()
        .with_error_threshold(1.0)
        .with_min_edge_length(0.0);
    assert!(matches!(
        refine(&field, &config),
        Err(RefineError::NonFiniteSample { .. })
    ));
}

#[test]
fn test_healpix_map_refinement() {
    // nside 8 map with a north-south gradient, filled from the vertices of a
    // fine icosphere landing in each pixel.
    let nside = 8u32;
    let template = HealpixMap::with_nside(nside, vec![0.0; 12 * 64]).unwrap();
    let mesh = uniform_icosphere(4, &|_: DVec3| 0.0).unwrap();
    let mut pixels = vec![0.0f32; template.num_pixels()];
    for p in &mesh.vertices {
        pixels[template.pixel_index(*p)] = (1000.0 * p.z) as f32;
    }
    let map = HealpixMap::new(pixels).unwrap();
    assert_eq!(map.nside(), nside);

    let config = RefineConfig::with_bandwidth(2 * nside)
        .with_max_vertices(2000)
        .with_error_threshold(20.0);
    let out = refine(&map, &config).unwrap();

    assert!(out.mesh.num_vertices() > 12);
    assert!(out.mesh.num_vertices() <= 2000);
    for (p, &e) in out.mesh.vertices.iter().zip(&out.mesh.elevations) {
        assert_eq!(e, map.sample(*p), "elevation at {:?} is not its pixel value", p);
    }
    assert_valid(&out.mesh);
}

#[test]
fn test_saved_mesh_loads_back() {
    let field = NoiseField::new(11, 4000.0);
    let config = RefineConfig::default()
        .with_max_vertices(2000)
        .with_error_threshold(10.0);
    let out = refine(&field, &config).unwrap();

    let path = temp_path("roundtrip.mesh");
    out.mesh.save(&path).unwrap();
    let loaded = Mesh::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded.num_vertices(), out.mesh.num_vertices());
    assert_eq!(loaded.triangles, out.mesh.triangles);
    for (a, b) in loaded.vertices.iter().zip(&out.mesh.vertices) {
        assert!((*a - *b).length() < 1e-6);
    }
    for (a, b) in loaded.elevations.iter().zip(&out.mesh.elevations) {
        assert!((a - b).abs() <= 1e-3, "{} vs {}", a, b);
    }
    assert_valid(&loaded);
}

#[test]
fn test_noise_terrain_stays_valid() {
    for seed in 0..5u64 {
        let field = NoiseField::new(seed, 5000.0);
        for budget in [800, 5000] {
            let config = RefineConfig::default()
                .with_max_vertices(budget)
                .with_error_threshold(2.0);
            let out = refine(&field, &config).unwrap();

            let v = out.mesh.validate();
            if !v.is_valid() {
                v.print_summary();
            }
            assert!(
                v.is_valid(),
                "seed {} budget {}: {} issues",
                seed,
                budget,
                v.issue_count()
            );
            assert!(out.mesh.num_vertices() <= budget);
            let angle = min_corner_angle(&out.mesh);
            assert!(angle > 15.0, "seed {} budget {}: corner of {:.3} degrees", seed, budget, angle);
        }
    }
}

#[test]
fn test_sharp_features_stay_valid() {
    let center = DVec3::new(0.3, -0.2, 0.9).normalize();
    let fields: [Box<dyn Fn(DVec3) -> f64>; 3] = [
        Box::new(bearing_field(center, DVec3::X)),
        // Cliff along a small circle.
        Box::new(|d: DVec3| if d.dot(DVec3::new(0.6, 0.0, 0.8)) > 0.7 { 3000.0 } else { 0.0 }),
        // Narrow ridge.
        Box::new(|d: DVec3| 4000.0 * (-((d.z - 0.2) / 0.01).powi(2)).exp()),
    ];
    for (i, field) in fields.iter().enumerate() {
        for budget in [1000, 6000] {
            let config = RefineConfig::default()
                .with_max_vertices(budget)
                .with_error_threshold(1.0);
            let out = refine(&|d: DVec3| field(d), &config).unwrap();
            let v = out.mesh.validate();
            assert!(v.is_valid(), "field {} budget {}: {} issues", i, budget, v.issue_count());
            let angle = min_corner_angle(&out.mesh);
            assert!(angle > 15.0, "field {} budget {}: corner of {:.3} degrees", i, budget, angle);
        }
    }
}

#[test]
fn test_point_singularity_without_floor_completes() {
    let field = bearing_field(DVec3::new(0.3, -0.2, 0.9).normalize(), DVec3::X);
    let config = RefineConfig::default()
        .with_max_vertices(20_000)
        .with_error_threshold(1.0)
        .with_min_edge_length(0.0);
    let out = refine(&field, &config).unwrap();

    assert!(out.mesh.num_vertices() <= 20_000);
    assert_valid(&out.mesh);
    // Refinement reached edges far below what acos can resolve, then stopped
    // at the resolution limit instead of failing.
    let shortest = out
        .mesh
        .triangles
        .iter()
        .flat_map(|t| [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])])
        .map(|(a, b)| {
            let (p, q) = (out.mesh.vertices[a as usize], out.mesh.vertices[b as usize]);
            p.cross(q).length().atan2(p.dot(q))
        })
        .fold(f64::INFINITY, f64::min);
    assert!(shortest < 1e-8, "shortest edge {:e}", shortest);
    assert!(out.stats.floor_discarded > 0);
}
