//! Mesh quality statistics.

use serde::Serialize;

use super::io::HEADER_BYTES;
use super::Mesh;
use crate::field::nyquist_floor;
use crate::geometry::{angular_distance, lhuilier_area};

/// Mean Earth radius used to express angular lengths in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Elevation percentiles reported by [`MeshStats`].
pub const PERCENTILES: [u8; 9] = [0, 10, 25, 50, 75, 90, 95, 99, 100];

/// Uniform icosphere levels an adaptive mesh is compared against.
const UNIFORM_LEVELS: [u32; 4] = [5, 6, 7, 8];

#[derive(Debug, Clone, Serialize)]
pub struct MeshStats {
    pub num_vertices: usize,
    pub num_triangles: usize,
    pub elevation: ElevationStats,
    pub edges: EdgeStats,
    pub areas: AreaStats,
    pub degree: DegreeStats,
    pub nyquist: NyquistCheck,
    pub memory: MemoryUsage,
    pub uniform_comparison: Vec<UniformComparison>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ElevationStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    pub std_dev: f64,
    /// `(percentile, value)` for each entry of [`PERCENTILES`].
    pub percentiles: Vec<(u8, f64)>,
}

/// Edge lengths, one entry per triangle side (shared edges count twice).
#[derive(Debug, Clone, Default, Serialize)]
pub struct EdgeStats {
    pub min_rad: f64,
    pub max_rad: f64,
    pub mean_rad: f64,
    pub median_rad: f64,
    pub min_km: f64,
    pub max_km: f64,
    pub mean_km: f64,
    pub median_km: f64,
}

/// Spherical triangle areas in steradians.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AreaStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub total: f64,
    /// Percentage of the full sphere (4π) covered.
    pub coverage_percent: f64,
}

/// Triangles incident to each vertex.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DegreeStats {
    pub min: usize,
    pub max: usize,
    pub mean: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NyquistCheck {
    pub lmax: u32,
    /// Shortest wavelength representable at `lmax`, `π / lmax`.
    pub min_wavelength_rad: f64,
    /// Half the shortest wavelength.
    pub spacing_rad: f64,
    pub spacing_km: f64,
    pub mesh_min_spacing_rad: f64,
    pub mesh_median_spacing_rad: f64,
    /// No edge is shorter than the Nyquist spacing.
    pub respects_limit: bool,
}

/// Serialized size of the mesh in the `ADAMESH` format.
#[derive(Debug, Clone, Serialize)]
pub struct MemoryUsage {
    pub header: usize,
    pub vertices: usize,
    pub elevations: usize,
    pub triangles: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UniformComparison {
    pub level: u32,
    pub vertices: usize,
    pub triangles: usize,
    pub bytes: usize,
    /// Adaptive vertex count as a percentage of the uniform one.
    pub vertex_percent: f64,
    /// Adaptive file size as a percentage of the uniform one.
    pub size_percent: f64,
}

impl MemoryUsage {
    pub fn for_counts(num_vertices: usize, num_triangles: usize) -> Self {
        let vertices = num_vertices * 12;
        let elevations = num_vertices * 4;
        let triangles = num_triangles * 12;
        Self {
            header: HEADER_BYTES,
            vertices,
            elevations,
            triangles,
            total: HEADER_BYTES + vertices + elevations + triangles,
        }
    }
}

impl UniformComparison {
    pub fn new(level: u32, adaptive: &MemoryUsage, adaptive_vertices: usize) -> Self {
        let vertices = 10 * 4usize.pow(level) + 2;
        let triangles = 20 * 4usize.pow(level);
        let bytes = MemoryUsage::for_counts(vertices, triangles).total;
        Self {
            level,
            vertices,
            triangles,
            bytes,
            vertex_percent: 100.0 * adaptive_vertices as f64 / vertices as f64,
            size_percent: 100.0 * adaptive.total as f64 / bytes as f64,
        }
    }
}

impl MeshStats {
    pub fn compute(mesh: &Mesh, lmax: u32) -> Self {
        let mut edge_lengths = Vec::with_capacity(mesh.triangles.len() * 3);
        let mut areas = Vec::with_capacity(mesh.triangles.len());
        let mut degree = vec![0usize; mesh.vertices.len()];

        for tri in &mesh.triangles {
            let [a, b, c] = tri.map(|i| mesh.vertices[i as usize]);
            edge_lengths.extend([
                angular_distance(a, b),
                angular_distance(b, c),
                angular_distance(c, a),
            ]);
            areas.push(lhuilier_area(a, b, c));
            for &i in tri {
                degree[i as usize] += 1;
            }
        }

        let memory = MemoryUsage::for_counts(mesh.num_vertices(), mesh.num_triangles());
        let edges = edge_stats(&mut edge_lengths);
        let nyquist = nyquist_check(lmax, &edges);
        let uniform_comparison = UNIFORM_LEVELS
            .iter()
            .map(|&level| UniformComparison::new(level, &memory, mesh.num_vertices()))
            .collect();

        Self {
            num_vertices: mesh.num_vertices(),
            num_triangles: mesh.num_triangles(),
            elevation: elevation_stats(&mesh.elevations),
            edges,
            areas: area_stats(&areas),
            degree: degree_stats(&degree),
            nyquist,
            memory,
            uniform_comparison,
        }
    }

    /// Print a human-readable report to stdout.
    pub fn print_report(&self) {
        const MB: f64 = 1024.0 * 1024.0;

        println!("=== Adaptive Mesh Analysis ===");
        println!("Vertices:  {}", self.num_vertices);
        println!("Triangles: {}", self.num_triangles);

        let e = &self.elevation;
        println!("\nElevation:");
        println!("  Min {:.1}  Max {:.1}  Mean {:.1}", e.min, e.max, e.mean);
        println!("  Median {:.1}  StdDev {:.1}", e.median, e.std_dev);
        for (p, v) in &e.percentiles {
            println!("  P{:<3} {:>10.1}", p, v);
        }

        let l = &self.edges;
        println!("\nEdge length:");
        println!("  Min    {:>10.2} km ({:.4}°)", l.min_km, l.min_rad.to_degrees());
        println!("  Max    {:>10.2} km ({:.4}°)", l.max_km, l.max_rad.to_degrees());
        println!("  Mean   {:>10.2} km ({:.4}°)", l.mean_km, l.mean_rad.to_degrees());
        println!(
            "  Median {:>10.2} km ({:.4}°)",
            l.median_km,
            l.median_rad.to_degrees()
        );

        let a = &self.areas;
        println!("\nTriangle area:");
        println!("  Min {:.2e} sr  Max {:.2e} sr  Mean {:.2e} sr", a.min, a.max, a.mean);
        println!(
            "  Total {:.4} sr (sphere {:.4} sr), coverage {:.2}%",
            a.total,
            4.0 * std::f64::consts::PI,
            a.coverage_percent
        );

        let d = &self.degree;
        println!("\nVertex degree: min {}, max {}, mean {:.2}", d.min, d.max, d.mean);

        let n = &self.nyquist;
        println!("\nNyquist (lmax={}):", n.lmax);
        println!(
            "  Spacing {:.6} rad ({:.2} km), mesh min {:.6} rad, median {:.6} rad",
            n.spacing_rad, n.spacing_km, n.mesh_min_spacing_rad, n.mesh_median_spacing_rad
        );
        if n.respects_limit {
            println!("  All edges respect the Nyquist limit");
        } else {
            println!("  WARNING: some edges are below the Nyquist limit");
        }

        let m = &self.memory;
        println!("\nSize: {} bytes ({:.2} MB)", m.total, m.total as f64 / MB);

        println!("\nUniform icosphere comparison:");
        for u in &self.uniform_comparison {
            println!(
                "  Level {}: {} vertices ({:.1}%), {:.2} MB ({:.1}%)",
                u.level,
                u.vertices,
                u.vertex_percent,
                u.bytes as f64 / MB,
                u.size_percent
            );
        }
    }
}

fn elevation_stats(elevations: &[f64]) -> ElevationStats {
    if elevations.is_empty() {
        return ElevationStats::default();
    }
    let mut sorted = elevations.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);

    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let variance = sorted.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / n;

    ElevationStats {
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        mean,
        median: percentile(&sorted, 50.0),
        std_dev: variance.sqrt(),
        percentiles: PERCENTILES
            .iter()
            .map(|&p| (p, percentile(&sorted, p as f64)))
            .collect(),
    }
}

fn edge_stats(lengths: &mut [f64]) -> EdgeStats {
    if lengths.is_empty() {
        return EdgeStats::default();
    }
    lengths.sort_unstable_by(f64::total_cmp);
    let min_rad = lengths[0];
    let max_rad = lengths[lengths.len() - 1];
    let mean_rad = lengths.iter().sum::<f64>() / lengths.len() as f64;
    let median_rad = percentile(lengths, 50.0);

    EdgeStats {
        min_rad,
        max_rad,
        mean_rad,
        median_rad,
        min_km: min_rad * EARTH_RADIUS_KM,
        max_km: max_rad * EARTH_RADIUS_KM,
        mean_km: mean_rad * EARTH_RADIUS_KM,
        median_km: median_rad * EARTH_RADIUS_KM,
    }
}

fn area_stats(areas: &[f64]) -> AreaStats {
    if areas.is_empty() {
        return AreaStats::default();
    }
    let total: f64 = areas.iter().sum();
    AreaStats {
        min: areas.iter().copied().fold(f64::INFINITY, f64::min),
        max: areas.iter().copied().fold(0.0, f64::max),
        mean: total / areas.len() as f64,
        total,
        coverage_percent: 100.0 * total / (4.0 * std::f64::consts::PI),
    }
}

fn degree_stats(degree: &[usize]) -> DegreeStats {
    if degree.is_empty() {
        return DegreeStats::default();
    }
    DegreeStats {
        min: degree.iter().copied().min().unwrap_or(0),
        max: degree.iter().copied().max().unwrap_or(0),
        mean: degree.iter().sum::<usize>() as f64 / degree.len() as f64,
    }
}

fn nyquist_check(lmax: u32, edges: &EdgeStats) -> NyquistCheck {
    let spacing_rad = nyquist_floor(lmax);
    NyquistCheck {
        lmax,
        min_wavelength_rad: 2.0 * spacing_rad,
        spacing_rad,
        spacing_km: spacing_rad * EARTH_RADIUS_KM,
        mesh_min_spacing_rad: edges.min_rad,
        mesh_median_spacing_rad: edges.median_rad,
        respects_limit: edges.min_rad >= spacing_rad,
    }
}

/// Linearly interpolated percentile of sorted, non-empty data.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let t = rank - lo as f64;
    sorted[lo] + t * (sorted[hi] - sorted[lo])
}
