//! The terminal artifact of refinement and what can be done with it.

mod io;
mod stats;

pub use self::io::{read_mesh, write_mesh, FORMAT_VERSION, HEADER_BYTES, MAGIC};
pub use self::stats::{
    AreaStats, DegreeStats, EdgeStats, ElevationStats, MemoryUsage, MeshStats, NyquistCheck,
    UniformComparison, EARTH_RADIUS_KM, PERCENTILES,
};

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use glam::DVec3;

use crate::error::MeshIoError;
use crate::geometry::{validate_mesh, MeshValidation};

/// Triangle mesh on the unit sphere with one elevation per vertex.
///
/// Triangles wind counter-clockwise seen from outside.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<DVec3>,
    pub elevations: Vec<f64>,
    pub triangles: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    pub fn validate(&self) -> MeshValidation {
        validate_mesh(&self.vertices, &self.triangles)
    }

    /// Quality statistics, with the Nyquist check done against degree `lmax`.
    pub fn stats(&self, lmax: u32) -> MeshStats {
        MeshStats::compute(self, lmax)
    }

    /// Write the mesh to `path` in the `ADAMESH` format.
    pub fn save(&self, path: &Path) -> Result<(), MeshIoError> {
        let mut writer = BufWriter::new(File::create(path)?);
        write_mesh(self, &mut writer)?;
        writer.flush()?;
        log::info!(
            "Wrote {} vertices, {} triangles to {}",
            self.num_vertices(),
            self.num_triangles(),
            path.display()
        );
        Ok(())
    }

    /// Read an `ADAMESH` file.
    pub fn load(path: &Path) -> Result<Self, MeshIoError> {
        let reader = BufReader::new(File::open(path)?);
        let mesh = read_mesh(reader)?;
        log::debug!(
            "Read {} vertices, {} triangles from {}",
            mesh.num_vertices(),
            mesh.num_triangles(),
            path.display()
        );
        Ok(mesh)
    }
}
