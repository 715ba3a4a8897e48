//! Choosing and loading the field to mesh.

use std::fmt;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};

use adamesh::field::{EquirectGrid, HealpixMap, NoiseField, ScalarField};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// RING-ordered HEALPix map of raw little-endian f32 values
    Healpix,
    /// Row-major lat/lon grid of raw little-endian f32 values, north row first
    Equirect,
    /// Seeded procedural terrain
    Noise,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Healpix => write!(f, "healpix"),
            SourceKind::Equirect => write!(f, "equirect"),
            SourceKind::Noise => write!(f, "noise"),
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Kind of field to sample
    #[arg(long, value_enum, default_value_t = SourceKind::Noise)]
    pub source: SourceKind,

    /// Raw f32 data file (healpix and equirect sources)
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// HEALPix nside; inferred from the file size when omitted
    #[arg(long)]
    pub nside: Option<u32>,

    /// Grid width in samples (equirect source)
    #[arg(long)]
    pub width: Option<usize>,

    /// Noise seed (noise source); random when omitted
    #[arg(long)]
    pub seed: Option<u64>,

    /// Noise amplitude, in the units of the error threshold
    #[arg(long, default_value_t = 5000.0)]
    pub amplitude: f64,
}

/// A loaded field plus a one-line description for logs and reports.
pub struct LoadedSource {
    pub field: Box<dyn ScalarField>,
    pub description: String,
}

impl SourceArgs {
    pub fn load(&self) -> Result<LoadedSource> {
        match self.source {
            SourceKind::Healpix => {
                let path = self.input_path()?;
                let map = HealpixMap::load(path, self.nside)
                    .with_context(|| format!("loading HEALPix map {}", path.display()))?;
                let description = format!("healpix {} (nside={})", path.display(), map.nside());
                Ok(LoadedSource {
                    field: Box::new(map),
                    description,
                })
            }
            SourceKind::Equirect => {
                let path = self.input_path()?;
                let Some(width) = self.width else {
                    bail!("--width is required for the equirect source");
                };
                let grid = EquirectGrid::load(path, width)
                    .with_context(|| format!("loading grid {}", path.display()))?;
                let description = format!(
                    "equirect {} ({}x{})",
                    path.display(),
                    grid.width(),
                    grid.height()
                );
                Ok(LoadedSource {
                    field: Box::new(grid),
                    description,
                })
            }
            SourceKind::Noise => {
                let seed = self.seed.unwrap_or_else(rand::random);
                Ok(LoadedSource {
                    field: Box::new(NoiseField::new(seed, self.amplitude)),
                    description: format!("noise (seed={}, amplitude={})", seed, self.amplitude),
                })
            }
        }
    }

    fn input_path(&self) -> Result<&PathBuf> {
        self.input
            .as_ref()
            .with_context(|| format!("--input is required for the {} source", self.source))
    }
}
