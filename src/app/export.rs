//! JSON reports for external analysis.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Serialize;

use adamesh::geometry::MeshValidation;
use adamesh::mesh::MeshStats;
use adamesh::{RefineConfig, RefineOutput, RefineStats, StopReason};

/// Everything known about one produced or analyzed mesh.
#[derive(Serialize)]
pub struct Report<'a> {
    pub source: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refinement: Option<RefinementReport<'a>>,
    pub validation: ValidationReport,
    pub stats: &'a MeshStats,
}

#[derive(Serialize)]
pub struct RefinementReport<'a> {
    pub config: &'a RefineConfig,
    pub stop_reason: StopReason,
    pub max_error: f64,
    pub stats: &'a RefineStats,
}

#[derive(Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub watertight: bool,
    pub issues: usize,
    pub euler_characteristic: i64,
    pub total_area: f64,
}

impl<'a> RefinementReport<'a> {
    pub fn new(config: &'a RefineConfig, output: &'a RefineOutput) -> Self {
        Self {
            config,
            stop_reason: output.stop_reason,
            max_error: output.max_error(),
            stats: &output.stats,
        }
    }
}

impl From<&MeshValidation> for ValidationReport {
    fn from(v: &MeshValidation) -> Self {
        Self {
            valid: v.is_valid(),
            watertight: v.is_watertight(),
            issues: v.issue_count(),
            euler_characteristic: v.euler_v as i64 - v.euler_e as i64 + v.euler_f as i64,
            total_area: v.total_area,
        }
    }
}

/// Write `report` as JSON, gzip-compressed when the path ends in `.gz`.
pub fn export_report(report: &Report, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("creating report {}", path.display()))?;

    let is_gzip = path.extension().map(|ext| ext == "gz").unwrap_or(false);

    if is_gzip {
        let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
        serde_json::to_writer_pretty(&mut encoder, report)?;
        encoder.finish()?.flush()?;
    } else {
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, report)?;
        writer.flush()?;
    }

    log::info!("Wrote report to {}", path.display());
    Ok(())
}
