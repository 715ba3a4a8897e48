mod app;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use adamesh::field::DEFAULT_LMAX;
use adamesh::refine::uniform_icosphere;
use adamesh::util::Timed;
use adamesh::{refine, Mesh, RefineConfig};
use app::export::{export_report, RefinementReport, Report, ValidationReport};
use app::SourceArgs;

/// Adamesh - adaptive triangle meshes of scalar fields on the sphere
#[derive(Parser, Debug)]
#[command(name = "adamesh", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Refine an icosahedron adaptively against a field
    Generate(GenerateArgs),
    /// Build a uniformly subdivided icosphere for comparison
    Uniform(UniformArgs),
    /// Print statistics for an existing ADAMESH file
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Maximum number of vertices
    #[arg(long, default_value_t = 100_000)]
    max_vertices: usize,

    /// Stop once the largest estimated error is below this
    #[arg(long, default_value_t = 10.0)]
    threshold: f64,

    /// Never split triangles whose longest edge is shorter (radians)
    #[arg(long, conflicts_with = "lmax")]
    min_edge: Option<f64>,

    /// Derive the edge floor from the field's spherical-harmonic bandwidth
    #[arg(long)]
    lmax: Option<u32>,

    /// Stop after this many splits
    #[arg(long)]
    max_iterations: Option<usize>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct UniformArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Subdivision levels (10*4^L + 2 vertices)
    #[arg(long, default_value_t = 5)]
    levels: u32,

    /// Bandwidth for the Nyquist check in the report
    #[arg(long, default_value_t = DEFAULT_LMAX)]
    lmax: u32,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct AnalyzeArgs {
    /// ADAMESH file to analyze
    mesh: PathBuf,

    /// Bandwidth for the Nyquist check
    #[arg(long, default_value_t = DEFAULT_LMAX)]
    lmax: u32,

    /// Export statistics to file (supports .json and .json.gz)
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output ADAMESH file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Export statistics to file (supports .json and .json.gz)
    #[arg(long, value_name = "FILE")]
    report: Option<PathBuf>,

    /// Print the full statistics report
    #[arg(long)]
    stats: bool,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Generate(args) => run_generate(args),
        Command::Uniform(args) => run_uniform(args),
        Command::Analyze(args) => run_analyze(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let loaded = args.source.load()?;
    log::info!("Source: {}", loaded.description);

    let lmax = args.lmax.unwrap_or(DEFAULT_LMAX);
    let mut config = RefineConfig::with_bandwidth(lmax)
        .with_max_vertices(args.max_vertices)
        .with_error_threshold(args.threshold)
        .with_max_iterations(args.max_iterations);
    if let Some(min_edge) = args.min_edge {
        config = config.with_min_edge_length(min_edge);
    }

    let output = refine(&*loaded.field, &config).context("refinement failed")?;
    println!(
        "Adaptive mesh: {} vertices, {} triangles ({}, max error {:.3})",
        output.mesh.num_vertices(),
        output.mesh.num_triangles(),
        output.stop_reason,
        output.max_error()
    );

    let refinement = RefinementReport::new(&config, &output);
    finish(&output.mesh, &loaded.description, Some(refinement), lmax, &args.output)
}

fn run_uniform(args: UniformArgs) -> Result<()> {
    let loaded = args.source.load()?;
    log::info!("Source: {}", loaded.description);

    let mesh = {
        let _t = Timed::info(format!("Uniform icosphere, level {}", args.levels));
        uniform_icosphere(args.levels, &*loaded.field)?
    };
    println!(
        "Uniform mesh: {} vertices, {} triangles",
        mesh.num_vertices(),
        mesh.num_triangles()
    );

    finish(&mesh, &loaded.description, None, args.lmax, &args.output)
}

fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let mesh = Mesh::load(&args.mesh)
        .with_context(|| format!("reading {}", args.mesh.display()))?;

    let stats = mesh.stats(args.lmax);
    stats.print_report();

    let validation = mesh.validate();
    println!();
    validation.print_summary();

    if let Some(path) = &args.report {
        let source = args.mesh.display().to_string();
        let report = Report {
            source: &source,
            refinement: None,
            validation: ValidationReport::from(&validation),
            stats: &stats,
        };
        export_report(&report, path)?;
    }
    Ok(())
}

/// Validate, then save and report as requested.
fn finish(
    mesh: &Mesh,
    source: &str,
    refinement: Option<RefinementReport>,
    lmax: u32,
    output: &OutputArgs,
) -> Result<()> {
    let validation = mesh.validate();
    if validation.is_valid() {
        log::info!("Mesh is watertight and outward-facing");
    } else {
        validation.print_summary();
        log::warn!("Mesh failed validation with {} issues", validation.issue_count());
    }

    if let Some(path) = &output.output {
        mesh.save(path)
            .with_context(|| format!("writing {}", path.display()))?;
    }

    if output.stats || output.report.is_some() {
        let stats = mesh.stats(lmax);
        if output.stats {
            stats.print_report();
        }
        if let Some(path) = &output.report {
            let report = Report {
                source,
                refinement,
                validation: ValidationReport::from(&validation),
                stats: &stats,
            };
            export_report(&report, path)?;
        }
    }
    Ok(())
}
