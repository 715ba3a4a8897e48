//! Benchmark adaptive refinement against procedural terrain.
//!
//! Run with: cargo run --release --bin bench_refine
//!
//! Usage:
//!   bench_refine                 Run default budgets (10k, 100k)
//!   bench_refine 50k 250k 1m     Run specific vertex budgets
//!   bench_refine --threshold 25  Use a looser error threshold
//!   bench_refine -n 5            Repeat each budget (for profiling)

use std::time::Instant;

use clap::Parser;

use adamesh::field::NoiseField;
use adamesh::{refine, RefineConfig, StopReason};

fn parse_count(s: &str) -> Result<usize, String> {
    let s = s.to_lowercase();
    let (num_str, multiplier) = if let Some(n) = s.strip_suffix('m') {
        (n, 1_000_000)
    } else if let Some(n) = s.strip_suffix('k') {
        (n, 1_000)
    } else {
        (s.as_str(), 1)
    };

    num_str
        .parse::<f64>()
        .map(|n| (n * multiplier as f64) as usize)
        .map_err(|e| format!("Invalid number '{}': {}", s, e))
}

#[derive(Parser)]
#[command(name = "bench_refine")]
#[command(about = "Benchmark adaptive refinement at various vertex budgets")]
struct Args {
    /// Vertex budgets to benchmark (e.g., 10k, 100k, 1m)
    #[arg(value_parser = parse_count)]
    budgets: Vec<usize>,

    /// Terrain seed
    #[arg(short, long, default_value_t = 12345)]
    seed: u64,

    /// Error threshold in metres
    #[arg(long, default_value_t = 1.0)]
    threshold: f64,

    /// Terrain amplitude in metres
    #[arg(long, default_value_t = 5000.0)]
    amplitude: f64,

    /// Validate each mesh after refinement
    #[arg(long)]
    validate: bool,

    /// Number of iterations per budget
    #[arg(short = 'n', long, default_value_t = 1)]
    repeat: usize,
}

fn format_rate(count: usize, ms: f64) -> String {
    if ms <= 0.0 {
        return "N/A".to_string();
    }
    let per_sec = count as f64 / (ms / 1000.0);
    if per_sec >= 1_000_000.0 {
        format!("{:.2}M/s", per_sec / 1_000_000.0)
    } else if per_sec >= 1_000.0 {
        format!("{:.1}k/s", per_sec / 1000.0)
    } else {
        format!("{:.0}/s", per_sec)
    }
}

fn main() {
    let args = Args::parse();

    println!("Adaptive Refinement Benchmark");
    println!("=============================\n");

    let budgets = if args.budgets.is_empty() {
        vec![10_000, 100_000]
    } else {
        args.budgets.clone()
    };
    let field = NoiseField::new(args.seed, args.amplitude);

    println!(
        "{:>10} {:>10} {:>10} {:>10} {:>12} {:>10}  stop",
        "budget", "vertices", "triangles", "time", "rate", "max err"
    );
    for &budget in &budgets {
        let config = RefineConfig::default()
            .with_max_vertices(budget)
            .with_error_threshold(args.threshold);

        for _ in 0..args.repeat.max(1) {
            let t0 = Instant::now();
            let output = match refine(&field, &config) {
                Ok(output) => output,
                Err(e) => {
                    eprintln!("budget {}: {}", budget, e);
                    std::process::exit(1);
                }
            };
            let ms = t0.elapsed().as_secs_f64() * 1000.0;

            let stop = match output.stop_reason {
                StopReason::Converged => "converged",
                StopReason::VertexBudget => "budget",
                StopReason::QueueExhausted => "exhausted",
                StopReason::IterationLimit => "iterations",
            };
            println!(
                "{:>10} {:>10} {:>10} {:>8.1}ms {:>12} {:>10.2}  {}",
                budget,
                output.mesh.num_vertices(),
                output.mesh.num_triangles(),
                ms,
                format_rate(output.mesh.num_vertices(), ms),
                output.max_error(),
                stop
            );

            if args.validate {
                let v = output.mesh.validate();
                if !v.is_valid() {
                    v.print_summary();
                }
            }
        }
    }
}
