//! Build and triangle-count benchmark for the CSR adjacency engine.
//!
//! Generates a random undirected graph, builds a list with the requested
//! options, counts triangles and prints timings plus the admin reports.
#![forbid(unsafe_code)]

use std::error::Error;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::{Parser, ValueEnum};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use sombra_csr::admin::{self, StatsReport, VerifyLevel, VerifyReport};
use sombra_csr::storage::{
    triangles, AdjacencyList, AdjacencyListBuilder, AdjacencyOptions, Aggregation, Compression,
    TriangleCountConfig,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "csr-bench",
    version,
    about = "Builds a random graph and counts its triangles"
)]
struct Cli {
    #[arg(long, default_value_t = 100_000, help = "Number of nodes")]
    nodes: usize,

    #[arg(long, default_value_t = 16, help = "Average undirected degree")]
    avg_degree: usize,

    #[arg(long, default_value_t = 42, help = "Generator seed")]
    seed: u64,

    #[arg(long, value_enum, help = "Block representation override")]
    compression: Option<CompressionArg>,

    #[arg(long, help = "Worker thread override")]
    concurrency: Option<usize>,

    #[arg(long, help = "Degree filter override")]
    max_degree: Option<u64>,

    #[arg(long, value_name = "FILE", help = "TOML file with [adjacency] and [triangles] tables")]
    config: Option<PathBuf>,

    #[arg(long, help = "Decode every block after building")]
    verify: bool,

    #[arg(long, help = "Print the report as JSON")]
    json: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CompressionArg {
    Compressed,
    Uncompressed,
}

impl From<CompressionArg> for Compression {
    fn from(value: CompressionArg) -> Self {
        match value {
            CompressionArg::Compressed => Compression::DeltaVarLong,
            CompressionArg::Uncompressed => Compression::Uncompressed,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BenchConfig {
    adjacency: AdjacencyOptions,
    triangles: TriangleCountConfig,
}

impl BenchConfig {
    fn load(path: Option<&PathBuf>) -> Result<Self, Box<dyn Error>> {
        let Some(path) = path else {
            // Triangle counting needs one relationship per neighbor.
            return Ok(Self {
                adjacency: AdjacencyOptions::new().aggregation(Aggregation::Single),
                triangles: TriangleCountConfig::default(),
            });
        };
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }
}

#[derive(Debug, Serialize)]
struct BenchReport {
    nodes: usize,
    edges: usize,
    build_ms: f64,
    count_ms: f64,
    triangles: u64,
    skipped_nodes: u64,
    average_clustering: f64,
    stats: StatsReport,
    verify: Option<VerifyReport>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn format_duration(d: Duration) -> String {
    let micros = d.as_micros();
    if micros < 1_000 {
        format!("{} µs", micros)
    } else if micros < 1_000_000 {
        format!("{:.2} ms", micros as f64 / 1_000.0)
    } else {
        format!("{:.2} s", micros as f64 / 1_000_000.0)
    }
}

fn millis(d: Duration) -> f64 {
    d.as_secs_f64() * 1_000.0
}

fn random_edges(nodes: usize, avg_degree: usize, seed: u64) -> Vec<(u64, u64)> {
    if nodes < 2 {
        return Vec::new();
    }
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let count = nodes * avg_degree / 2;
    let mut edges = Vec::with_capacity(count);
    while edges.len() < count {
        let s = rng.gen_range(0..nodes as u64);
        let t = rng.gen_range(0..nodes as u64);
        if s != t {
            edges.push((s, t));
        }
    }
    edges
}

fn build(cli: &Cli, options: AdjacencyOptions) -> Result<(AdjacencyList, usize, Duration), Box<dyn Error>> {
    let edges = random_edges(cli.nodes, cli.avg_degree, cli.seed);
    let started = Instant::now();
    let list = AdjacencyListBuilder::undirected_from_edges(cli.nodes, &edges, options)?;
    Ok((list, edges.len(), started.elapsed()))
}

fn print_text(report: &BenchReport, build: Duration, count: Duration) {
    println!("\nCSR BENCH");
    println!("{:<24} {:>15}", "nodes", report.nodes);
    println!("{:<24} {:>15}", "edges", report.edges);
    println!(
        "{:<24} {:>15}",
        "compression",
        report.stats.adjacency.compression.label()
    );
    println!("{:<24} {:>15}", "build", format_duration(build));
    println!("{:<24} {:>15}", "triangle count", format_duration(count));
    println!("{:<24} {:>15}", "triangles", report.triangles);
    println!("{:<24} {:>15}", "skipped nodes", report.skipped_nodes);
    println!("{:<24} {:>15.4}", "avg clustering", report.average_clustering);
    println!("{:<24} {:>15}", "max degree", report.stats.degrees.max);
    println!(
        "{:<24} {:>15.2}",
        "bytes/relationship", report.stats.memory.bytes_per_relationship
    );
    println!("{:<24} {:>15}", "arena pages", report.stats.adjacency.page_count);
    if let Some(verify) = &report.verify {
        let status = if verify.success { "ok" } else { "FAILED" };
        println!("{:<24} {:>15}", "verify", status);
        for finding in &verify.findings {
            println!("  {:?}: {}", finding.severity, finding.message);
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    init_tracing();
    let cli = Cli::parse();
    let mut config = BenchConfig::load(cli.config.as_ref())?;
    if let Some(compression) = cli.compression {
        config.adjacency = config.adjacency.compression(compression.into());
    }
    if let Some(concurrency) = cli.concurrency {
        config.triangles = config.triangles.concurrency(concurrency);
    }
    if let Some(max_degree) = cli.max_degree {
        config.triangles = config.triangles.max_degree(max_degree);
    }

    let (list, edges, build_time) = build(&cli, config.adjacency.clone())?;
    info!(
        nodes = cli.nodes,
        edges,
        build_ms = millis(build_time),
        "csr_bench.build"
    );

    let started = Instant::now();
    let result = triangles::count(&list, &config.triangles)?;
    let count_time = started.elapsed();

    let verify = cli.verify.then(|| admin::verify(&list, VerifyLevel::Full));
    let report = BenchReport {
        nodes: cli.nodes,
        edges,
        build_ms: millis(build_time),
        count_ms: millis(count_time),
        triangles: result.global,
        skipped_nodes: result.skipped_nodes,
        average_clustering: result.average_clustering(&list),
        stats: admin::stats(&list),
        verify,
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report, build_time, count_time);
    }
    Ok(())
}
