//! Command-line arguments.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use compbench::config::{
    DEFAULT_COLLECTION, DEFAULT_DATABASE, DEFAULT_HOST, DEFAULT_OUTPUT, DEFAULT_QUERY_ITERATIONS,
    DEFAULT_SIZES,
};
use compbench::{BenchConfig, Compressor, QueryPolicy};

/// Where documents are stored during the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// A MongoDB server
    Mongodb,
    /// In-process collection (no server, compressors have no effect)
    Memory,
}

/// Console summary printed after the report is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormat {
    /// ASCII table
    Table,
    /// JSON
    Json,
    /// No summary
    None,
}

/// MongoDB wire compression benchmark.
#[derive(Parser, Debug)]
#[command(name = "compbench")]
#[command(version, about = "Benchmark MongoDB insert and query latency across wire compressors")]
pub struct Args {
    /// Dataset sizes (documents per trial)
    #[arg(long, value_delimiter = ',', default_values_t = DEFAULT_SIZES.to_vec())]
    pub sizes: Vec<usize>,

    /// Compressors; the first must be the baseline "none"
    #[arg(long, value_delimiter = ',', value_parser = parse_compressor, default_values_t = Compressor::ALL.to_vec())]
    pub compressors: Vec<Compressor>,

    /// MongoDB host and port
    #[arg(short = 'H', long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Database name
    #[arg(long, default_value = DEFAULT_DATABASE)]
    pub database: String,

    /// Collection name (emptied between trials)
    #[arg(long, default_value = DEFAULT_COLLECTION)]
    pub collection: String,

    /// CSV report path
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Executions per query; the mean time is recorded (1 = single shot)
    #[arg(long, default_value_t = DEFAULT_QUERY_ITERATIONS)]
    pub iterations: u32,

    /// Storage backend
    #[arg(long, default_value = "mongodb", value_enum)]
    pub backend: Backend,

    /// Summary printed after the run
    #[arg(long, default_value = "table", value_enum)]
    pub summary: SummaryFormat,
}

impl From<&Args> for BenchConfig {
    fn from(args: &Args) -> Self {
        BenchConfig::default()
            .with_sizes(args.sizes.clone())
            .with_compressors(args.compressors.clone())
            .with_host(&args.host)
            .with_database(&args.database)
            .with_collection(&args.collection)
            .with_output(&args.output)
            .with_query_policy(QueryPolicy::from_iterations(args.iterations))
    }
}

fn parse_compressor(s: &str) -> Result<Compressor, String> {
    s.parse().map_err(|e: compbench::BenchError| e.to_string())
}
