//! compbench - MongoDB wire compression benchmark.
//!
//! Inserts synthetic customer documents at several dataset sizes, runs a fixed
//! set of nine queries, and writes a CSV comparing every compressor against
//! the uncompressed baseline.

mod args;
mod summary;

use args::{Args, Backend, SummaryFormat};
use clap::Parser;
use compbench::{run_benchmark, BenchConfig, MemoryConnector, MongoConnector, Report};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "compbench=info,compbench_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = BenchConfig::from(&args);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        backend = ?args.backend,
        host = %config.host,
        sizes = ?config.sizes,
        compressors = ?config.compressors,
        iterations = config.query_policy.iterations(),
        output = %config.output.display(),
        "starting benchmark"
    );

    let report = match args.backend {
        Backend::Mongodb => run_benchmark(&config, &MongoConnector::new(&config)).await?,
        Backend::Memory => run_benchmark(&config, &MemoryConnector::new()).await?,
    };

    print_summary(&report, args.summary)?;
    Ok(())
}

fn print_summary(report: &Report, format: SummaryFormat) -> Result<(), serde_json::Error> {
    match format {
        SummaryFormat::Table => println!("{}", summary::format_table(report)),
        SummaryFormat::Json => println!("{}", summary::format_json(report)?),
        SummaryFormat::None => {}
    }
    Ok(())
}
