//! Benchmark driver.
//!
//! Runs every (size, compressor) trial sequentially. One connection is opened
//! per compressor and reused for all sizes; the report is written only after
//! every trial has succeeded.

use std::time::Instant;

use crate::compressor::Compressor;
use crate::config::BenchConfig;
use crate::error::{BenchError, Result};
use crate::harness::{Harness, MeasurementTable, Trial};
use crate::report::Report;
use crate::store::{Connector, DocumentStore};

/// Run all trials and return the filled measurement table.
pub async fn run_trials<C: Connector>(
    config: &BenchConfig,
    connector: &C,
) -> Result<MeasurementTable> {
    config.validate()?;

    let mut harness = Harness::new(
        config.sizes.len(),
        config.compressors.len(),
        config.query_policy,
    );
    let started = Instant::now();

    for (compressor_index, &compressor) in config.compressors.iter().enumerate() {
        tracing::info!(compressor = %compressor, "connecting");
        let store = connector
            .connect(compressor)
            .await
            .map_err(|source| BenchError::Connection {
                compressor,
                uri: connector.describe(compressor),
                source,
            })?;
        tracing::info!(compressor = %compressor, store = store.name(), "connected");

        let outcome =
            run_compressor(&mut harness, &store, config, compressor, compressor_index).await;
        store.close().await;
        outcome?;
    }

    tracing::info!(
        trials = config.sizes.len() * config.compressors.len(),
        elapsed_secs = started.elapsed().as_secs_f64(),
        "all trials complete"
    );
    Ok(harness.into_table())
}

/// Every size for one compressor, on an open store.
async fn run_compressor<S: DocumentStore>(
    harness: &mut Harness,
    store: &S,
    config: &BenchConfig,
    compressor: Compressor,
    compressor_index: usize,
) -> Result<()> {
    harness.prepare_collection(store, compressor).await?;

    for (size_index, &size) in config.sizes.iter().enumerate() {
        let trial = Trial {
            size,
            size_index,
            compressor,
            compressor_index,
        };

        harness.insert_trial(store, &trial).await?;
        harness.run_query_suite(store, &trial).await?;
        harness.clear_trial(store, &trial).await?;
    }
    Ok(())
}

/// Run all trials, then build and write the CSV report.
pub async fn run_benchmark<C: Connector>(config: &BenchConfig, connector: &C) -> Result<Report> {
    let table = run_trials(config, connector).await?;

    if let Some(&(s, c, operation)) = table.missing().first() {
        return Err(BenchError::MissingMeasurement {
            size: config.sizes[s],
            compressor: config.compressors[c],
            operation,
        });
    }

    let report = Report::build(&table, &config.sizes, &config.compressors)?;
    report.write_to_path(&config.output)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::harness::{QueryPolicy, OPERATION_COUNT};
    use crate::store::MemoryConnector;

    #[tokio::test]
    async fn test_one_connection_per_compressor() {
        let config = BenchConfig::default()
            .with_sizes(vec![10, 20, 30])
            .with_compressors(vec![Compressor::None, Compressor::Snappy, Compressor::Zstd])
            .with_query_policy(QueryPolicy::SingleShot);
        let connector = MemoryConnector::new();

        let table = run_trials(&config, &connector).await.unwrap();

        assert_eq!(
            connector.connections(),
            vec![Compressor::None, Compressor::Snappy, Compressor::Zstd]
        );
        assert!(table.is_complete());
        assert!(connector.store().is_empty());
        assert_eq!(
            connector.store().find_calls(),
            (3 * 3 * (OPERATION_COUNT - 1)) as u64
        );
    }

    #[tokio::test]
    async fn test_invalid_config_connects_nothing() {
        let config = BenchConfig::default().with_compressors(vec![Compressor::Zlib]);
        let connector = MemoryConnector::new();

        let err = run_trials(&config, &connector).await.unwrap_err();
        assert!(matches!(err, BenchError::InvalidConfig(_)));
        assert!(connector.connections().is_empty());
    }
}
