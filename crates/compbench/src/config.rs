//! Benchmark configuration.

use std::collections::HashSet;
use std::path::PathBuf;

use crate::compressor::Compressor;
use crate::error::{BenchError, Result};
use crate::harness::QueryPolicy;

/// Default dataset sizes (documents per trial).
pub const DEFAULT_SIZES: [usize; 5] = [100, 1000, 2000, 5000, 10000];

/// Default MongoDB host.
pub const DEFAULT_HOST: &str = "localhost:27017";

/// Default database name.
pub const DEFAULT_DATABASE: &str = "testdb";

/// Default collection name.
pub const DEFAULT_COLLECTION: &str = "testcollection";

/// Default report path.
pub const DEFAULT_OUTPUT: &str = "results.csv";

/// Default number of executions per query.
pub const DEFAULT_QUERY_ITERATIONS: u32 = 10;

/// Benchmark configuration.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    /// Dataset sizes, in report order.
    pub sizes: Vec<usize>,

    /// Compressors, baseline first.
    pub compressors: Vec<Compressor>,

    /// Server host and port (e.g., "localhost:27017").
    pub host: String,

    /// Database name.
    pub database: String,

    /// Collection name. Emptied between trials.
    pub collection: String,

    /// CSV report path.
    pub output: PathBuf,

    /// How query timings are taken.
    pub query_policy: QueryPolicy,
}

impl BenchConfig {
    /// Set the dataset sizes.
    pub fn with_sizes(mut self, sizes: Vec<usize>) -> Self {
        self.sizes = sizes;
        self
    }

    /// Set the compressors.
    pub fn with_compressors(mut self, compressors: Vec<Compressor>) -> Self {
        self.compressors = compressors;
        self
    }

    /// Set the server host.
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the database name.
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    /// Set the collection name.
    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Set the report path.
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = output.into();
        self
    }

    /// Set the query timing policy.
    pub fn with_query_policy(mut self, policy: QueryPolicy) -> Self {
        self.query_policy = policy;
        self
    }

    /// Connection string for a compression mode.
    pub fn connection_uri(&self, compressor: Compressor) -> String {
        match compressor.uri_option() {
            Some(name) => format!("mongodb://{}/?compressors={}", self.host, name),
            None => format!("mongodb://{}", self.host),
        }
    }

    /// Check the configuration before any connection is opened.
    pub fn validate(&self) -> Result<()> {
        if self.sizes.is_empty() {
            return Err(invalid("at least one dataset size is required"));
        }
        if self.sizes.contains(&0) {
            return Err(invalid("dataset sizes must be positive"));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.sizes.iter().find(|s| !seen.insert(**s)) {
            return Err(invalid(format!("duplicate dataset size {}", dup)));
        }

        match self.compressors.first() {
            None => return Err(invalid("at least one compressor is required")),
            Some(first) if !first.is_baseline() => {
                return Err(invalid(format!(
                    "first compressor must be the baseline 'none', got '{}'",
                    first
                )))
            }
            Some(_) => {}
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.compressors.iter().find(|c| !seen.insert(**c)) {
            return Err(invalid(format!("duplicate compressor {}", dup)));
        }

        if self.host.trim().is_empty() {
            return Err(invalid("host must not be empty"));
        }
        if self.database.trim().is_empty() {
            return Err(invalid("database name must not be empty"));
        }
        if self.collection.trim().is_empty() {
            return Err(invalid("collection name must not be empty"));
        }
        if let QueryPolicy::Averaged { iterations: 0 } = self.query_policy {
            return Err(invalid("query iterations must be positive"));
        }
        Ok(())
    }
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            sizes: DEFAULT_SIZES.to_vec(),
            compressors: Compressor::ALL.to_vec(),
            host: DEFAULT_HOST.to_string(),
            database: DEFAULT_DATABASE.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            query_policy: QueryPolicy::Averaged {
                iterations: DEFAULT_QUERY_ITERATIONS,
            },
        }
    }
}

fn invalid(msg: impl Into<String>) -> BenchError {
    BenchError::InvalidConfig(msg.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BenchConfig::default();
        assert_eq!(config.sizes, vec![100, 1000, 2000, 5000, 10000]);
        assert_eq!(config.compressors[0], Compressor::None);
        assert_eq!(config.compressors.len(), 4);
        assert_eq!(config.host, DEFAULT_HOST);
        assert_eq!(config.output, PathBuf::from("results.csv"));
        assert_eq!(
            config.query_policy,
            QueryPolicy::Averaged { iterations: 10 }
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = BenchConfig::default()
            .with_sizes(vec![10])
            .with_compressors(vec![Compressor::None, Compressor::Zstd])
            .with_host("db.internal:27018")
            .with_database("bench")
            .with_collection("docs")
            .with_output("/tmp/out.csv")
            .with_query_policy(QueryPolicy::SingleShot);

        assert_eq!(config.sizes, vec![10]);
        assert_eq!(config.host, "db.internal:27018");
        assert_eq!(config.database, "bench");
        assert_eq!(config.collection, "docs");
        assert_eq!(config.output, PathBuf::from("/tmp/out.csv"));
        assert_eq!(config.query_policy, QueryPolicy::SingleShot);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_connection_uri() {
        let config = BenchConfig::default();
        assert_eq!(
            config.connection_uri(Compressor::None),
            "mongodb://localhost:27017"
        );
        assert_eq!(
            config.connection_uri(Compressor::Zstd),
            "mongodb://localhost:27017/?compressors=zstd"
        );
    }

    #[test]
    fn test_baseline_must_come_first() {
        let config = BenchConfig::default()
            .with_compressors(vec![Compressor::Zstd, Compressor::None]);
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("baseline"));
    }

    #[test]
    fn test_rejects_bad_sizes() {
        assert!(BenchConfig::default().with_sizes(vec![]).validate().is_err());
        assert!(BenchConfig::default().with_sizes(vec![0]).validate().is_err());
        assert!(BenchConfig::default()
            .with_sizes(vec![100, 100])
            .validate()
            .is_err());
    }

    #[test]
    fn test_rejects_duplicate_compressors() {
        let config = BenchConfig::default().with_compressors(vec![
            Compressor::None,
            Compressor::Zlib,
            Compressor::Zlib,
        ]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_iterations() {
        let config =
            BenchConfig::default().with_query_policy(QueryPolicy::Averaged { iterations: 0 });
        assert!(config.validate().is_err());
    }
}
