//! Compression benchmark harness for MongoDB.
//!
//! Measures bulk insert and query latency, plus payload sizes, for every
//! combination of dataset size and wire compressor, then writes a CSV report
//! with time savings relative to the uncompressed baseline.
//!
//! # Components
//!
//! - **Driver**: iterates compressors × sizes, one connection per compressor
//! - **Harness**: insert, run the fixed query suite, clear
//! - **Report**: derived savings metrics and CSV output
//!
//! # Example
//!
//! ```ignore
//! use compbench::{run_benchmark, BenchConfig, MongoConnector};
//!
//! #[tokio::main]
//! async fn main() -> compbench::Result<()> {
//!     let config = BenchConfig::default().with_sizes(vec![100, 1000]);
//!     let connector = MongoConnector::new(&config);
//!     let report = run_benchmark(&config, &connector).await?;
//!     println!("{} rows written", report.rows().len());
//!     Ok(())
//! }
//! ```

pub mod compressor;
pub mod config;
pub mod document;
pub mod driver;
pub mod error;
pub mod harness;
pub mod query;
pub mod report;
pub mod store;

pub use compressor::Compressor;
pub use config::BenchConfig;
pub use document::{generate_documents, payload_size, with_object_id};
pub use driver::{run_benchmark, run_trials};
pub use error::{BenchError, Result, StoreError};
pub use harness::{
    Harness, Measurement, MeasurementTable, Operation, QueryPolicy, Trial, OPERATION_COUNT,
};
pub use query::{clear_predicate, query_suite, Predicate, QuerySpec, TextPattern};
pub use report::{saved_percentage, saved_time, OperationReport, Report, ReportRow};
pub use store::{Connector, DocumentStore, MemoryConnector, MemoryStore, MongoConnector, MongoStore};

/// Re-export of the BSON types used at the store boundary.
pub use mongodb::bson;
