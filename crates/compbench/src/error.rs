//! Error types.

use thiserror::Error;

use crate::compressor::Compressor;
use crate::harness::Operation;

/// Errors raised by a document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The MongoDB driver reported a failure.
    #[error("driver error: {0}")]
    Driver(#[from] mongodb::error::Error),

    /// The store cannot serve requests.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Benchmark run errors.
///
/// Every variant aborts the run; nothing is retried.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Rejected configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Could not reach the database for a compression mode.
    #[error("failed to connect with compressor {compressor} ({uri}): {source}")]
    Connection {
        compressor: Compressor,
        uri: String,
        #[source]
        source: StoreError,
    },

    /// An insert, query or delete failed mid-trial.
    #[error("{operation} failed (size {size}, compressor {compressor}): {source}")]
    Operation {
        size: usize,
        compressor: Compressor,
        operation: Operation,
        #[source]
        source: StoreError,
    },

    /// Deleting a trial's documents failed.
    #[error("clear failed (size {size}, compressor {compressor}): {source}")]
    Clear {
        size: usize,
        compressor: Compressor,
        #[source]
        source: StoreError,
    },

    /// Emptying the collection before a compressor's first trial failed.
    #[error("failed to prepare collection for compressor {compressor}: {source}")]
    Prepare {
        compressor: Compressor,
        #[source]
        source: StoreError,
    },

    /// Clearing a trial left documents in the collection.
    #[error("collection not empty after clear (size {size}, compressor {compressor}): {remaining} documents remain")]
    ResidualDocuments {
        size: usize,
        compressor: Compressor,
        remaining: u64,
    },

    /// Leftover documents survived the clear before a compressor's first trial.
    #[error("collection not empty before first trial (compressor {compressor}): {remaining} documents remain")]
    LeftoverDocuments {
        compressor: Compressor,
        remaining: u64,
    },

    /// A measurement cell was never filled.
    #[error("missing measurement for {operation} (size {size}, compressor {compressor})")]
    MissingMeasurement {
        size: usize,
        compressor: Compressor,
        operation: Operation,
    },

    /// Payload serialization failed.
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// Report file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV writer failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Result type for benchmark operations.
pub type Result<T> = std::result::Result<T, BenchError>;
