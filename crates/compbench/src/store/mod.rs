//! Document store boundary.
//!
//! The harness only needs bulk insert, filtered find, filtered delete and a
//! count. [`MongoStore`] talks to a real server; [`MemoryStore`] evaluates
//! predicates in-process for tests and server-less runs.

pub mod memory;
pub mod mongo;

pub use memory::{MemoryConnector, MemoryStore};
pub use mongo::{MongoConnector, MongoStore};

use mongodb::bson::Document;

use crate::compressor::Compressor;
use crate::error::StoreError;
use crate::query::Predicate;

/// A single collection the benchmark writes to and queries.
///
/// Calls are issued one at a time and awaited to completion; nothing is
/// retried.
#[allow(async_fn_in_trait)]
pub trait DocumentStore {
    /// Label for logs.
    fn name(&self) -> &str;

    /// Insert all documents in one bulk operation.
    async fn insert_many(&self, docs: &[Document]) -> Result<(), StoreError>;

    /// Fetch the full result set for a predicate.
    async fn find(&self, predicate: &Predicate) -> Result<Vec<Document>, StoreError>;

    /// Delete matching documents, returning how many were removed.
    async fn delete_many(&self, predicate: &Predicate) -> Result<u64, StoreError>;

    /// Count matching documents.
    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError>;

    /// Release the underlying connection.
    async fn close(self)
    where
        Self: Sized,
    {
    }
}

/// Opens one store per compression mode.
#[allow(async_fn_in_trait)]
pub trait Connector {
    /// Store type produced by this connector.
    type Store: DocumentStore;

    /// Connect with the given wire compressor.
    async fn connect(&self, compressor: Compressor) -> Result<Self::Store, StoreError>;

    /// Connection target for a compressor, used in error messages.
    fn describe(&self, compressor: Compressor) -> String;
}
