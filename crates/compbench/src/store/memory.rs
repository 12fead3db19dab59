//! In-process store.
//!
//! Holds documents in a shared vector and evaluates predicates locally.
//! Inserted documents without an `_id` get one, as on the server.
//! Connections from one [`MemoryConnector`] share the same collection, the
//! way every MongoDB connection sees the same server-side collection.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use mongodb::bson::Document;
use parking_lot::Mutex;

use super::{Connector, DocumentStore};
use crate::compressor::Compressor;
use crate::document::with_object_id;
use crate::error::StoreError;
use crate::query::Predicate;

#[derive(Debug, Default)]
struct Shared {
    docs: Mutex<Vec<Document>>,
    find_calls: AtomicU64,
}

/// A collection kept in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.shared.docs.lock().len()
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.shared.docs.lock().is_empty()
    }

    /// Number of `find` calls served.
    pub fn find_calls(&self) -> u64 {
        self.shared.find_calls.load(Ordering::Relaxed)
    }
}

impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn insert_many(&self, docs: &[Document]) -> Result<(), StoreError> {
        self.shared
            .docs
            .lock()
            .extend(docs.iter().cloned().map(with_object_id));
        Ok(())
    }

    async fn find(&self, predicate: &Predicate) -> Result<Vec<Document>, StoreError> {
        self.shared.find_calls.fetch_add(1, Ordering::Relaxed);
        let docs = self.shared.docs.lock();
        Ok(docs
            .iter()
            .filter(|d| predicate.matches_document(d))
            .cloned()
            .collect())
    }

    async fn delete_many(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let mut docs = self.shared.docs.lock();
        let before = docs.len();
        docs.retain(|d| !predicate.matches_document(d));
        Ok((before - docs.len()) as u64)
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let docs = self.shared.docs.lock();
        Ok(docs.iter().filter(|d| predicate.matches_document(d)).count() as u64)
    }
}

/// Hands out handles to one shared [`MemoryStore`].
///
/// The compressor is only recorded; nothing goes over a wire.
#[derive(Debug, Clone, Default)]
pub struct MemoryConnector {
    store: MemoryStore,
    connections: Arc<Mutex<Vec<Compressor>>>,
}

impl MemoryConnector {
    /// Create a connector over an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared collection.
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    /// Compressors passed to `connect`, in call order.
    pub fn connections(&self) -> Vec<Compressor> {
        self.connections.lock().clone()
    }
}

impl Connector for MemoryConnector {
    type Store = MemoryStore;

    async fn connect(&self, compressor: Compressor) -> Result<MemoryStore, StoreError> {
        self.connections.lock().push(compressor);
        Ok(self.store.clone())
    }

    fn describe(&self, compressor: Compressor) -> String {
        format!("memory (compressor {})", compressor)
    }
}
