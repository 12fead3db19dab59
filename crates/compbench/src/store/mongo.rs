//! MongoDB-backed store.

use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::{Client, Collection};

use super::{Connector, DocumentStore};
use crate::compressor::Compressor;
use crate::config::BenchConfig;
use crate::error::StoreError;
use crate::query::Predicate;

/// Opens MongoDB connections with a compressor negotiated via the URI.
#[derive(Debug, Clone)]
pub struct MongoConnector {
    config: BenchConfig,
}

impl MongoConnector {
    /// Create a connector for the configured host, database and collection.
    pub fn new(config: &BenchConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl Connector for MongoConnector {
    type Store = MongoStore;

    async fn connect(&self, compressor: Compressor) -> Result<MongoStore, StoreError> {
        let uri = self.config.connection_uri(compressor);
        tracing::debug!(%uri, "connecting");

        let client = Client::with_uri_str(&uri).await?;

        // The driver connects lazily; ping so an unreachable server fails here.
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        let collection = client
            .database(&self.config.database)
            .collection::<Document>(&self.config.collection);

        Ok(MongoStore {
            name: format!("{}/{}.{}", uri, self.config.database, self.config.collection),
            client,
            collection,
        })
    }

    fn describe(&self, compressor: Compressor) -> String {
        self.config.connection_uri(compressor)
    }
}

/// One collection on a connected MongoDB client.
pub struct MongoStore {
    name: String,
    client: Client,
    collection: Collection<Document>,
}

impl DocumentStore for MongoStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn insert_many(&self, docs: &[Document]) -> Result<(), StoreError> {
        self.collection.insert_many(docs).await?;
        Ok(())
    }

    async fn find(&self, predicate: &Predicate) -> Result<Vec<Document>, StoreError> {
        let cursor = self.collection.find(predicate.to_filter()).await?;
        let docs: Vec<Document> = cursor.try_collect().await?;
        Ok(docs)
    }

    async fn delete_many(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let result = self.collection.delete_many(predicate.to_filter()).await?;
        Ok(result.deleted_count)
    }

    async fn count(&self, predicate: &Predicate) -> Result<u64, StoreError> {
        let count = self
            .collection
            .count_documents(predicate.to_filter())
            .await?;
        Ok(count)
    }

    async fn close(self) {
        self.client.shutdown().await;
    }
}
