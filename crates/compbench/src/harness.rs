//! Measurement harness.
//!
//! Runs one (size, compressor) trial at a time: bulk insert, the nine-query
//! suite, then a full clear. Results land in a fixed-size
//! [`MeasurementTable`] owned by the harness.

use std::fmt;
use std::time::{Duration, Instant};

use mongodb::bson::Document;

use crate::compressor::Compressor;
use crate::document::{generate_documents, payload_size, with_object_id};
use crate::error::{BenchError, Result, StoreError};
use crate::query::{clear_predicate, query_suite, QuerySpec};
use crate::store::DocumentStore;

/// Operations measured per trial: the insert plus nine queries.
pub const OPERATION_COUNT: usize = 10;

/// A measured operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// The bulk insert (index 0).
    Insert,
    /// Query `n`, 1 through 9 (index `n`).
    Query(u8),
}

impl Operation {
    /// All operations in table order.
    pub fn all() -> impl Iterator<Item = Operation> {
        (0..OPERATION_COUNT).map(Operation::from_index)
    }

    /// Position in the operation axis of the table.
    pub fn index(&self) -> usize {
        match self {
            Operation::Insert => 0,
            Operation::Query(n) => usize::from(*n),
        }
    }

    /// Whether this is one of the ten measured operations.
    pub fn is_measured(&self) -> bool {
        match self {
            Operation::Insert => true,
            Operation::Query(n) => (1..OPERATION_COUNT).contains(&usize::from(*n)),
        }
    }

    /// Inverse of [`Operation::index`].
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Operation::Insert,
            n => Operation::Query(n as u8),
        }
    }

    /// Column prefix in the CSV report (`Insert`, `Query1`, ...).
    pub fn column_prefix(&self) -> String {
        match self {
            Operation::Insert => "Insert".to_string(),
            Operation::Query(n) => format!("Query{}", n),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Insert => write!(f, "insert"),
            Operation::Query(n) => write!(f, "query {}", n),
        }
    }
}

/// Elapsed time and payload size for one operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    /// Wall-clock time.
    pub elapsed: Duration,
    /// Payload size in bytes.
    pub bytes: u64,
}

impl Measurement {
    /// Elapsed time in seconds.
    pub fn secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// Results indexed by `[size][compressor][operation]`.
///
/// Dimensions are fixed at construction. Unrecorded cells stay `None` so a
/// gap can never be mistaken for a zero timing.
#[derive(Debug, Clone)]
pub struct MeasurementTable {
    sizes: usize,
    compressors: usize,
    cells: Vec<Option<Measurement>>,
}

impl MeasurementTable {
    /// Allocate an empty table.
    pub fn new(sizes: usize, compressors: usize) -> Self {
        Self {
            sizes,
            compressors,
            cells: vec![None; sizes * compressors * OPERATION_COUNT],
        }
    }

    /// Number of sizes.
    pub fn sizes(&self) -> usize {
        self.sizes
    }

    /// Number of compressors.
    pub fn compressors(&self) -> usize {
        self.compressors
    }

    fn offset(&self, size_index: usize, compressor_index: usize, operation: Operation) -> usize {
        assert!(
            size_index < self.sizes && compressor_index < self.compressors,
            "cell ({}, {}) outside a {}x{} table",
            size_index,
            compressor_index,
            self.sizes,
            self.compressors
        );
        assert!(operation.is_measured(), "no such operation: {}", operation);
        (size_index * self.compressors + compressor_index) * OPERATION_COUNT + operation.index()
    }

    /// Store a measurement, replacing any previous value.
    pub fn record(
        &mut self,
        size_index: usize,
        compressor_index: usize,
        operation: Operation,
        measurement: Measurement,
    ) {
        let offset = self.offset(size_index, compressor_index, operation);
        self.cells[offset] = Some(measurement);
    }

    /// Look up a measurement.
    pub fn get(
        &self,
        size_index: usize,
        compressor_index: usize,
        operation: Operation,
    ) -> Option<&Measurement> {
        let offset = self.offset(size_index, compressor_index, operation);
        self.cells[offset].as_ref()
    }

    /// Cells that were never recorded, as `(size_index, compressor_index, operation)`.
    pub fn missing(&self) -> Vec<(usize, usize, Operation)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.is_none())
            .map(|(i, _)| {
                let op = Operation::from_index(i % OPERATION_COUNT);
                let row = i / OPERATION_COUNT;
                (row / self.compressors, row % self.compressors, op)
            })
            .collect()
    }

    /// Whether every cell holds a measurement.
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }
}

/// How query latency is sampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryPolicy {
    /// One execution per query.
    SingleShot,
    /// Run each query `iterations` times and record the mean time. The byte
    /// size comes from the last execution.
    Averaged { iterations: u32 },
}

impl QueryPolicy {
    /// Policy for an iteration count; 1 means single shot.
    pub fn from_iterations(iterations: u32) -> Self {
        if iterations == 1 {
            QueryPolicy::SingleShot
        } else {
            QueryPolicy::Averaged { iterations }
        }
    }

    /// Executions per query.
    pub fn iterations(&self) -> u32 {
        match self {
            QueryPolicy::SingleShot => 1,
            QueryPolicy::Averaged { iterations } => *iterations,
        }
    }
}

impl Default for QueryPolicy {
    fn default() -> Self {
        QueryPolicy::Averaged { iterations: 10 }
    }
}

/// Identifies the trial in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trial {
    /// Number of documents.
    pub size: usize,
    /// Row of `size` in the table.
    pub size_index: usize,
    /// Compression mode of the connection.
    pub compressor: Compressor,
    /// Column of `compressor` in the table.
    pub compressor_index: usize,
}

impl Trial {
    fn fail(&self, operation: Operation) -> impl FnOnce(StoreError) -> BenchError {
        let trial = *self;
        move |source| BenchError::Operation {
            size: trial.size,
            compressor: trial.compressor,
            operation,
            source,
        }
    }

    fn clear_failed(&self) -> impl Fn(StoreError) -> BenchError {
        let trial = *self;
        move |source| BenchError::Clear {
            size: trial.size,
            compressor: trial.compressor,
            source,
        }
    }
}

/// Runs trials against a store and records the results.
pub struct Harness {
    table: MeasurementTable,
    policy: QueryPolicy,
    queries: Vec<QuerySpec>,
}

impl Harness {
    /// Create a harness with an empty table of the given dimensions.
    pub fn new(sizes: usize, compressors: usize, policy: QueryPolicy) -> Self {
        Self {
            table: MeasurementTable::new(sizes, compressors),
            policy,
            queries: query_suite(),
        }
    }

    /// Measurements recorded so far.
    pub fn table(&self) -> &MeasurementTable {
        &self.table
    }

    /// Consume the harness, returning its table.
    pub fn into_table(self) -> MeasurementTable {
        self.table
    }

    /// Generate `trial.size` documents and time a single bulk insert.
    ///
    /// `_id`s are assigned before sizing, so the insert payload has the same
    /// shape as the documents queries later return.
    pub async fn insert_trial<S: DocumentStore>(
        &mut self,
        store: &S,
        trial: &Trial,
    ) -> Result<Measurement> {
        let docs: Vec<Document> = generate_documents(trial.size)
            .into_iter()
            .map(with_object_id)
            .collect();
        let bytes = payload_size(&docs)?;

        let start = Instant::now();
        store
            .insert_many(&docs)
            .await
            .map_err(trial.fail(Operation::Insert))?;
        let elapsed = start.elapsed();

        let measurement = Measurement { elapsed, bytes };
        self.table.record(
            trial.size_index,
            trial.compressor_index,
            Operation::Insert,
            measurement,
        );

        tracing::info!(
            size = trial.size,
            compressor = %trial.compressor,
            elapsed_ms = elapsed.as_secs_f64() * 1000.0,
            bytes,
            "insert complete"
        );
        Ok(measurement)
    }

    /// Run queries 1 through 9 in order against the populated collection.
    pub async fn run_query_suite<S: DocumentStore>(
        &mut self,
        store: &S,
        trial: &Trial,
    ) -> Result<()> {
        let iterations = self.policy.iterations().max(1);

        for spec in &self.queries {
            let operation = Operation::Query(spec.id);
            let mut total = Duration::ZERO;
            let mut bytes = 0;

            for _ in 0..iterations {
                let start = Instant::now();
                let results = store
                    .find(&spec.predicate)
                    .await
                    .map_err(trial.fail(operation))?;
                total += start.elapsed();
                bytes = payload_size(&results)?;
            }

            let measurement = Measurement {
                elapsed: total / iterations,
                bytes,
            };
            self.table.record(
                trial.size_index,
                trial.compressor_index,
                operation,
                measurement,
            );

            tracing::debug!(
                query = spec.id,
                filter = spec.description,
                size = trial.size,
                compressor = %trial.compressor,
                elapsed_ms = measurement.secs() * 1000.0,
                bytes,
                "query complete"
            );
        }

        tracing::info!(
            size = trial.size,
            compressor = %trial.compressor,
            queries = self.queries.len(),
            iterations,
            "query suite complete"
        );
        Ok(())
    }

    /// Delete every document and verify the collection is empty.
    pub async fn clear_trial<S: DocumentStore>(&self, store: &S, trial: &Trial) -> Result<()> {
        let all = clear_predicate();
        let deleted = store
            .delete_many(&all)
            .await
            .map_err(trial.clear_failed())?;

        let remaining = store.count(&all).await.map_err(trial.clear_failed())?;
        if remaining != 0 {
            return Err(BenchError::ResidualDocuments {
                size: trial.size,
                compressor: trial.compressor,
                remaining,
            });
        }

        tracing::debug!(
            size = trial.size,
            compressor = %trial.compressor,
            deleted,
            "collection cleared"
        );
        Ok(())
    }

    /// Empty the collection before a compressor's first trial.
    ///
    /// Leftovers from an aborted run would otherwise inflate both the insert
    /// and the query result sizes.
    pub async fn prepare_collection<S: DocumentStore>(
        &self,
        store: &S,
        compressor: Compressor,
    ) -> Result<()> {
        let all = clear_predicate();
        let fail = |source| BenchError::Prepare { compressor, source };

        let existing = store.count(&all).await.map_err(fail)?;
        if existing > 0 {
            tracing::warn!(
                compressor = %compressor,
                existing,
                "collection not empty before first trial, clearing"
            );
            store.delete_many(&all).await.map_err(fail)?;

            let remaining = store.count(&all).await.map_err(fail)?;
            if remaining != 0 {
                return Err(BenchError::LeftoverDocuments {
                    compressor,
                    remaining,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn trial(size: usize) -> Trial {
        Trial {
            size,
            size_index: 0,
            compressor: Compressor::None,
            compressor_index: 0,
        }
    }

    #[test]
    fn test_operation_indexes() {
        let ops: Vec<_> = Operation::all().collect();
        assert_eq!(ops.len(), OPERATION_COUNT);
        assert_eq!(ops[0], Operation::Insert);
        assert_eq!(ops[9], Operation::Query(9));
        for (i, op) in ops.iter().enumerate() {
            assert_eq!(op.index(), i);
        }
        assert_eq!(Operation::Insert.column_prefix(), "Insert");
        assert_eq!(Operation::Query(3).column_prefix(), "Query3");
        assert_eq!(Operation::Query(3).to_string(), "query 3");
    }

    #[test]
    fn test_table_record_and_missing() {
        let mut table = MeasurementTable::new(2, 3);
        assert_eq!(table.missing().len(), 2 * 3 * OPERATION_COUNT);
        assert!(!table.is_complete());

        let m = Measurement {
            elapsed: Duration::from_millis(5),
            bytes: 10,
        };
        table.record(1, 2, Operation::Query(7), m);
        assert_eq!(table.get(1, 2, Operation::Query(7)), Some(&m));
        assert_eq!(table.get(1, 1, Operation::Query(7)), None);
        assert!(!table.missing().contains(&(1, 2, Operation::Query(7))));
        assert!(table.missing().contains(&(1, 1, Operation::Query(7))));

        for s in 0..2 {
            for c in 0..3 {
                for op in Operation::all() {
                    table.record(s, c, op, m);
                }
            }
        }
        assert!(table.is_complete());
        assert!(table.missing().is_empty());
    }

    #[test]
    #[should_panic]
    fn test_table_out_of_bounds() {
        let mut table = MeasurementTable::new(1, 1);
        table.record(
            1,
            0,
            Operation::Insert,
            Measurement {
                elapsed: Duration::ZERO,
                bytes: 0,
            },
        );
    }

    #[test]
    #[should_panic(expected = "no such operation")]
    fn test_table_rejects_unknown_query() {
        let mut table = MeasurementTable::new(2, 2);
        table.record(
            0,
            0,
            Operation::Query(10),
            Measurement {
                elapsed: Duration::ZERO,
                bytes: 0,
            },
        );
    }

    #[test]
    #[should_panic(expected = "no such operation")]
    fn test_table_rejects_query_zero() {
        let table = MeasurementTable::new(1, 1);
        let _ = table.get(0, 0, Operation::Query(0));
    }

    #[test]
    fn test_measured_operations() {
        assert!(Operation::all().all(|op| op.is_measured()));
        assert!(!Operation::Query(0).is_measured());
        assert!(!Operation::Query(10).is_measured());
    }

    #[test]
    fn test_policy_from_iterations() {
        assert_eq!(QueryPolicy::from_iterations(1), QueryPolicy::SingleShot);
        assert_eq!(
            QueryPolicy::from_iterations(10),
            QueryPolicy::Averaged { iterations: 10 }
        );
        assert_eq!(QueryPolicy::default().iterations(), 10);
        assert_eq!(QueryPolicy::SingleShot.iterations(), 1);
    }

    #[tokio::test]
    async fn test_insert_trial_records_cell() {
        let store = MemoryStore::new();
        let mut harness = Harness::new(1, 1, QueryPolicy::SingleShot);

        let m = harness.insert_trial(&store, &trial(100)).await.unwrap();
        assert_eq!(store.len(), 100);
        assert_eq!(harness.table().get(0, 0, Operation::Insert), Some(&m));

        // The measured payload is the stored documents, ids included.
        let stored = store.find(&clear_predicate()).await.unwrap();
        assert!(stored.iter().all(|d| d.get_object_id("_id").is_ok()));
        assert_eq!(m.bytes, payload_size(&stored).unwrap());
        assert!(m.bytes > payload_size(&generate_documents(100)).unwrap());
    }

    #[tokio::test]
    async fn test_query_suite_fills_all_queries() {
        let store = MemoryStore::new();
        let mut harness = Harness::new(1, 1, QueryPolicy::Averaged { iterations: 3 });
        let t = trial(1000);

        harness.insert_trial(&store, &t).await.unwrap();
        harness.run_query_suite(&store, &t).await.unwrap();

        assert!(harness.table().is_complete());

        // Query 8 returns every stored document with its `_id`, which the
        // insert payload already counts.
        let insert = harness.table().get(0, 0, Operation::Insert).unwrap();
        let q8 = harness.table().get(0, 0, Operation::Query(8)).unwrap();
        let stored = store.find(&clear_predicate()).await.unwrap();
        assert_eq!(q8.bytes, payload_size(&stored).unwrap());
        assert_eq!(q8.bytes, insert.bytes);

        // Nothing above OrderCount 5000 in a 1000-document set.
        let q1 = harness.table().get(0, 0, Operation::Query(1)).unwrap();
        assert_eq!(q1.bytes, 2);
        assert_eq!(store.find_calls(), 9 * 3 + 1);
    }

    #[tokio::test]
    async fn test_clear_trial_empties_collection() {
        let store = MemoryStore::new();
        let mut harness = Harness::new(1, 1, QueryPolicy::SingleShot);
        let t = trial(250);

        harness.insert_trial(&store, &t).await.unwrap();
        harness.clear_trial(&store, &t).await.unwrap();
        assert_eq!(store.count(&clear_predicate()).await.unwrap(), 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_prepare_removes_leftovers() {
        let store = MemoryStore::new();
        store.insert_many(&generate_documents(5)).await.unwrap();

        let harness = Harness::new(1, 1, QueryPolicy::SingleShot);
        harness
            .prepare_collection(&store, Compressor::None)
            .await
            .unwrap();
        assert!(store.is_empty());
    }

    /// Deletes report success but remove nothing.
    struct StickyStore(MemoryStore);

    impl DocumentStore for StickyStore {
        fn name(&self) -> &str {
            "sticky"
        }

        async fn insert_many(&self, docs: &[Document]) -> std::result::Result<(), StoreError> {
            self.0.insert_many(docs).await
        }

        async fn find(
            &self,
            predicate: &crate::query::Predicate,
        ) -> std::result::Result<Vec<Document>, StoreError> {
            self.0.find(predicate).await
        }

        async fn delete_many(
            &self,
            _predicate: &crate::query::Predicate,
        ) -> std::result::Result<u64, StoreError> {
            Ok(0)
        }

        async fn count(
            &self,
            predicate: &crate::query::Predicate,
        ) -> std::result::Result<u64, StoreError> {
            self.0.count(predicate).await
        }
    }

    #[tokio::test]
    async fn test_prepare_fails_when_leftovers_survive() {
        let store = StickyStore(MemoryStore::new());
        store.insert_many(&generate_documents(5)).await.unwrap();

        let harness = Harness::new(1, 1, QueryPolicy::SingleShot);
        let err = harness
            .prepare_collection(&store, Compressor::Snappy)
            .await
            .unwrap_err();
        match err {
            BenchError::LeftoverDocuments {
                compressor,
                remaining,
            } => {
                assert_eq!(compressor, Compressor::Snappy);
                assert_eq!(remaining, 5);
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
