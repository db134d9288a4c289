//! End-to-end tests for the public archive client API
//!
//! Everything here goes through `ArchiveClient` against the embedded
//! backend, plus small store doubles where a test needs to observe or
//! script backend behavior.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use serde_json::{json, Value};

use wmarchive::{
    ArchiveClient, ArchiveConfig, Document, DocumentStore, DocumentStream, Error, Filter,
    InsertReport, MemoryStore, QuerySpec, RemoveReport, StoreError, StoreResult, UpdateReport,
    Wmaid,
};

// ============================================================================
// Helpers
// ============================================================================

fn doc(value: Value) -> Document {
    match value {
        Value::Object(map) => Document::from_map(map),
        other => panic!("expected object, got {other}"),
    }
}

fn batch(n: usize) -> Vec<Document> {
    (0..n).map(|i| doc(json!({"task": format!("t{i}")}))).collect()
}

fn small_chunks() -> ArchiveConfig {
    ArchiveConfig {
        chunk_size: 2,
        ..ArchiveConfig::default()
    }
}

/// Delegates to an embedded store while recording bulk-insert calls
struct CountingStore {
    inner: MemoryStore,
    insert_calls: AtomicUsize,
    chunk_sizes: Mutex<Vec<usize>>,
}

impl CountingStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            insert_calls: AtomicUsize::new(0),
            chunk_sizes: Mutex::new(Vec::new()),
        }
    }
}

impl DocumentStore for CountingStore {
    fn insert(&self, db: &str, coll: &str, docs: Vec<Document>) -> StoreResult<InsertReport> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.chunk_sizes.lock().push(docs.len());
        self.inner.insert(db, coll, docs)
    }

    fn find(
        &self,
        db: &str,
        coll: &str,
        filter: Filter,
        fields: Option<Vec<String>>,
    ) -> StoreResult<DocumentStream> {
        self.inner.find(db, coll, filter, fields)
    }

    fn update(
        &self,
        db: &str,
        coll: &str,
        filter: Filter,
        update: Filter,
        multi: bool,
    ) -> StoreResult<UpdateReport> {
        self.inner.update(db, coll, filter, update, multi)
    }

    fn remove(&self, db: &str, coll: &str, filter: Filter) -> StoreResult<RemoveReport> {
        self.inner.remove(db, coll, filter)
    }

    fn command(&self, db: &str, name: &str, args: Filter) -> StoreResult<Document> {
        self.inner.command(db, name, args)
    }

    fn drop_database(&self, db: &str) -> StoreResult<()> {
        self.inner.drop_database(db)
    }
}

/// Fails every operation with an unclassified backend fault
struct FailingStore;

impl FailingStore {
    fn fault<T>() -> StoreResult<T> {
        Err(StoreError::Backend {
            reason: "connection reset".to_string(),
        })
    }
}

impl DocumentStore for FailingStore {
    fn insert(&self, _: &str, _: &str, _: Vec<Document>) -> StoreResult<InsertReport> {
        Self::fault()
    }

    fn find(&self, _: &str, _: &str, _: Filter, _: Option<Vec<String>>) -> StoreResult<DocumentStream> {
        Self::fault()
    }

    fn update(&self, _: &str, _: &str, _: Filter, _: Filter, _: bool) -> StoreResult<UpdateReport> {
        Self::fault()
    }

    fn remove(&self, _: &str, _: &str, _: Filter) -> StoreResult<RemoveReport> {
        Self::fault()
    }

    fn command(&self, _: &str, _: &str, _: Filter) -> StoreResult<Document> {
        Self::fault()
    }

    fn drop_database(&self, _: &str) -> StoreResult<()> {
        Self::fault()
    }
}

// ============================================================================
// Write Path
// ============================================================================

#[test]
fn write_returns_one_identifier_per_document_in_input_order() {
    let client = ArchiveClient::in_memory();
    let docs = batch(5);
    let expected: Vec<Wmaid> = docs.iter().map(Wmaid::derive).collect();

    let receipt = client.write(docs).unwrap();

    assert_eq!(receipt.wmaids, expected);
    assert_eq!(receipt.duplicates, 0);
    assert_eq!(client.read(QuerySpec::All, None).unwrap().len(), 5);
}

#[test]
fn five_documents_with_chunk_size_two_issue_three_bulk_inserts() {
    let store = Arc::new(CountingStore::new());
    let client = ArchiveClient::new(store.clone(), small_chunks());

    let receipt = client.write(batch(5)).unwrap();

    assert_eq!(receipt.wmaids.len(), 5);
    assert_eq!(store.insert_calls.load(Ordering::SeqCst), 3);
    assert_eq!(*store.chunk_sizes.lock(), vec![2, 2, 1]);
}

#[test]
fn duplicate_batches_never_fail() {
    let client = ArchiveClient::in_memory();
    let docs = batch(3);

    let first = client.write(docs.clone()).unwrap();
    let second = client.write(docs).unwrap();

    assert_eq!(second.wmaids, first.wmaids);
    assert_eq!(second.duplicates, 3);
    assert_eq!(client.read(QuerySpec::All, None).unwrap().len(), 3);
}

#[test]
fn malformed_document_raises_count_mismatch_after_full_pipeline() {
    let client = ArchiveClient::in_memory();
    let docs = vec![
        doc(json!({"task": "a"})),
        doc(json!({"$task": "b"})),
        doc(json!({"task": "c"})),
    ];

    let result = client.write(docs);

    assert!(matches!(
        result,
        Err(Error::CountMismatch {
            submitted: 3,
            persisted: 2
        })
    ));
    // the valid documents from the same chunk were still persisted
    assert_eq!(client.read(QuerySpec::All, None).unwrap().len(), 2);
}

#[test]
fn existing_valid_identifier_passes_through() {
    let client = ArchiveClient::in_memory();
    let id = "0123456789abcdef0123456789abcdef";

    let receipt = client.write([doc(json!({"wmaid": id, "task": "a"}))]).unwrap();

    assert_eq!(receipt.wmaids[0].as_str(), id);
}

#[test]
fn invalid_identifier_fails_the_whole_call() {
    let client = ArchiveClient::in_memory();
    let docs = vec![doc(json!({"task": "a"})), doc(json!({"wmaid": "bogus"}))];

    let result = client.write(docs);

    assert!(matches!(result, Err(Error::InvalidIdentifier(_))));
    // nothing reached the store
    assert!(client.read(QuerySpec::All, None).unwrap().is_empty());
}

#[test]
fn unclassified_store_fault_aborts_the_write() {
    let client = ArchiveClient::new(Arc::new(FailingStore), ArchiveConfig::default());

    let result = client.write(batch(2));

    assert!(matches!(result, Err(Error::Store(StoreError::Backend { .. }))));
}

#[test]
fn closed_session_faults_are_recovered_then_reported_as_mismatch() {
    let store = Arc::new(MemoryStore::new());
    let client = ArchiveClient::new(store.clone(), small_chunks());
    store.close();

    let result = client.write(batch(3));

    assert!(matches!(
        result,
        Err(Error::CountMismatch {
            submitted: 3,
            persisted: 0
        })
    ));
}

// ============================================================================
// Routing
// ============================================================================

#[test]
fn job_batch_routes_entirely_to_jobs_collection() {
    let client = ArchiveClient::in_memory();
    let docs = vec![
        doc(json!({"dtype": "job", "task": "a"})),
        doc(json!({"task": "b"})),
    ];

    client.write(docs).unwrap();

    assert_eq!(client.jobs_ids().unwrap().len(), 2);
    assert!(client.read(QuerySpec::All, None).unwrap().is_empty());
}

#[test]
fn plain_batch_routes_to_primary_collection() {
    let client = ArchiveClient::in_memory();

    client.write(batch(2)).unwrap();

    assert_eq!(client.read(QuerySpec::All, None).unwrap().len(), 2);
    assert!(client.jobs_ids().unwrap().is_empty());
}

// ============================================================================
// Read Path
// ============================================================================

#[test]
fn archived_job_reads_back_by_identifier_without_backend_key() {
    let client = ArchiveClient::in_memory();
    let original = doc(json!({"dtype": "job", "task": "merge", "exit_code": 0}));

    let receipt = client.write([original.clone()]).unwrap();
    let found = client.read(receipt.wmaids[0].clone(), None).unwrap();

    assert_eq!(found.len(), 1);
    assert!(!found[0].contains_key("_id"));
    assert_eq!(found[0].get("task"), Some(&json!("merge")));
    assert_eq!(found[0].get("exit_code"), Some(&json!(0)));
    assert_eq!(found[0].wmaid(), Some(receipt.wmaids[0].as_str()));
}

#[test]
fn identifier_list_query_targets_jobs_collection() {
    let client = ArchiveClient::in_memory();
    let docs = vec![
        doc(json!({"dtype": "job", "task": "a"})),
        doc(json!({"dtype": "job", "task": "b"})),
    ];
    let receipt = client.write(docs).unwrap();

    let found = client.read(receipt.wmaids.clone(), None).unwrap();

    assert_eq!(found.len(), 2);
}

#[test]
fn empty_identifier_list_yields_empty_result() {
    let client = ArchiveClient::in_memory();
    client.write([doc(json!({"dtype": "job"}))]).unwrap();

    let found = client.read(QuerySpec::Ids(Vec::new()), None).unwrap();

    assert!(found.is_empty());
}

#[test]
fn arbitrary_filter_targets_primary_collection() {
    let client = ArchiveClient::in_memory();
    client
        .write(vec![
            doc(json!({"site": "T1_US", "task": "a"})),
            doc(json!({"site": "T2_DE", "task": "b"})),
        ])
        .unwrap();

    let mut filter = Filter::new();
    filter.insert("site".to_string(), json!("T2_DE"));
    let found = client.read(filter, None).unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].get("task"), Some(&json!("b")));
}

#[test]
fn read_projects_to_requested_fields() {
    let client = ArchiveClient::in_memory();
    client.write([doc(json!({"site": "T1_US", "task": "a"}))]).unwrap();

    let found = client
        .read(QuerySpec::All, Some(vec!["site".to_string()]))
        .unwrap();

    assert_eq!(found[0].get("site"), Some(&json!("T1_US")));
    assert!(!found[0].contains_key("task"));
    assert!(!found[0].contains_key("_id"));
}

#[test]
fn find_streams_documents_lazily_one_pass() {
    let client = ArchiveClient::in_memory();
    client.write(batch(3)).unwrap();

    let cursor = client.find(QuerySpec::All, None).unwrap();
    let mut seen = 0;
    for item in cursor {
        let document = item.unwrap();
        assert!(!document.contains_key("_id"));
        seen += 1;
    }

    assert_eq!(seen, 3);
}

#[test]
fn read_surfaces_backend_faults_as_read_errors() {
    let client = ArchiveClient::new(Arc::new(FailingStore), ArchiveConfig::default());

    let result = client.read(QuerySpec::All, None);

    assert!(matches!(result, Err(Error::Read { .. })));
}

// ============================================================================
// Update / Remove
// ============================================================================

#[test]
fn update_applies_to_matching_identifiers_in_primary() {
    let client = ArchiveClient::in_memory();
    let receipt = client.write(batch(3)).unwrap();

    let mut update = Filter::new();
    update.insert("$set".to_string(), json!({"processed": true}));
    let report = client.update(&receipt.wmaids[..2], update).unwrap();

    assert_eq!(report.matched, 2);
    assert_eq!(report.modified, 2);

    let mut filter = Filter::new();
    filter.insert("processed".to_string(), json!(true));
    assert_eq!(client.read(filter, None).unwrap().len(), 2);
}

#[test]
fn remove_without_spec_wipes_primary_only() {
    let client = ArchiveClient::in_memory();
    client.write(batch(2)).unwrap();
    client.write([doc(json!({"dtype": "job", "task": "j"}))]).unwrap();

    let report = client.remove(None).unwrap();

    assert_eq!(report.removed, 2);
    assert!(client.read(QuerySpec::All, None).unwrap().is_empty());
    assert_eq!(client.jobs_ids().unwrap().len(), 1);
}

#[test]
fn remove_with_filter_is_selective() {
    let client = ArchiveClient::in_memory();
    client
        .write(vec![
            doc(json!({"site": "T1_US"})),
            doc(json!({"site": "T2_DE"})),
        ])
        .unwrap();

    let mut filter = Filter::new();
    filter.insert("site".to_string(), json!("T1_US"));
    let report = client.remove(Some(filter)).unwrap();

    assert_eq!(report.removed, 1);
    assert_eq!(client.read(QuerySpec::All, None).unwrap().len(), 1);
}

// ============================================================================
// Administrative
// ============================================================================

#[test]
fn stats_passes_backend_reply_through() {
    let client = ArchiveClient::in_memory();
    client.write(batch(4)).unwrap();

    let stats = client.stats().unwrap();

    assert_eq!(stats.get("count"), Some(&json!(4)));
    assert_eq!(stats.get("ns"), Some(&json!("fwjr.db")));
}

#[test]
fn jobs_ids_skips_documents_lacking_identifier() {
    let store = Arc::new(MemoryStore::new());
    let client = ArchiveClient::new(store.clone(), ArchiveConfig::default());

    client.write([doc(json!({"dtype": "job", "task": "a"}))]).unwrap();
    // bypass the assigner to plant a job document without a wmaid
    store
        .insert("fwjr", "jobs", vec![doc(json!({"task": "anonymous"}))])
        .unwrap();

    let ids = client.jobs_ids().unwrap();

    assert_eq!(ids.len(), 1);
    assert_eq!(ids[0].keys().collect::<Vec<_>>(), vec!["wmaid"]);
}

#[test]
fn drop_database_clears_everything() {
    let client = ArchiveClient::in_memory();
    client.write(batch(2)).unwrap();

    client.drop_database("fwjr").unwrap();

    assert!(client.read(QuerySpec::All, None).unwrap().is_empty());
    let stats = client.stats().unwrap();
    assert_eq!(stats.get("count"), Some(&json!(0)));
}
