//! In-memory reference backend
//!
//! This module implements the [`DocumentStore`] trait using:
//! - `BTreeMap<(db, coll), Collection>` behind `parking_lot::RwLock`
//! - `AtomicU64` for monotonically increasing backend keys
//! - A unique identifier index per collection
//!
//! # Design Notes
//!
//! - **Duplicates are reported, never raised**: a document whose `wmaid`
//!   is already indexed counts into [`InsertReport::duplicates`] and the
//!   rest of the batch is still processed.
//! - **Per-document rejection**: a document with an illegal field name is
//!   reported in [`InsertReport::rejected`] without failing the batch.
//! - **Logical sessions**: [`MemoryStore::close`] invalidates the handle;
//!   subsequent operations report `InvalidOperation`.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;
use serde_json::Value;

use wmarchive_core::{
    Document, DocumentStore, DocumentStream, Filter, InsertReport, RemoveReport, StoreError,
    StoreResult, UpdateReport, STORAGE_ID_FIELD,
};

/// One named collection: backend key → document, plus the identifier index
#[derive(Debug, Default)]
struct Collection {
    docs: BTreeMap<u64, Document>,
    wmaid_index: BTreeMap<String, u64>,
}

/// Embedded document store
///
/// Thread-safe through `parking_lot::RwLock` and atomics. Suitable for
/// embedded use and as the test double for the client layer.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<BTreeMap<(String, String), Collection>>,
    next_key: AtomicU64,
    closed: AtomicBool,
}

impl MemoryStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate this handle; all further operations report
    /// `InvalidOperation`
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    fn guard(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            Err(StoreError::InvalidOperation {
                reason: "session closed".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

/// Top-level field names may not start with `$` or contain `.`
fn check_field_names(doc: &Document) -> Result<(), StoreError> {
    for name in doc.keys() {
        if name.starts_with('$') || name.contains('.') {
            return Err(StoreError::MalformedDocument {
                reason: format!("illegal field name {name:?}"),
            });
        }
    }
    Ok(())
}

/// Equality on each field; a `{$in: [...]}` condition matches membership
fn matches_filter(doc: &Document, filter: &Filter) -> bool {
    filter.iter().all(|(field, cond)| {
        let actual = doc.get(field);
        match cond {
            Value::Object(ops) if ops.contains_key("$in") => match (ops.get("$in"), actual) {
                (Some(Value::Array(options)), Some(value)) => options.contains(value),
                _ => false,
            },
            expected => actual == Some(expected),
        }
    })
}

/// Restrict a document to the requested fields (the backend key survives)
fn project(doc: Document, fields: Option<&[String]>) -> Document {
    match fields {
        None => doc,
        Some(fields) => {
            let mut out = doc;
            out.retain(|name, _| name == STORAGE_ID_FIELD || fields.iter().any(|f| f == name));
            out
        }
    }
}

fn apply_update(doc: &mut Document, update: &Filter) -> StoreResult<()> {
    let has_operator = update.keys().any(|name| name.starts_with('$'));
    if has_operator {
        for (op, arg) in update {
            match (op.as_str(), arg) {
                ("$set", Value::Object(fields)) => {
                    for (name, value) in fields {
                        doc.insert(name.clone(), value.clone());
                    }
                }
                ("$set", _) => {
                    return Err(StoreError::InvalidOperation {
                        reason: "$set requires a document argument".to_string(),
                    });
                }
                (other, _) => {
                    return Err(StoreError::InvalidOperation {
                        reason: format!("unsupported update operator {other:?}"),
                    });
                }
            }
        }
    } else {
        // Whole-document replacement; the backend key survives.
        let backend_key = doc.get(STORAGE_ID_FIELD).cloned();
        let mut next = Document::from_map(update.clone());
        if let Some(key) = backend_key {
            next.insert(STORAGE_ID_FIELD.to_string(), key);
        }
        *doc = next;
    }
    Ok(())
}

impl DocumentStore for MemoryStore {
    fn insert(&self, db: &str, coll: &str, docs: Vec<Document>) -> StoreResult<InsertReport> {
        self.guard()?;
        let mut report = InsertReport::default();
        let mut collections = self.collections.write();
        let collection = collections
            .entry((db.to_string(), coll.to_string()))
            .or_default();
        for doc in docs {
            if let Err(fault) = check_field_names(&doc) {
                report.rejected.push(fault);
                continue;
            }
            if let Some(id) = doc.wmaid() {
                if collection.wmaid_index.contains_key(id) {
                    report.duplicates += 1;
                    continue;
                }
            }
            let key = self.next_key.fetch_add(1, Ordering::SeqCst) + 1;
            let mut stored = doc;
            stored.insert(
                STORAGE_ID_FIELD.to_string(),
                Value::String(format!("{key:024x}")),
            );
            if let Some(id) = stored.wmaid() {
                collection.wmaid_index.insert(id.to_string(), key);
            }
            collection.docs.insert(key, stored);
            report.inserted += 1;
        }
        Ok(report)
    }

    fn find(
        &self,
        db: &str,
        coll: &str,
        filter: Filter,
        fields: Option<Vec<String>>,
    ) -> StoreResult<DocumentStream> {
        self.guard()?;
        let collections = self.collections.read();
        // Matches are materialized under the read lock and then streamed.
        let matches: Vec<Document> = match collections.get(&(db.to_string(), coll.to_string())) {
            Some(collection) => collection
                .docs
                .values()
                .filter(|doc| matches_filter(doc, &filter))
                .cloned()
                .map(|doc| project(doc, fields.as_deref()))
                .collect(),
            None => Vec::new(),
        };
        Ok(Box::new(matches.into_iter().map(Ok)))
    }

    fn update(
        &self,
        db: &str,
        coll: &str,
        filter: Filter,
        update: Filter,
        multi: bool,
    ) -> StoreResult<UpdateReport> {
        self.guard()?;
        let mut collections = self.collections.write();
        let Some(collection) = collections.get_mut(&(db.to_string(), coll.to_string())) else {
            return Ok(UpdateReport::default());
        };
        let mut targets: Vec<u64> = collection
            .docs
            .iter()
            .filter(|(_, doc)| matches_filter(doc, &filter))
            .map(|(key, _)| *key)
            .collect();
        if !multi {
            targets.truncate(1);
        }
        let mut report = UpdateReport {
            matched: targets.len(),
            modified: 0,
        };
        for key in targets {
            let Some(doc) = collection.docs.get_mut(&key) else {
                continue;
            };
            let before = doc.clone();
            apply_update(doc, &update)?;
            let old_id = before.wmaid().map(str::to_string);
            let new_id = doc.wmaid().map(str::to_string);
            if *doc != before {
                report.modified += 1;
            }
            if old_id != new_id {
                if let Some(old) = old_id {
                    collection.wmaid_index.remove(&old);
                }
                if let Some(new) = new_id {
                    collection.wmaid_index.insert(new, key);
                }
            }
        }
        Ok(report)
    }

    fn remove(&self, db: &str, coll: &str, filter: Filter) -> StoreResult<RemoveReport> {
        self.guard()?;
        let mut collections = self.collections.write();
        let Some(collection) = collections.get_mut(&(db.to_string(), coll.to_string())) else {
            return Ok(RemoveReport::default());
        };
        let targets: Vec<u64> = collection
            .docs
            .iter()
            .filter(|(_, doc)| matches_filter(doc, &filter))
            .map(|(key, _)| *key)
            .collect();
        let mut report = RemoveReport::default();
        for key in targets {
            if let Some(doc) = collection.docs.remove(&key) {
                if let Some(id) = doc.wmaid() {
                    collection.wmaid_index.remove(id);
                }
                report.removed += 1;
            }
        }
        Ok(report)
    }

    fn command(&self, db: &str, name: &str, args: Filter) -> StoreResult<Document> {
        self.guard()?;
        let collections = self.collections.read();
        match name {
            "collStats" => {
                let coll = args.get("collStats").and_then(Value::as_str).ok_or_else(|| {
                    StoreError::InvalidOperation {
                        reason: "collStats requires a collection name".to_string(),
                    }
                })?;
                let (count, size) = match collections.get(&(db.to_string(), coll.to_string())) {
                    Some(collection) => (
                        collection.docs.len(),
                        collection.docs.values().map(Document::size_bytes).sum(),
                    ),
                    None => (0, 0usize),
                };
                let mut reply = Document::new();
                reply.insert("ns".to_string(), Value::String(format!("{db}.{coll}")));
                reply.insert("count".to_string(), Value::from(count));
                reply.insert("size".to_string(), Value::from(size));
                reply.insert("ok".to_string(), Value::from(1));
                Ok(reply)
            }
            "dbStats" => {
                let mut colls = 0usize;
                let mut objects = 0usize;
                for ((d, _), collection) in collections.iter() {
                    if d == db {
                        colls += 1;
                        objects += collection.docs.len();
                    }
                }
                let mut reply = Document::new();
                reply.insert("db".to_string(), Value::String(db.to_string()));
                reply.insert("collections".to_string(), Value::from(colls));
                reply.insert("objects".to_string(), Value::from(objects));
                reply.insert("ok".to_string(), Value::from(1));
                Ok(reply)
            }
            other => Err(StoreError::InvalidOperation {
                reason: format!("unknown command {other:?}"),
            }),
        }
    }

    fn drop_database(&self, db: &str) -> StoreResult<()> {
        self.guard()?;
        let mut collections = self.collections.write();
        collections.retain(|(d, _), _| d != db);
        Ok(())
    }
}
