//! Store abstraction for document backends
//!
//! This module defines the [`DocumentStore`] trait that the client
//! orchestration layer is written against, so a backend (a network driver,
//! an embedded store) can be swapped without touching the layers above it.
//!
//! Thread safety: all methods must be safe to call concurrently from
//! multiple threads (requires Send + Sync). The client holds no locks
//! around store calls; consistency under concurrent writers is the
//! backend's concern.

use serde::Serialize;

use crate::document::Document;
use crate::error::{StoreError, StoreResult};
use crate::query::Filter;

/// Lazy, forward-only stream of documents from a backend
///
/// Single-pass by construction: the iterator is consumed by value and
/// cannot be rewound.
pub type DocumentStream = Box<dyn Iterator<Item = StoreResult<Document>> + Send>;

/// Outcome of one bulk-insert call
///
/// The report gives the write pipeline per-chunk accounting without
/// unwinding: documents the backend accepted, documents it recognized as
/// already present, and per-document rejections inside an otherwise
/// accepted chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InsertReport {
    /// Documents newly inserted by this call
    pub inserted: usize,
    /// Documents already present under their identifier (not a failure)
    pub duplicates: usize,
    /// Per-document rejections; the rest of the chunk was still processed
    pub rejected: Vec<StoreError>,
}

/// Outcome of an update call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UpdateReport {
    /// Documents matched by the filter
    pub matched: usize,
    /// Documents actually changed
    pub modified: usize,
}

/// Outcome of a remove call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemoveReport {
    /// Documents removed
    pub removed: usize,
}

/// An opened connection to a document database
///
/// Operations address collections by database and collection name; the
/// handle itself owns connection state. Any timeout or cancellation
/// behavior belongs to the handle's own configuration; no operation at
/// the client layer blocks by design.
pub trait DocumentStore: Send + Sync {
    /// Bulk-insert a batch of documents into a collection
    ///
    /// Per-document rejections are reported in [`InsertReport::rejected`];
    /// a returned [`StoreError`] means the call as a whole failed.
    fn insert(&self, db: &str, coll: &str, docs: Vec<Document>) -> StoreResult<InsertReport>;

    /// Query a collection, optionally projecting to the given fields
    fn find(
        &self,
        db: &str,
        coll: &str,
        filter: Filter,
        fields: Option<Vec<String>>,
    ) -> StoreResult<DocumentStream>;

    /// Apply an update to matching documents
    ///
    /// With `multi` set, every matching document is updated; otherwise at
    /// most one.
    fn update(
        &self,
        db: &str,
        coll: &str,
        filter: Filter,
        update: Filter,
        multi: bool,
    ) -> StoreResult<UpdateReport>;

    /// Remove matching documents (an empty filter matches everything)
    fn remove(&self, db: &str, coll: &str, filter: Filter) -> StoreResult<RemoveReport>;

    /// Run a backend command, returning its reply unmodified
    fn command(&self, db: &str, name: &str, args: Filter) -> StoreResult<Document>;

    /// Drop an entire database. Destructive; no safeguards at this layer.
    fn drop_database(&self, db: &str) -> StoreResult<()>;
}
