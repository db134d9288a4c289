//! High-level archive client
//!
//! [`ArchiveClient`] is the public contract of this layer. It owns a shared
//! store handle and a configuration, and wires the identifier assigner,
//! collection router, bulk write pipeline and query normalizer together.
//! No ambient singleton exists; callers construct the client explicitly and
//! pass it by reference.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use wmarchive_core::{
    assign_ids, ids_filter, route_batch, to_storage_form, CollectionKind, Document, DocumentStore,
    Error, Filter, QuerySpec, RemoveReport, Result, UpdateReport, Wmaid, WMAID_FIELD,
};

use crate::config::ArchiveConfig;
use crate::cursor::DocumentCursor;
use crate::memory::MemoryStore;
use crate::pipeline;

/// Outcome of a successful write call
///
/// Identifiers are in input order, one per submitted document, regardless
/// of how many documents were newly inserted versus already archived.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteReceipt {
    /// Identifier of each submitted document, in input order
    pub wmaids: Vec<Wmaid>,
    /// Documents the backend recognized as already archived
    pub duplicates: usize,
}

/// Client for archiving and querying job-result documents
///
/// All operations go through the shared [`DocumentStore`] handle; this
/// layer holds no locks around it and applies no timeouts of its own
/// (see [`ArchiveConfig::op_timeout`]).
pub struct ArchiveClient {
    store: Arc<dyn DocumentStore>,
    config: ArchiveConfig,
}

impl ArchiveClient {
    /// Create a client over an opened store handle
    pub fn new(store: Arc<dyn DocumentStore>, config: ArchiveConfig) -> Self {
        Self { store, config }
    }

    /// Create a client backed by an embedded [`MemoryStore`]
    pub fn in_memory() -> Self {
        Self::in_memory_with(ArchiveConfig::default())
    }

    /// Create an embedded client with the given configuration
    pub fn in_memory_with(config: ArchiveConfig) -> Self {
        Self::new(Arc::new(MemoryStore::new()), config)
    }

    /// The active configuration
    pub fn config(&self) -> &ArchiveConfig {
        &self.config
    }

    // =========================================================================
    // Write Path
    // =========================================================================

    /// Archive a batch of documents
    ///
    /// A single document is written as a one-element batch. Every document
    /// gets a validated `wmaid` before submission; a present-but-invalid
    /// identifier fails the whole call. The batch routes to the jobs
    /// collection when its first document carries `dtype == "job"`;
    /// callers must not mix kinds within one call.
    ///
    /// Returns [`Error::CountMismatch`] when the persisted count (newly
    /// inserted plus tolerated duplicates) differs from the submitted
    /// count.
    pub fn write<I>(&self, docs: I) -> Result<WriteReceipt>
    where
        I: IntoIterator<Item = Document>,
    {
        let mut docs: Vec<Document> = docs.into_iter().collect();
        if docs.is_empty() {
            return Ok(WriteReceipt::default());
        }
        let wmaids = assign_ids(&mut docs)?;
        let target = route_batch(&docs);
        let coll = self.config.collection_name(target);
        let docs: Vec<Document> = docs.into_iter().map(to_storage_form).collect();
        debug!(count = docs.len(), collection = coll, "archiving batch");
        let stats = pipeline::write_in_chunks(
            self.store.as_ref(),
            &self.config.dbname,
            coll,
            docs,
            self.config.chunk_size,
        )?;
        Ok(WriteReceipt {
            wmaids,
            duplicates: stats.duplicates,
        })
    }

    // =========================================================================
    // Read Path
    // =========================================================================

    /// Read all matching documents into memory
    ///
    /// The specification is normalized exactly as for [`find`](Self::find);
    /// results are realized and transformed before returning. Any
    /// underlying fault surfaces as [`Error::Read`].
    pub fn read(
        &self,
        spec: impl Into<QuerySpec>,
        fields: Option<Vec<String>>,
    ) -> Result<Vec<Document>> {
        self.find(spec, fields)?.collect()
    }

    /// Query matching documents lazily
    ///
    /// Id and id-list specifications target the jobs collection; everything
    /// else targets the primary collection. The returned cursor is
    /// single-pass and not restartable (see [`DocumentCursor`]).
    pub fn find(
        &self,
        spec: impl Into<QuerySpec>,
        fields: Option<Vec<String>>,
    ) -> Result<DocumentCursor> {
        let query = spec.into().normalize()?;
        let coll = self.config.collection_name(query.target);
        let stream = self
            .store
            .find(&self.config.dbname, coll, query.filter, fields)
            .map_err(|fault| Error::Read {
                reason: fault.to_string(),
            })?;
        Ok(DocumentCursor::new(stream))
    }

    // =========================================================================
    // Update / Remove
    // =========================================================================

    /// Apply an update to every document matching the given identifiers
    ///
    /// Targets the primary collection in a single multi-document call
    /// (not chunked).
    pub fn update(&self, ids: &[Wmaid], update: Filter) -> Result<UpdateReport> {
        let filter = ids_filter(ids.iter().map(|id| id.as_str().to_string()));
        self.store
            .update(&self.config.dbname, &self.config.collname, filter, update, true)
            .map_err(Error::Store)
    }

    /// Remove all documents in the primary collection matching `spec`
    ///
    /// An absent spec removes everything; avoiding accidental full wipes
    /// is the caller's responsibility.
    pub fn remove(&self, spec: Option<Filter>) -> Result<RemoveReport> {
        self.store
            .remove(
                &self.config.dbname,
                &self.config.collname,
                spec.unwrap_or_default(),
            )
            .map_err(Error::Store)
    }

    // =========================================================================
    // Administrative
    // =========================================================================

    /// Backend statistics for the primary collection, passed through
    /// unmodified
    pub fn stats(&self) -> Result<Document> {
        let mut args = Filter::new();
        args.insert(
            "collStats".to_string(),
            Value::String(self.config.collname.clone()),
        );
        self.store
            .command(&self.config.dbname, "collStats", args)
            .map_err(Error::Store)
    }

    /// Identifier-only mappings for every job document carrying a `wmaid`
    ///
    /// Documents lacking the field are silently skipped.
    pub fn jobs_ids(&self) -> Result<Vec<Document>> {
        let stream = self
            .store
            .find(
                &self.config.dbname,
                self.config.collection_name(CollectionKind::Jobs),
                Filter::new(),
                Some(vec![WMAID_FIELD.to_string()]),
            )
            .map_err(|fault| Error::Read {
                reason: fault.to_string(),
            })?;
        let mut out = Vec::new();
        for item in stream {
            let doc = item.map_err(|fault| Error::Read {
                reason: fault.to_string(),
            })?;
            if let Some(id) = doc.wmaid() {
                let mut entry = Document::new();
                entry.insert(WMAID_FIELD.to_string(), Value::String(id.to_string()));
                out.push(entry);
            }
        }
        Ok(out)
    }

    /// Drop an entire database. Destructive; delegated to the backend with
    /// no additional safeguards.
    pub fn drop_database(&self, name: &str) -> Result<()> {
        self.store.drop_database(name).map_err(Error::Store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_write_touches_nothing() {
        let client = ArchiveClient::in_memory();
        let receipt = client.write(Vec::new()).unwrap();
        assert!(receipt.wmaids.is_empty());
        assert_eq!(receipt.duplicates, 0);
    }

    #[test]
    fn test_config_accessor() {
        let client = ArchiveClient::in_memory();
        assert_eq!(client.config().dbname, "fwjr");
    }
}
