//! Collection routing
//!
//! Documents land in one of exactly two logical collections. Routing is a
//! coarse, batch-level decision: the first document's kind marker decides
//! for the whole batch, so callers must not mix kinds within one write call.

use crate::document::{Document, JOB_DTYPE};

/// Logical destination for a batch or query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollectionKind {
    /// Default destination for general archived records
    Primary,
    /// Destination for documents marked as job results; also the implicit
    /// target of id-based and id-list queries
    Jobs,
}

/// Route a batch to its destination collection
///
/// The batch goes to [`CollectionKind::Jobs`] when its first document
/// carries `dtype == "job"`, and to [`CollectionKind::Primary`] otherwise
/// (including for an empty batch).
pub fn route_batch(docs: &[Document]) -> CollectionKind {
    match docs.first().and_then(|doc| doc.dtype()) {
        Some(JOB_DTYPE) => CollectionKind::Jobs,
        _ => CollectionKind::Primary,
    }
}
