//! Bulk write pipeline
//!
//! Slices an id-assigned batch into bounded chunks, submits each chunk as
//! one bulk-insert call, and accounts for every submitted document.
//! Chunking bounds the message size per store call and limits the blast
//! radius of a single bad document to one chunk.
//!
//! Per-chunk outcomes branch on the store's error kind:
//! - malformed documents and invalid operations are logged and recovered;
//! - duplicate keys are absorbed as already-archived;
//! - anything unclassified aborts the call.
//!
//! After the loop, `inserted + duplicates` must equal the submitted count;
//! a shortfall is the end-to-end partial-failure detector.

use tracing::{debug, warn};

use wmarchive_core::{Document, DocumentStore, Error, Result, StoreError};

/// Accounting for one completed pipeline run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct WriteStats {
    pub inserted: usize,
    pub duplicates: usize,
}

/// Submit a batch in chunks of up to `chunk_size`, in input order
///
/// The source is consumed exactly once; the loop ends when it yields an
/// empty chunk. No retries are performed at this layer.
pub(crate) fn write_in_chunks(
    store: &dyn DocumentStore,
    db: &str,
    coll: &str,
    docs: Vec<Document>,
    chunk_size: usize,
) -> Result<WriteStats> {
    let submitted = docs.len();
    let chunk_size = chunk_size.max(1);
    let mut inserted = 0usize;
    let mut duplicates = 0usize;
    let mut source = docs.into_iter();
    loop {
        let chunk: Vec<Document> = source.by_ref().take(chunk_size).collect();
        if chunk.is_empty() {
            break;
        }
        let size = chunk.len();
        match store.insert(db, coll, chunk) {
            Ok(report) => {
                inserted += report.inserted;
                duplicates += report.duplicates;
                for fault in &report.rejected {
                    warn!(reason = %fault, "document rejected during bulk insert");
                }
            }
            Err(StoreError::MalformedDocument { reason }) => {
                warn!(%reason, "chunk rejected as malformed");
            }
            Err(StoreError::InvalidOperation { reason }) => {
                warn!(%reason, "insert refused by store");
            }
            Err(StoreError::DuplicateKey { .. }) => {
                // Already archived under the same identifiers; tolerated.
                duplicates += size;
            }
            Err(fault) => return Err(Error::Store(fault)),
        }
        debug!(chunk = size, inserted, duplicates, "chunk submitted");
    }
    let persisted = inserted + duplicates;
    if persisted != submitted {
        return Err(Error::CountMismatch {
            submitted,
            persisted,
        });
    }
    Ok(WriteStats {
        inserted,
        duplicates,
    })
}
