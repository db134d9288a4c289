//! Lazy read cursor

use wmarchive_core::{from_storage_form, Document, DocumentStream, Error, Result};

/// A lazy, single-pass, forward-only sequence of matching documents
///
/// Each document is transformed out of storage form as it is yielded, so
/// backend-internal fields never reach the caller.
///
/// # Not Restartable
///
/// The cursor is consumed by value as it iterates; once exhausted (or
/// dropped) the underlying results are gone. Callers must not assume the
/// matching set can be traversed twice; issue a second
/// [`find`](crate::ArchiveClient::find) instead. The cursor is also not
/// meant to be shared across threads.
pub struct DocumentCursor {
    inner: DocumentStream,
}

impl DocumentCursor {
    pub(crate) fn new(inner: DocumentStream) -> Self {
        Self { inner }
    }
}

impl Iterator for DocumentCursor {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|item| {
            item.map(from_storage_form).map_err(|fault| Error::Read {
                reason: fault.to_string(),
            })
        })
    }
}
