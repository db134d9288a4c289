//! Core types and traits for the job-result document archive
//!
//! This crate defines the foundational types used throughout the system:
//! - Document: schemaless field mapping for one archived record
//! - Wmaid: validated, content-derived document identifier
//! - QuerySpec / CanonicalQuery: caller specs and their normalized form
//! - CollectionKind: routing between the primary and jobs collections
//! - DocumentStore: backend trait consumed by the client layer
//! - Error / StoreError: error type hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod document;
pub mod error;
pub mod query;
pub mod routing;
pub mod store;
pub mod wmaid;

// Re-export commonly used types and traits
pub use document::{
    from_storage_form, to_storage_form, Document, DTYPE_FIELD, JOB_DTYPE, STORAGE_ID_FIELD,
    WMAID_FIELD,
};
pub use error::{Error, Result, StoreError, StoreResult};
pub use query::{ids_filter, CanonicalQuery, Filter, QuerySpec};
pub use routing::{route_batch, CollectionKind};
pub use store::{DocumentStore, DocumentStream, InsertReport, RemoveReport, UpdateReport};
pub use wmaid::{assign_ids, is_valid_wmaid, Wmaid, WmaidError, WMAID_LEN};
