//! Error types for the archive client
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait
//! implementations.
//!
//! Two layers of errors exist:
//! - [`StoreError`]: faults reported by a backend for a single store call.
//!   The bulk write pipeline branches on these kinds rather than unwinding.
//! - [`Error`]: the client contract surfaced to callers.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::wmaid::WmaidError;

/// Result type alias for archive operations
pub type Result<T> = std::result::Result<T, Error>;

/// Result type alias for backend store calls
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Faults reported by a document-store backend
///
/// The bulk write pipeline classifies each chunk outcome by these kinds:
/// malformed documents and invalid operations are recovered (logged, chunk
/// processing continues), duplicate keys are fully absorbed, and anything
/// unclassified aborts the call.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreError {
    /// Backend rejected a document (recovered per chunk)
    #[error("malformed document: {reason}")]
    MalformedDocument {
        /// Backend-reported rejection reason
        reason: String,
    },

    /// Operation issued against a closed or invalid session (recovered per chunk)
    #[error("invalid operation: {reason}")]
    InvalidOperation {
        /// Backend-reported failure reason
        reason: String,
    },

    /// Document already present under this identifier (fully absorbed)
    #[error("duplicate key: {wmaid}")]
    DuplicateKey {
        /// Identifier of the already-archived document
        wmaid: String,
    },

    /// Any other backend fault (fatal per call)
    #[error("backend error: {reason}")]
    Backend {
        /// Backend-reported failure reason
        reason: String,
    },
}

/// Error types surfaced by the archive client
#[derive(Debug, Error)]
pub enum Error {
    /// A document carried a missing or malformed identifier
    #[error("invalid wmaid: {0}")]
    InvalidIdentifier(#[from] WmaidError),

    /// Persisted count differs from submitted count after a completed write
    #[error("persisted {persisted} of {submitted} submitted documents")]
    CountMismatch {
        /// Number of documents submitted to the write pipeline
        submitted: usize,
        /// Number accounted for (inserted plus tolerated duplicates)
        persisted: usize,
    },

    /// Fault encountered while materializing read results
    #[error("read failed: {reason}")]
    Read {
        /// Underlying failure description
        reason: String,
    },

    /// Unrecovered backend fault
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}
