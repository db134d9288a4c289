//! Document model for archived job-result records
//!
//! This module defines the types documents pass through on their way into
//! and out of the store:
//! - Document: Newtype wrapper around `serde_json::Map<String, Value>`
//! - `to_storage_form` / `from_storage_form`: the ingress/egress transforms
//!
//! # Reserved Fields
//!
//! | Field | Constant | Owner |
//! |-------|----------|-------|
//! | `wmaid` | [`WMAID_FIELD`] | this layer (caller-visible identifier) |
//! | `dtype` | [`DTYPE_FIELD`] | caller (document kind marker) |
//! | `_id` | [`STORAGE_ID_FIELD`] | backend (never caller-visible) |

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::str::FromStr;

/// Field carrying the caller-visible document identifier
pub const WMAID_FIELD: &str = "wmaid";

/// Field marking the document kind (e.g. `"job"`)
pub const DTYPE_FIELD: &str = "dtype";

/// Field assigned by the backend; stripped before documents reach callers
pub const STORAGE_ID_FIELD: &str = "_id";

/// `dtype` value that routes a batch to the jobs collection
pub const JOB_DTYPE: &str = "job";

/// An archived record or job result
///
/// Newtype around `serde_json::Map<String, Value>` providing:
/// - Direct access to the underlying map via Deref/DerefMut
/// - Typed accessors for the reserved fields
/// - Serialization/deserialization support
///
/// Keys are unique; no schema is enforced at this layer.
///
/// # Examples
///
/// ```
/// use wmarchive_core::Document;
///
/// let mut doc = Document::new();
/// doc.insert("task".to_string(), serde_json::json!("processing"));
///
/// assert_eq!(doc.len(), 1);
/// assert!(doc.wmaid().is_none());
///
/// let parsed: Document = r#"{"dtype": "job", "exit_code": 0}"#.parse().unwrap();
/// assert_eq!(parsed.dtype(), Some("job"));
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Document(Map::new())
    }

    /// Create from an existing field map
    pub fn from_map(map: Map<String, Value>) -> Self {
        Document(map)
    }

    /// Get the underlying field map
    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }

    /// Get a reference to the underlying field map
    pub fn as_inner(&self) -> &Map<String, Value> {
        &self.0
    }

    /// The document's identifier, if one has been assigned
    pub fn wmaid(&self) -> Option<&str> {
        self.0.get(WMAID_FIELD).and_then(Value::as_str)
    }

    /// The document's kind marker, if present
    pub fn dtype(&self) -> Option<&str> {
        self.0.get(DTYPE_FIELD).and_then(Value::as_str)
    }

    /// Serialize to a compact JSON string
    pub fn to_json_string(&self) -> String {
        serde_json::to_string(&self.0).unwrap_or_default()
    }

    /// Approximate size in bytes (JSON string representation)
    pub fn size_bytes(&self) -> usize {
        self.to_json_string().len()
    }
}

impl FromStr for Document {
    type Err = serde_json::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        serde_json::from_str(s).map(Document)
    }
}

// Deref to access Map methods directly
impl Deref for Document {
    type Target = Map<String, Value>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Document {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json_string())
    }
}

impl From<Map<String, Value>> for Document {
    fn from(map: Map<String, Value>) -> Self {
        Document(map)
    }
}

impl From<Document> for Map<String, Value> {
    fn from(doc: Document) -> Self {
        doc.0
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Object(doc.0)
    }
}

// =============================================================================
// Ingress/Egress Transforms
// =============================================================================

/// Normalize a document on its way into storage
///
/// Strips a stale [`STORAGE_ID_FIELD`] so that re-archiving a document that
/// was previously read back never smuggles a backend key into a new record.
/// Taking the document by value means the stored copy cannot alias
/// caller-owned state.
pub fn to_storage_form(mut doc: Document) -> Document {
    doc.remove(STORAGE_ID_FIELD);
    doc
}

/// Normalize a document on its way out of storage
///
/// Strips the backend-assigned [`STORAGE_ID_FIELD`] so callers only ever see
/// the identifier this layer assigned ([`WMAID_FIELD`]).
pub fn from_storage_form(mut doc: Document) -> Document {
    doc.remove(STORAGE_ID_FIELD);
    doc
}
