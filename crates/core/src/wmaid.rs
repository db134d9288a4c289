//! Document identifiers (wmaid)
//!
//! Every document entering the write path carries a `wmaid`: 32 lowercase
//! hex characters, derived from the xxh3-128 digest of the document's
//! canonical JSON bytes. Derivation is deterministic, so archiving identical
//! content twice reproduces the same identifier and the second write surfaces
//! as a benign duplicate rather than a second copy.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use xxhash_rust::xxh3::xxh3_128;

use crate::document::{Document, WMAID_FIELD};

/// Identifier length in characters
pub const WMAID_LEN: usize = 32;

/// Error type for identifier validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WmaidError {
    /// The string is not a well-formed identifier
    #[error("identifier {0:?} is not 32 lowercase hex characters")]
    Malformed(String),

    /// The identifier field holds a non-string value
    #[error("identifier field is not a string")]
    NotText,
}

/// A validated document identifier
///
/// Construction via [`Wmaid::new`] enforces the pattern; a `Wmaid` in hand
/// is always well-formed.
///
/// # Examples
///
/// ```
/// use wmarchive_core::Wmaid;
///
/// let id = Wmaid::new("00112233445566778899aabbccddeeff").unwrap();
/// assert_eq!(id.as_str().len(), 32);
///
/// assert!(Wmaid::new("not-an-id").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Wmaid(String);

impl Wmaid {
    /// Validate and wrap an identifier string
    pub fn new(s: impl Into<String>) -> Result<Self, WmaidError> {
        let s = s.into();
        if is_valid_wmaid(&s) {
            Ok(Wmaid(s))
        } else {
            Err(WmaidError::Malformed(s))
        }
    }

    /// Derive the identifier for a document from its content
    ///
    /// Hashes the canonical JSON bytes of the document. Map keys serialize
    /// in sorted order, so equal content yields equal bytes regardless of
    /// insertion order.
    pub fn derive(doc: &Document) -> Self {
        let bytes = serde_json::to_vec(doc).unwrap_or_default();
        Wmaid(format!("{:032x}", xxh3_128(&bytes)))
    }

    /// The identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume into the underlying string
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Wmaid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Wmaid {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Wmaid {
    type Error = WmaidError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Wmaid::new(s)
    }
}

impl From<Wmaid> for String {
    fn from(id: Wmaid) -> Self {
        id.0
    }
}

/// Check whether a string has the identifier shape
///
/// The query normalizer uses this to distinguish a single-id lookup from an
/// arbitrary filter.
pub fn is_valid_wmaid(s: &str) -> bool {
    s.len() == WMAID_LEN && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Assign or validate identifiers for a batch of documents
///
/// Documents already carrying a pattern-valid `wmaid` pass through unchanged;
/// documents lacking one receive a freshly derived identifier written into
/// the document. A present-but-invalid identifier fails the whole batch.
///
/// The returned list is in input order, one identifier per document.
pub fn assign_ids(docs: &mut [Document]) -> Result<Vec<Wmaid>, WmaidError> {
    let mut ids = Vec::with_capacity(docs.len());
    for doc in docs.iter_mut() {
        let id = match doc.get(WMAID_FIELD) {
            Some(value) => {
                let text = value.as_str().ok_or(WmaidError::NotText)?;
                Wmaid::new(text)?
            }
            None => {
                let id = Wmaid::derive(doc);
                doc.insert(
                    WMAID_FIELD.to_string(),
                    serde_json::Value::String(id.as_str().to_string()),
                );
                id
            }
        };
        ids.push(id);
    }
    Ok(ids)
}
