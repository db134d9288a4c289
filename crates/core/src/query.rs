//! Query specification and normalization
//!
//! Callers describe what to read or update in several shapes: nothing at
//! all, an arbitrary filter mapping, a single identifier, or a list of
//! identifiers. Before any of these reach a backend they are rewritten into
//! the one canonical form the store consumes: a filter mapping plus a target
//! collection.
//!
//! # Normalization Rules (priority order)
//!
//! | Spec | Canonical filter | Target |
//! |------|------------------|--------|
//! | empty/absent | `{}` | primary |
//! | list of ids | `{wmaid: {$in: [...]}}` | jobs |
//! | pattern-valid id string | `{wmaid: "..."}` | jobs |
//! | anything else | passed through | primary |
//!
//! The asymmetry (id and id-list queries implicitly target the jobs
//! collection while everything else targets the primary collection) is a
//! deliberate routing shortcut that callers depend on; both `read` and
//! `find` consume the same rule.

use serde_json::{Map, Value};

use crate::document::WMAID_FIELD;
use crate::routing::CollectionKind;
use crate::wmaid::{is_valid_wmaid, Wmaid, WmaidError};

/// A filter mapping in the form the store consumes
pub type Filter = Map<String, Value>;

/// A caller-supplied read/update specification
#[derive(Debug, Clone, PartialEq)]
pub enum QuerySpec {
    /// Match everything
    All,
    /// Arbitrary filter mapping, passed through unchanged
    Filter(Filter),
    /// Single identifier lookup
    Id(String),
    /// Identifier-list lookup
    Ids(Vec<String>),
}

impl Default for QuerySpec {
    fn default() -> Self {
        QuerySpec::All
    }
}

impl From<Filter> for QuerySpec {
    fn from(filter: Filter) -> Self {
        QuerySpec::Filter(filter)
    }
}

impl From<&str> for QuerySpec {
    fn from(id: &str) -> Self {
        QuerySpec::Id(id.to_string())
    }
}

impl From<String> for QuerySpec {
    fn from(id: String) -> Self {
        QuerySpec::Id(id)
    }
}

impl From<Wmaid> for QuerySpec {
    fn from(id: Wmaid) -> Self {
        QuerySpec::Id(id.into_string())
    }
}

impl From<Vec<String>> for QuerySpec {
    fn from(ids: Vec<String>) -> Self {
        QuerySpec::Ids(ids)
    }
}

impl From<Vec<Wmaid>> for QuerySpec {
    fn from(ids: Vec<Wmaid>) -> Self {
        QuerySpec::Ids(ids.into_iter().map(Wmaid::into_string).collect())
    }
}

/// Build the canonical identifier-list filter `{wmaid: {$in: [...]}}`
///
/// Used by the normalizer for id-list reads and by the client for
/// id-targeted updates.
pub fn ids_filter<I>(ids: I) -> Filter
where
    I: IntoIterator<Item = String>,
{
    let options = Value::Array(ids.into_iter().map(Value::String).collect());
    let mut by_id = Map::new();
    by_id.insert("$in".to_string(), options);
    let mut filter = Filter::new();
    filter.insert(WMAID_FIELD.to_string(), Value::Object(by_id));
    filter
}

/// The normalized query form consumed by the store
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalQuery {
    /// Canonical filter mapping
    pub filter: Filter,
    /// Collection the query runs against
    pub target: CollectionKind,
}

impl QuerySpec {
    /// Rewrite this specification into its canonical form
    ///
    /// An id-list spec normalizes even when the list is empty (a legal
    /// empty-result query). A single-id spec whose string does not match
    /// the identifier pattern is rejected rather than forwarded, since no
    /// backend filter can be built from it.
    pub fn normalize(self) -> Result<CanonicalQuery, WmaidError> {
        match self {
            QuerySpec::All => Ok(CanonicalQuery {
                filter: Filter::new(),
                target: CollectionKind::Primary,
            }),
            QuerySpec::Ids(ids) => Ok(CanonicalQuery {
                filter: ids_filter(ids),
                target: CollectionKind::Jobs,
            }),
            QuerySpec::Id(id) if is_valid_wmaid(&id) => {
                let mut filter = Filter::new();
                filter.insert(WMAID_FIELD.to_string(), Value::String(id));
                Ok(CanonicalQuery {
                    filter,
                    target: CollectionKind::Jobs,
                })
            }
            QuerySpec::Id(id) => Err(WmaidError::Malformed(id)),
            QuerySpec::Filter(filter) => Ok(CanonicalQuery {
                filter,
                target: CollectionKind::Primary,
            }),
        }
    }
}
