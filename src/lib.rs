//! WMArchive - storage client for archiving job-result documents
//!
//! The client archives schemaless job-result documents into a document
//! database: chunked bulk writes with partial-failure accounting,
//! content-derived identifiers (`wmaid`), batch routing between a primary
//! and a jobs collection, and normalization of heterogeneous read
//! specifications into canonical store queries.
//!
//! # Quick Start
//!
//! ```
//! use wmarchive::{ArchiveClient, Document};
//!
//! let client = ArchiveClient::in_memory();
//!
//! let doc: Document = r#"{"task": "merge", "exit_code": 0}"#.parse().unwrap();
//! let receipt = client.write([doc]).unwrap();
//! assert_eq!(receipt.wmaids.len(), 1);
//! ```
//!
//! # Architecture
//!
//! All operations go through [`ArchiveClient`], which talks to any backend
//! implementing the [`DocumentStore`] trait. The embedded [`MemoryStore`]
//! ships as the reference backend; network drivers plug in behind the same
//! trait.

// Re-export the public API from wmarchive-client
pub use wmarchive_client::*;
