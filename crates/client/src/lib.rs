//! Archive client orchestration
//!
//! This crate wires the core types into the public storage client:
//! - ArchiveClient: the write/read/update/remove contract
//! - ArchiveConfig: connection and chunking configuration
//! - DocumentCursor: lazy, single-pass read results
//! - MemoryStore: embedded reference backend
//!
//! The bulk write pipeline and its partial-failure accounting live here as
//! an internal module; callers only ever see its effects through
//! [`ArchiveClient::write`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod client;
pub mod config;
pub mod cursor;
pub mod memory;
mod pipeline;

pub use client::{ArchiveClient, WriteReceipt};
pub use config::ArchiveConfig;
pub use cursor::DocumentCursor;
pub use memory::MemoryStore;

// Re-export the core vocabulary so depending on this crate is enough
pub use wmarchive_core::*;
