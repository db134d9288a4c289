//! Client configuration

use serde::Deserialize;
use std::time::Duration;

use wmarchive_core::CollectionKind;

/// Configuration for an [`ArchiveClient`](crate::ArchiveClient)
///
/// All fields have defaults, so a partial configuration file deserializes
/// cleanly.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ArchiveConfig {
    /// Connection target for the backend handle
    #[serde(default)]
    pub uri: String,

    /// Database name
    #[serde(default = "default_dbname")]
    pub dbname: String,

    /// Primary collection name
    #[serde(default = "default_collname")]
    pub collname: String,

    /// Jobs collection name
    #[serde(default = "default_jobs_collname")]
    pub jobs_collname: String,

    /// Documents per bulk-insert call
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Per-operation timeout handed to the backend handle at connect time.
    /// The client itself never applies a timeout.
    #[serde(default)]
    pub op_timeout: Option<Duration>,
}

fn default_dbname() -> String {
    "fwjr".to_string()
}

fn default_collname() -> String {
    "db".to_string()
}

fn default_jobs_collname() -> String {
    "jobs".to_string()
}

fn default_chunk_size() -> usize {
    1000
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            uri: String::new(),
            dbname: default_dbname(),
            collname: default_collname(),
            jobs_collname: default_jobs_collname(),
            chunk_size: default_chunk_size(),
            op_timeout: None,
        }
    }
}

impl ArchiveConfig {
    /// Resolve a routing decision to a collection name
    pub fn collection_name(&self, kind: CollectionKind) -> &str {
        match kind {
            CollectionKind::Primary => &self.collname,
            CollectionKind::Jobs => &self.jobs_collname,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ArchiveConfig::default();
        assert_eq!(config.dbname, "fwjr");
        assert_eq!(config.collname, "db");
        assert_eq!(config.jobs_collname, "jobs");
        assert_eq!(config.chunk_size, 1000);
        assert!(config.op_timeout.is_none());
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: ArchiveConfig =
            serde_json::from_str(r#"{"uri": "db://archive", "chunk_size": 100}"#).unwrap();
        assert_eq!(config.uri, "db://archive");
        assert_eq!(config.chunk_size, 100);
        assert_eq!(config.dbname, "fwjr");
    }

    #[test]
    fn test_collection_name_resolution() {
        let config = ArchiveConfig::default();
        assert_eq!(config.collection_name(CollectionKind::Primary), "db");
        assert_eq!(config.collection_name(CollectionKind::Jobs), "jobs");
    }
}
