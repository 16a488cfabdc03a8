//! The Solr index schema, as far as field validation needs it.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::Result;

/// Source of the field names the index currently carries
#[async_trait]
pub trait SolrIndex: Send + Sync {
    async fn indexed_field_names(&self) -> Result<BTreeSet<String>>;
}

/// A fixed list of field names
#[derive(Debug, Clone, Default)]
pub struct StaticIndex {
    fields: BTreeSet<String>,
}

impl StaticIndex {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl SolrIndex for StaticIndex {
    async fn indexed_field_names(&self) -> Result<BTreeSet<String>> {
        Ok(self.fields.clone())
    }
}

/// The part of a Luke request handler response we read.
#[derive(Debug, Deserialize)]
struct LukeResponse {
    #[serde(default)]
    fields: BTreeMap<String, serde_json::Value>,
}

/// Field names taken from a saved Luke (`/admin/luke`) JSON response.
///
/// The file is read on every lookup so a refreshed snapshot is picked up
/// without restarting.
#[derive(Debug, Clone)]
pub struct LukeSnapshot {
    path: PathBuf,
}

impl LukeSnapshot {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Parse the field names out of a Luke JSON document
    pub fn parse(json: &str) -> Result<BTreeSet<String>> {
        let response: LukeResponse = serde_json::from_str(json)?;
        Ok(response.fields.into_keys().collect())
    }
}

#[async_trait]
impl SolrIndex for LukeSnapshot {
    async fn indexed_field_names(&self) -> Result<BTreeSet<String>> {
        let json = tokio::fs::read_to_string(&self.path).await?;
        let fields = Self::parse(&json)?;
        debug!(path = %self.path.display(), fields = fields.len(), "read luke snapshot");
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const LUKE: &str = r#"{
        "responseHeader": {"status": 0, "QTime": 3},
        "index": {"numDocs": 12},
        "fields": {
            "PID": {"type": "string", "schema": "I-S-----OF-----l"},
            "dc.title": {"type": "text_general"},
            "mods_abstract_ms": {"type": "string"}
        }
    }"#;

    #[test]
    fn parse_luke_fields() {
        let fields = LukeSnapshot::parse(LUKE).unwrap();
        let names: Vec<_> = fields.iter().map(String::as_str).collect();
        assert_eq!(names, vec!["PID", "dc.title", "mods_abstract_ms"]);
    }

    #[test]
    fn parse_without_fields_is_empty() {
        assert!(LukeSnapshot::parse("{}").unwrap().is_empty());
        assert!(LukeSnapshot::parse("not json").is_err());
    }

    #[tokio::test]
    async fn snapshot_reads_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("luke.json");
        tokio::fs::write(&path, LUKE).await.unwrap();

        let index = LukeSnapshot::new(&path);
        let fields = index.indexed_field_names().await.unwrap();
        assert!(fields.contains("dc.title"));
    }

    #[tokio::test]
    async fn static_index_lists_fields() {
        let index = StaticIndex::new(["a", "b"]);
        assert_eq!(index.indexed_field_names().await.unwrap().len(), 2);
    }
}
