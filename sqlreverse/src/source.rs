//! Metadata sources supplying table snapshots to the pipeline

use crate::settings::ConnectionSpec;
use crate::types::SchemaTable;
use crate::{Result, ReverseError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Supplier of table metadata for one connection
#[async_trait]
pub trait MetadataSource: Send + Sync {
    /// Fetch every table of the connection, in database order
    async fn fetch_tables(&self, spec: &ConnectionSpec) -> Result<Vec<SchemaTable>>;
}

/// Metadata snapshot document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub tables: Vec<SchemaTable>,
}

impl Snapshot {
    /// Decode a snapshot, JSON for `.json` paths and YAML otherwise
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .map_or(false, |e| e.eq_ignore_ascii_case("json"));
        if is_json {
            Ok(serde_json::from_str(content)?)
        } else {
            Ok(serde_yaml::from_str(content)?)
        }
    }
}

/// Reads a snapshot file named by the connection string
///
/// A `file://` prefix on the connection string is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotSource;

#[async_trait]
impl MetadataSource for SnapshotSource {
    async fn fetch_tables(&self, spec: &ConnectionSpec) -> Result<Vec<SchemaTable>> {
        let raw = spec.conn_str.strip_prefix("file://").unwrap_or(&spec.conn_str);
        let path = Path::new(raw);

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ReverseError::Metadata {
                source_name: spec.conn_str.clone(),
                message: e.to_string(),
            })?;
        let snapshot = Snapshot::parse(path, &content).map_err(|e| ReverseError::Metadata {
            source_name: spec.conn_str.clone(),
            message: e.to_string(),
        })?;

        log::debug!(
            "Loaded {} tables from snapshot {}",
            snapshot.tables.len(),
            path.display()
        );
        Ok(snapshot.tables)
    }
}

/// In-memory snapshots keyed by connection string
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    snapshots: HashMap<String, Vec<SchemaTable>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tables(mut self, conn_str: impl Into<String>, tables: Vec<SchemaTable>) -> Self {
        self.insert(conn_str, tables);
        self
    }

    pub fn insert(&mut self, conn_str: impl Into<String>, tables: Vec<SchemaTable>) {
        self.snapshots.insert(conn_str.into(), tables);
    }
}

#[async_trait]
impl MetadataSource for StaticSource {
    async fn fetch_tables(&self, spec: &ConnectionSpec) -> Result<Vec<SchemaTable>> {
        self.snapshots
            .get(&spec.conn_str)
            .cloned()
            .ok_or_else(|| ReverseError::Metadata {
                source_name: spec.conn_str.clone(),
                message: "no snapshot registered for this connection".to_string(),
            })
    }
}
