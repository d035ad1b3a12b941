use crate::tables::TableKind;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// The persisted membership file.
///
/// Keys this crate does not manage are kept in `extra` and written back untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MembershipRecord {
    #[serde(default)]
    pub clusters: BTreeMap<String, ClusterEntry>,

    #[serde(default)]
    pub indexes: BTreeMap<String, TableDefinition>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MembershipRecord {
    pub fn members(&self, cluster_name: &str) -> &[String] {
        self.clusters
            .get(cluster_name)
            .map(|entry| entry.nodes.as_slice())
            .unwrap_or_default()
    }
}

/// One cluster as recorded on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterEntry {
    /// Member addresses (`host:port`), stored as a single comma-separated string.
    #[serde(default, with = "comma_list")]
    pub nodes: Vec<String>,

    #[serde(default)]
    pub options: String,

    #[serde(default)]
    pub indexes: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Where and how a table is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDefinition {
    #[serde(rename = "type")]
    pub kind: TableKind,
    pub path: String,
}

mod comma_list {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(nodes: &[String], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&nodes.join(","))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(raw
            .split(',')
            .map(str::trim)
            .filter(|node| !node.is_empty())
            .map(str::to_string)
            .collect())
    }
}
