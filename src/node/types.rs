use serde_json::Value;
use std::collections::HashMap;

/// One result row as returned by a node, keyed by column name.
pub type Row = serde_json::Map<String, Value>;

/// Snapshot of a node's `SHOW STATUS` counters, taken when the connection is opened.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchdStatus(pub HashMap<String, String>);

impl SearchdStatus {
    /// Builds the snapshot from `Counter`/`Value` rows. Rows without both columns are ignored.
    pub fn from_rows(rows: &[Row]) -> Self {
        let counters = rows
            .iter()
            .filter_map(|row| {
                let counter = row.get("Counter").or_else(|| row.get("Variable_name"))?;
                let value = row.get("Value")?;
                Some((value_to_string(counter), value_to_string(value)))
            })
            .collect();

        Self(counters)
    }

    pub fn get(&self, counter: &str) -> Option<&str> {
        self.0.get(counter).map(String::as_str)
    }

    /// True only if the node reports an active cluster with exactly this name.
    pub fn cluster_name_matches(&self, expected: &str) -> bool {
        self.get("cluster_name") == Some(expected)
    }

    pub fn is_primary(&self, cluster_name: &str) -> bool {
        self.get(&format!("cluster_{}_status", cluster_name)) == Some("primary")
    }

    /// Tables the node reports as attached to `cluster_name`.
    pub fn cluster_tables(&self, cluster_name: &str) -> Vec<String> {
        self.get(&format!("cluster_{}_indexes", cluster_name))
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|table| !table.is_empty())
            .map(str::to_string)
            .collect()
    }
}

pub(crate) fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Outcome of probing a single peer. Built fresh on every pass, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerProbeResult {
    pub address: String,
    pub reachable: bool,
    pub cluster_name_matches: bool,
    /// Only known when the peer is reachable and in the expected cluster.
    pub is_primary: Option<bool>,
}

impl PeerProbeResult {
    pub fn unreachable(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            reachable: false,
            cluster_name_matches: false,
            is_primary: None,
        }
    }

    pub fn in_cluster(&self) -> bool {
        self.reachable && self.cluster_name_matches
    }
}
