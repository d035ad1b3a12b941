use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

/// A peer pod as seen by the orchestration platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pod {
    /// Pod name; equals the hostname the pod's own process sees.
    pub name: String,
    /// Resolvable hostname used for probing and in member addresses.
    pub hostname: String,
    pub ip: String,
}

impl Pod {
    pub fn new(name: impl Into<String>, hostname: impl Into<String>, ip: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hostname: hostname.into(),
            ip: ip.into(),
        }
    }
}

/// Label filter rendered as comma-joined `key=value` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSelector(BTreeMap<String, String>);

impl LabelSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Parses `k=v,k2=v2`. Pairs without `=` or with an empty key are ignored.
    pub fn parse(raw: &str) -> Self {
        let labels = raw
            .split(',')
            .filter_map(|pair| {
                let (key, value) = pair.split_once('=')?;
                let key = key.trim();
                (!key.is_empty()).then(|| (key.to_string(), value.trim().to_string()))
            })
            .collect();

        Self(labels)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for LabelSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs: Vec<String> = self.0.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        f.write_str(&pairs.join(","))
    }
}

// --- Orchestration API payloads (only the fields we read) ---

#[derive(Debug, Deserialize)]
pub struct PodList {
    #[serde(default)]
    pub items: Vec<PodItem>,
}

#[derive(Debug, Deserialize)]
pub struct PodItem {
    pub metadata: PodMetadata,
    #[serde(default)]
    pub spec: PodSpec,
    #[serde(default)]
    pub status: PodStatus,
}

#[derive(Debug, Deserialize)]
pub struct PodMetadata {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PodSpec {
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub subdomain: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PodStatus {
    #[serde(default, rename = "podIP")]
    pub pod_ip: Option<String>,
    #[serde(default)]
    pub phase: Option<String>,
}
