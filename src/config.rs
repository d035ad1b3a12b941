//! Process configuration.
//!
//! All settings come from environment variables so the same image can run in every
//! pod of the deployment. Unset variables fall back to defaults; malformed values are
//! fatal `ConfigError`s.

use crate::cluster::ReconcilerSettings;
use crate::discovery::LabelSelector;
use crate::discovery::kubernetes::DEFAULT_API_URL;
use crate::error::ConfigError;
use crate::membership::store::DEFAULT_STATE_PATH;

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_RT_INCLUDE_PATH: &str = "/etc/manticoresearch/conf_mount/rt_include.conf";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub cluster_name: String,
    pub hostname: String,
    pub binary_port: u16,
    pub http_port: u16,
    pub field_rules: String,
    pub reconcile_attempts: u32,
    pub quick_attempts: u32,
    pub reconcile_interval: Duration,
    pub state_path: PathBuf,
    pub rt_include_path: PathBuf,
    pub label_selector: Option<LabelSelector>,
    pub kube_api_url: String,
    pub log_level: tracing::Level,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let hostname = get("HOSTNAME")
            .or_else(|| {
                std::fs::read_to_string("/etc/hostname")
                    .ok()
                    .map(|h| h.trim().to_string())
            })
            .filter(|h| !h.is_empty())
            .ok_or(ConfigError::MissingHostname)?;

        Ok(Self {
            cluster_name: get("CLUSTER_NAME").unwrap_or_else(|| "m_cluster".to_string()),
            hostname,
            binary_port: parse_or(&get, "BINARY_PORT", 9312)?,
            http_port: parse_or(&get, "HTTP_PORT", 9308)?,
            field_rules: get("FIELDS").unwrap_or_default(),
            reconcile_attempts: parse_or(&get, "RECONCILE_ATTEMPTS", 60)?,
            quick_attempts: parse_or(&get, "QUICK_ATTEMPTS", 5)?,
            reconcile_interval: Duration::from_secs(parse_or(&get, "RECONCILE_INTERVAL_SECS", 30)?),
            state_path: get("STATE_PATH")
                .unwrap_or_else(|| DEFAULT_STATE_PATH.to_string())
                .into(),
            rt_include_path: get("RT_INCLUDE_PATH")
                .unwrap_or_else(|| DEFAULT_RT_INCLUDE_PATH.to_string())
                .into(),
            label_selector: get("LABELS")
                .map(|raw| LabelSelector::parse(&raw))
                .filter(|selector| !selector.is_empty()),
            kube_api_url: get("KUBE_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            log_level: parse_or(&get, "LOG_LEVEL", tracing::Level::INFO)?,
        })
    }

    pub fn reconciler_settings(&self) -> ReconcilerSettings {
        ReconcilerSettings {
            binary_port: self.binary_port,
            node_port: self.http_port,
            label_selector: self.label_selector.clone(),
            ..ReconcilerSettings::new(&self.cluster_name, &self.hostname)
        }
    }
}

fn parse_or<T, G>(get: &G, var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    G: Fn(&str) -> Option<String>,
{
    match get(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { var, value }),
    }
}
