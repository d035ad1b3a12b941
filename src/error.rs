//! Error Taxonomy
//!
//! Separates the failure classes the bootstrap loop must treat differently:
//!
//! - **`ConfigError`**: a misconfigured deployment. Fatal, reported before any network work.
//! - **`NodeError`**: a search node could not be reached or rejected a statement.
//!   During probing this is soft (the peer is excluded); during the create-or-join
//!   protocol it fails the whole attempt.
//! - **`DiscoveryError`**: the orchestration API could not list pods.
//! - **`StoreError`**: the membership file could not be written.
//! - **`BootstrapError`**: a failed protocol step, carrying the step that failed.
//! - **`ReconcileError`**: anything that stops a reconciliation pass.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unsupported table type '{0}' (expected 'percolate' or 'rt')")]
    UnknownTableKind(String),

    #[error("invalid value '{value}' for {var}")]
    InvalidValue { var: &'static str, value: String },

    #[error("local hostname is not available")]
    MissingHostname,
}

#[derive(Error, Debug)]
pub enum NodeError {
    #[error("cannot connect to {address}: {reason}")]
    Connect { address: String, reason: String },

    #[error("query failed on {address} ({statement}): {reason}")]
    Query {
        address: String,
        statement: String,
        reason: String,
    },

    #[error("unexpected response from {address}: {reason}")]
    Protocol { address: String, reason: String },
}

#[derive(Error, Debug)]
pub enum DiscoveryError {
    #[error("pod listing request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("orchestration API answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed pod list: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("cannot read service account file {path}: {source}")]
    Credentials {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cannot write membership file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot encode membership record: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
#[error("bootstrap step '{step}' failed: {source}")]
pub struct BootstrapError {
    pub step: String,
    #[source]
    pub source: NodeError,
}

impl BootstrapError {
    pub fn step(step: impl Into<String>, source: NodeError) -> Self {
        Self {
            step: step.into(),
            source,
        }
    }
}

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),
}
