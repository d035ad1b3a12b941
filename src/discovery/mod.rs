//! Peer Discovery Module
//!
//! Resolves which pods of this deployment currently exist. The reconciler only sees
//! the `PodDirectory` trait; `KubeApiClient` is the production implementation backed
//! by the orchestration platform's HTTP API.

pub mod kubernetes;
pub mod types;

use crate::error::DiscoveryError;
use async_trait::async_trait;

pub use kubernetes::KubeApiClient;
pub use types::{LabelSelector, Pod};

#[async_trait]
pub trait PodDirectory: Send + Sync {
    /// Current peer pods, optionally narrowed by a label selector.
    async fn list_pods(&self, selector: Option<&LabelSelector>) -> Result<Vec<Pod>, DiscoveryError>;
}
