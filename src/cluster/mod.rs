//! Cluster Formation & Reconciliation
//!
//! The orchestration core: decides when and with which peers the search engine's own
//! replication primitives (create / join / attach table) are invoked, and records the result.
//!
//! ## Core Mechanisms
//! - **Availability pass**: lists candidate pods, probes each with a caller-supplied
//!   attempt budget and persists the reachable members. Unreachable or foreign peers are
//!   logged and left out; they never fail the pass.
//! - **Primary survey**: asks every peer except this one whether it is primary. Peers that
//!   cannot be reached are left out of both counts.
//! - **Create-or-join**: brings the local node into the cluster and makes sure the
//!   percolate and real-time tables exist and are attached. Idempotent; a failed step
//!   aborts the attempt and the caller retries the whole protocol later.
//!
//! ## Submodules
//! - **`reconciler`**: `ClusterReconciler`, owning discovery, probing and the membership store.
//! - **`bootstrap`**: `ClusterBootstrap`, the statement sequence run against the local node.
//! - **`types`**: settings, survey report, plan and outcome types.

pub mod bootstrap;
pub mod reconciler;
pub mod types;

pub use bootstrap::ClusterBootstrap;
pub use reconciler::{ClusterReconciler, QUORUM_ATTEMPTS};
pub use types::{BootstrapOutcome, BootstrapPlan, QuorumReport, ReconcilerSettings};
