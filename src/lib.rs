//! Search Cluster Bootstrap Library
//!
//! Forms and heals a multi-node search-engine cluster running as a set of pods. Each pod
//! runs one instance of this crate next to its search node.
//!
//! ## Architecture Modules
//!
//! - **`cluster`**: The orchestration core. Probes peers, decides between creating and
//!   joining a cluster, provisions the required tables and records the live membership.
//! - **`discovery`**: Lists peer pods from the orchestration platform.
//! - **`membership`**: Persists the last-known member list and table definitions on disk.
//! - **`node`**: Talks to search nodes: status snapshots, statements, retrying probes.
//! - **`tables`**: Table kinds, field-rule parsing and DDL generation.
//! - **`config`** / **`error`**: Environment configuration and the error taxonomy.

pub mod cluster;
pub mod config;
pub mod discovery;
pub mod error;
pub mod membership;
pub mod node;
pub mod tables;
