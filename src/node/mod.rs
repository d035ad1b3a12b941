//! Node Control & Probing
//!
//! Everything the reconciler needs to know about a running search node.
//!
//! ## Components
//! - **`connector`**: the `NodeConnector` / `NodeConnection` seam (connect, status, execute).
//! - **`http`**: the production connector, speaking SQL over the node's HTTP endpoint.
//! - **`probe`**: `PeerProbe`, which retries connections with a bounded backoff and turns
//!   failures into an "unreachable" result instead of an error.
//! - **`types`**: the status snapshot and `PeerProbeResult`.

pub mod connector;
pub mod http;
pub mod probe;
pub mod types;

pub use connector::{NodeConnection, NodeConnector};
pub use http::HttpNodeConnector;
pub use probe::{Backoff, PeerProbe};
pub use types::{PeerProbeResult, Row, SearchdStatus};

#[cfg(test)]
pub(crate) mod testing;
