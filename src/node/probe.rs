use super::connector::{NodeConnection, NodeConnector};
use super::types::PeerProbeResult;
use crate::error::NodeError;

use std::time::Duration;

/// Spacing between connection attempts: doubles from `initial` up to `max`, plus jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    pub initial: Duration,
    pub max: Duration,
    pub jitter_ms: u64,
}

impl Backoff {
    /// No waiting at all between attempts.
    pub fn none() -> Self {
        Self {
            initial: Duration::ZERO,
            max: Duration::ZERO,
            jitter_ms: 0,
        }
    }

    /// Delay to wait after the failed attempt number `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self
            .initial
            .saturating_mul(2u32.saturating_pow(attempt.min(16)))
            .min(self.max);

        if self.jitter_ms == 0 {
            return base;
        }
        base + Duration::from_millis(rand::random::<u64>() % self.jitter_ms)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            initial: Duration::from_millis(150),
            max: Duration::from_millis(1200),
            jitter_ms: 50,
        }
    }
}

/// Wraps a `NodeConnector` with a caller-chosen attempt budget.
///
/// Probing never fails: exhausting the budget yields an unreachable result.
pub struct PeerProbe<C> {
    connector: C,
    backoff: Backoff,
}

impl<C: NodeConnector> PeerProbe<C> {
    pub fn new(connector: C) -> Self {
        Self {
            connector,
            backoff: Backoff::default(),
        }
    }

    pub fn with_backoff(mut self, backoff: Backoff) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn connector(&self) -> &C {
        &self.connector
    }

    /// Connects to `host:port`, retrying up to `max_attempts` times.
    pub async fn connect(
        &self,
        host: &str,
        port: u16,
        cluster_name: &str,
        max_attempts: u32,
    ) -> Result<C::Connection, NodeError> {
        let attempts = max_attempts.max(1);
        let mut attempt = 0;

        loop {
            match self.connector.connect(host, port, cluster_name).await {
                Ok(connection) => return Ok(connection),
                Err(e) => {
                    attempt += 1;
                    if attempt >= attempts {
                        return Err(e);
                    }
                    tracing::debug!(
                        "Attempt {}/{} to {}:{} failed: {}",
                        attempt,
                        attempts,
                        host,
                        port,
                        e
                    );
                    tokio::time::sleep(self.backoff.delay(attempt - 1)).await;
                }
            }
        }
    }

    /// Probes a peer for reachability, cluster membership and, when in the cluster, primary role.
    pub async fn probe(
        &self,
        host: &str,
        port: u16,
        expected_cluster_name: &str,
        max_attempts: u32,
    ) -> PeerProbeResult {
        match self
            .connect(host, port, expected_cluster_name, max_attempts)
            .await
        {
            Ok(connection) => {
                let cluster_name_matches = connection.cluster_name_matches();
                PeerProbeResult {
                    address: host.to_string(),
                    reachable: true,
                    cluster_name_matches,
                    is_primary: cluster_name_matches.then(|| connection.is_primary()),
                }
            }
            Err(e) => {
                tracing::warn!(
                    "Node at {} unreachable after {} attempts (cluster {}): {}",
                    host,
                    max_attempts.max(1),
                    expected_cluster_name,
                    e
                );
                PeerProbeResult::unreachable(host)
            }
        }
    }
}
