use super::bootstrap::ClusterBootstrap;
use super::types::{BootstrapOutcome, BootstrapPlan, QuorumReport, ReconcilerSettings};
use crate::discovery::{Pod, PodDirectory};
use crate::error::{BootstrapError, ReconcileError};
use crate::membership::MembershipStore;
use crate::node::{NodeConnection, NodeConnector, PeerProbe};
use crate::tables::TableLayout;

/// Attempt budget for the primary/non-primary survey.
pub const QUORUM_ATTEMPTS: u32 = 60;

/// Drives discovery, probing, the create-or-join protocol and membership persistence.
///
/// One pass at a time per process; probes inside a pass run sequentially.
pub struct ClusterReconciler<D, C> {
    settings: ReconcilerSettings,
    directory: D,
    probe: PeerProbe<C>,
    store: MembershipStore,
}

impl<D: PodDirectory, C: NodeConnector> ClusterReconciler<D, C> {
    pub fn new(
        settings: ReconcilerSettings,
        directory: D,
        probe: PeerProbe<C>,
        store: MembershipStore,
    ) -> Self {
        Self {
            settings,
            directory,
            probe,
            store,
        }
    }

    pub fn settings(&self) -> &ReconcilerSettings {
        &self.settings
    }

    pub fn store(&self) -> &MembershipStore {
        &self.store
    }

    async fn list_pods(&self) -> Result<Vec<Pod>, ReconcileError> {
        Ok(self
            .directory
            .list_pods(self.settings.label_selector.as_ref())
            .await?)
    }

    fn member_address(&self, hostname: &str) -> String {
        format!("{}:{}", hostname, self.settings.binary_port)
    }

    /// Probes every candidate pod and persists the reachable members of the cluster.
    ///
    /// A lone candidate is taken as available without a probe. With more candidates,
    /// the pod whose hostname starts with the local hostname is taken as available
    /// and every other pod is probed with `attempts` connection attempts.
    pub async fn check_nodes_availability(
        &mut self,
        attempts: u32,
    ) -> Result<Vec<String>, ReconcileError> {
        let pods = self.list_pods().await?;
        let cluster_name = self.settings.cluster_name.clone();
        let mut available = Vec::with_capacity(pods.len());

        if let [only] = pods.as_slice() {
            available.push(self.member_address(&only.hostname));
        } else {
            for pod in &pods {
                if pod.hostname.starts_with(&self.settings.local_hostname) {
                    available.push(self.member_address(&pod.hostname));
                    continue;
                }

                let result = self
                    .probe
                    .probe(&pod.hostname, self.settings.node_port, &cluster_name, attempts)
                    .await;

                if !result.reachable {
                    tracing::warn!(
                        "Node at {} no more available for cluster {}",
                        pod.hostname,
                        cluster_name
                    );
                    continue;
                }
                if !result.cluster_name_matches {
                    tracing::warn!(
                        "Cluster name mismatch at {} (expected {})",
                        pod.hostname,
                        cluster_name
                    );
                    continue;
                }

                available.push(self.member_address(&pod.hostname));
            }
        }

        tracing::info!(
            "Available nodes for cluster {}: {}/{}",
            cluster_name,
            available.len(),
            pods.len()
        );
        self.store.update_members(&cluster_name, &available)?;

        Ok(available)
    }

    /// Surveys every peer except the local pod for its primary/non-primary role.
    pub async fn quorum_report(&self, attempts: u32) -> Result<QuorumReport, ReconcileError> {
        let pods = self.list_pods().await?;
        Ok(self.survey(&pods, attempts).await)
    }

    async fn survey(&self, pods: &[Pod], attempts: u32) -> QuorumReport {
        let cluster_name = &self.settings.cluster_name;
        let mut report = QuorumReport::default();

        for pod in pods
            .iter()
            .filter(|pod| pod.name != self.settings.local_hostname)
        {
            let result = self
                .probe
                .probe(&pod.ip, self.settings.node_port, cluster_name, attempts)
                .await;

            if !result.reachable {
                tracing::warn!(
                    "Node at {} no more available, left out of the primary survey of {}",
                    pod.ip,
                    cluster_name
                );
                report.unreachable += 1;
                continue;
            }

            report.confirmed += 1;
            if result.is_primary != Some(true) {
                report.non_primary += 1;
            }
        }

        tracing::debug!("Primary survey of {}: {:?}", cluster_name, report);
        report
    }

    /// Whether every peer that answered reports non-primary.
    ///
    /// Unreachable peers count neither way, so a survey where nobody answered is also true.
    pub async fn is_all_nodes_non_primary(&self) -> Result<bool, ReconcileError> {
        Ok(self.quorum_report(QUORUM_ATTEMPTS).await?.all_non_primary())
    }

    async fn connect_local(&self, attempts: u32) -> Result<C::Connection, BootstrapError> {
        self.probe
            .connect(
                &self.settings.local_node_host,
                self.settings.node_port,
                &self.settings.cluster_name,
                attempts,
            )
            .await
            .map_err(|e| BootstrapError::step("connect to local node", e))
    }

    /// Runs one create-or-join attempt against the local node.
    ///
    /// Joins through recorded peers first when the node is outside the cluster; if no
    /// peer accepts, falls back to forming a new cluster.
    pub async fn bootstrap_local(
        &self,
        layout: &TableLayout,
        attempts: u32,
    ) -> Result<BootstrapOutcome, BootstrapError> {
        let node = self.connect_local(attempts).await?;
        let bootstrap = ClusterBootstrap::new(&node, layout);
        let known_members = self.store.current_members(&self.settings.cluster_name);

        match bootstrap.plan(&known_members, &self.settings.local_hostname) {
            BootstrapPlan::Join(peers) => match bootstrap.join(&peers).await {
                Ok(outcome) => Ok(outcome),
                Err(e) => {
                    tracing::warn!("{}, forming cluster {} instead", e, self.settings.cluster_name);
                    bootstrap.connect_and_create().await
                }
            },
            BootstrapPlan::Verify | BootstrapPlan::Create => bootstrap.connect_and_create().await,
        }
    }

    /// Forces the local node primary when it and every reachable peer are non-primary.
    ///
    /// Only the first pod by name does this, so two pods never bootstrap at once.
    /// Returns whether the statement was issued.
    pub async fn ensure_primary(
        &self,
        layout: &TableLayout,
        attempts: u32,
    ) -> Result<bool, ReconcileError> {
        let node = self.connect_local(attempts).await?;
        if !node.cluster_name_matches() || node.is_primary() {
            return Ok(false);
        }

        let pods = self.list_pods().await?;
        let first = pods.iter().map(|pod| pod.name.as_str()).min();
        if first != Some(self.settings.local_hostname.as_str()) {
            return Ok(false);
        }

        let report = self.survey(&pods, QUORUM_ATTEMPTS).await;
        if !report.all_non_primary() {
            return Ok(false);
        }
        if report.confirmed == 0 && report.unreachable > 0 {
            // Possibly partitioned from a side that still has a primary.
            tracing::warn!(
                "Not forcing primary in cluster {}: none of {} peers answered",
                self.settings.cluster_name,
                report.unreachable
            );
            return Ok(false);
        }

        tracing::warn!(
            "No primary in cluster {} ({} peers answered, {} unreachable)",
            self.settings.cluster_name,
            report.confirmed,
            report.unreachable
        );
        ClusterBootstrap::new(&node, layout).force_primary().await?;
        Ok(true)
    }
}
