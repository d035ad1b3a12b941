use crate::discovery::LabelSelector;

/// Per-instance identity and ports, fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerSettings {
    pub cluster_name: String,
    /// Hostname of the pod this process runs in.
    pub local_hostname: String,
    /// Address used to reach the search node under this process's control.
    pub local_node_host: String,
    /// Port appended to member addresses (replication).
    pub binary_port: u16,
    /// Port the node control connector talks to.
    pub node_port: u16,
    pub label_selector: Option<LabelSelector>,
}

impl ReconcilerSettings {
    pub fn new(cluster_name: impl Into<String>, local_hostname: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            local_hostname: local_hostname.into(),
            local_node_host: "127.0.0.1".to_string(),
            binary_port: 9312,
            node_port: 9308,
            label_selector: None,
        }
    }
}

/// Tally of one primary/non-primary survey over the peers.
///
/// Unreachable peers are excluded from both `confirmed` and `non_primary`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QuorumReport {
    pub confirmed: usize,
    pub non_primary: usize,
    pub unreachable: usize,
}

impl QuorumReport {
    /// True when every reachable peer reports non-primary.
    ///
    /// Also true when no peer could be reached at all (`0 == 0`). `ensure_primary` looks
    /// at `confirmed` and refuses to force the primary role in that case.
    pub fn all_non_primary(&self) -> bool {
        self.confirmed == self.non_primary
    }
}

/// What to do with the local node before provisioning tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BootstrapPlan {
    /// Already in the cluster: only check the tables.
    Verify,
    /// Not in the cluster, but peers are recorded: join through them.
    Join(Vec<String>),
    /// Nobody to join: form a new cluster.
    Create,
}

/// How a successful create-or-join attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// In the cluster with every required table attached; nothing was issued.
    AlreadyProvisioned,
    /// In the cluster; missing tables were created and/or attached.
    TablesAttached,
    /// A new cluster was formed and provisioned.
    ClusterCreated,
    /// Joined an existing cluster through a recorded peer.
    Joined,
}
