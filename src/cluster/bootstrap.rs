//! Create-or-join protocol against the local node.
//!
//! ```text
//! Unchecked ─ in cluster? ──yes──> tables attached? ──yes──> Done (no-op)
//!     │                                  └─no──> create missing / attach ──> Done
//!     └─no──> CREATE CLUSTER ──> create + attach pq ──> create + attach tests ──> Done
//! ```
//!
//! Any failed statement aborts the attempt. Nothing is retried here; the caller
//! re-runs the whole protocol later.

use super::types::{BootstrapOutcome, BootstrapPlan};
use crate::error::{BootstrapError, NodeError};
use crate::node::NodeConnection;
use crate::tables::{TableLayout, TableSpec};

pub struct ClusterBootstrap<'a, N> {
    node: &'a N,
    layout: &'a TableLayout,
}

impl<'a, N: NodeConnection> ClusterBootstrap<'a, N> {
    pub fn new(node: &'a N, layout: &'a TableLayout) -> Self {
        Self { node, layout }
    }

    fn cluster_name(&self) -> &str {
        self.node.cluster_name()
    }

    /// Chooses between verifying, joining recorded peers, or creating a new cluster.
    pub fn plan(&self, known_members: &[String], local_hostname: &str) -> BootstrapPlan {
        if self.node.cluster_name_matches() {
            return BootstrapPlan::Verify;
        }

        let peers: Vec<String> = known_members
            .iter()
            .filter(|member| !member.starts_with(local_hostname))
            .cloned()
            .collect();

        if peers.is_empty() {
            BootstrapPlan::Create
        } else {
            BootstrapPlan::Join(peers)
        }
    }

    /// Makes sure the local node is in the cluster and carries both required tables.
    pub async fn connect_and_create(&self) -> Result<BootstrapOutcome, BootstrapError> {
        let tables = self.layout.required_tables();

        if !self.node.cluster_name_matches() {
            tracing::info!(
                "Node {} is not in cluster {}, creating it",
                self.node.address(),
                self.cluster_name()
            );
            self.create_cluster().await?;
            for table in &tables {
                self.create_table(table).await?;
                self.add_table_to_cluster(&table.name).await?;
            }
            return Ok(BootstrapOutcome::ClusterCreated);
        }

        let attached = self.node.tables_in_cluster();
        let missing: Vec<&TableSpec> = tables
            .iter()
            .filter(|table| !attached.contains(&table.name))
            .collect();

        if missing.is_empty() {
            tracing::debug!(
                "Cluster {} already carries all required tables",
                self.cluster_name()
            );
            return Ok(BootstrapOutcome::AlreadyProvisioned);
        }

        tracing::warn!(
            "Tables mismatch in cluster {}. Expected {} found {}",
            self.cluster_name(),
            tables
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(","),
            attached.join(",")
        );

        for table in missing {
            if !self.table_exists(&table.name).await {
                self.create_table(table).await?;
            }
            self.add_table_to_cluster(&table.name).await?;
        }

        Ok(BootstrapOutcome::TablesAttached)
    }

    /// Joins the cluster through the first peer that accepts.
    pub async fn join(&self, peers: &[String]) -> Result<BootstrapOutcome, BootstrapError> {
        let mut last_error = None;

        for peer in peers {
            let statement = format!("JOIN CLUSTER {} AT '{}'", self.cluster_name(), peer);
            match self.node.execute(&statement).await {
                Ok(_) => {
                    tracing::info!("Joined cluster {} through {}", self.cluster_name(), peer);
                    return Ok(BootstrapOutcome::Joined);
                }
                Err(e) => {
                    tracing::warn!(
                        "Cannot join cluster {} through {}: {}",
                        self.cluster_name(),
                        peer,
                        e
                    );
                    last_error = Some(e);
                }
            }
        }

        match last_error {
            Some(e) => Err(BootstrapError::step("join cluster", e)),
            None => Err(BootstrapError::step(
                "join cluster",
                NodeError::Protocol {
                    address: self.node.address().to_string(),
                    reason: "no peers to join".to_string(),
                },
            )),
        }
    }

    /// Declares this node's component primary.
    pub async fn force_primary(&self) -> Result<(), BootstrapError> {
        let statement = format!("SET CLUSTER {} GLOBAL 'pc.bootstrap' = 1", self.cluster_name());
        self.node
            .execute(&statement)
            .await
            .map_err(|e| BootstrapError::step("force primary", e))?;
        tracing::warn!(
            "Forced node {} to primary in cluster {}",
            self.node.address(),
            self.cluster_name()
        );
        Ok(())
    }

    async fn create_cluster(&self) -> Result<(), BootstrapError> {
        let statement = format!("CREATE CLUSTER {}", self.cluster_name());
        self.node
            .execute(&statement)
            .await
            .map_err(|e| BootstrapError::step("create cluster", e))?;
        tracing::info!("Created cluster {}", self.cluster_name());
        Ok(())
    }

    async fn create_table(&self, table: &TableSpec) -> Result<(), BootstrapError> {
        self.node
            .execute(&table.create_statement())
            .await
            .map_err(|e| BootstrapError::step(format!("create table {}", table.name), e))?;
        tracing::info!("Created {} table {}", table.kind, table.name);
        Ok(())
    }

    async fn add_table_to_cluster(&self, table: &str) -> Result<(), BootstrapError> {
        let statement = format!("ALTER CLUSTER {} ADD {}", self.cluster_name(), table);
        self.node
            .execute(&statement)
            .await
            .map_err(|e| BootstrapError::step(format!("attach table {}", table), e))?;
        tracing::info!("Attached {} to cluster {}", table, self.cluster_name());
        Ok(())
    }

    async fn table_exists(&self, table: &str) -> bool {
        match self.node.table_exists(table).await {
            Ok(exists) => exists,
            Err(e) => {
                tracing::warn!("Cannot check table {} on {}: {}", table, self.node.address(), e);
                false
            }
        }
    }
}
