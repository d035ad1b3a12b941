//! Node control seam.
//!
//! The core only needs to open a connection, read the status snapshot and issue
//! statements. Everything wire-level lives behind these two traits.

use super::types::{Row, SearchdStatus};
use crate::error::NodeError;
use async_trait::async_trait;

#[async_trait]
pub trait NodeConnector: Send + Sync {
    type Connection: NodeConnection;

    /// Opens a single connection attempt. Retrying is the caller's concern.
    async fn connect(
        &self,
        host: &str,
        port: u16,
        cluster_name: &str,
    ) -> Result<Self::Connection, NodeError>;
}

#[async_trait]
pub trait NodeConnection: Send + Sync {
    /// `host:port` this connection talks to.
    fn address(&self) -> &str;

    /// Cluster name the connection was opened for.
    fn cluster_name(&self) -> &str;

    fn status(&self) -> &SearchdStatus;

    async fn execute(&self, statement: &str) -> Result<Vec<Row>, NodeError>;

    fn cluster_name_matches(&self) -> bool {
        self.status().cluster_name_matches(self.cluster_name())
    }

    fn is_primary(&self) -> bool {
        self.status().is_primary(self.cluster_name())
    }

    fn tables_in_cluster(&self) -> Vec<String> {
        self.status().cluster_tables(self.cluster_name())
    }

    async fn table_exists(&self, name: &str) -> Result<bool, NodeError> {
        let rows = self
            .execute(&format!("SHOW TABLES LIKE '{}'", name))
            .await?;
        Ok(!rows.is_empty())
    }
}
