//! In-memory node doubles shared by the unit tests.
//!
//! `FakeCluster` holds one `FakeNode` per host and records every connection
//! attempt and statement so tests can assert on call counts and order.

use super::connector::{NodeConnection, NodeConnector};
use super::types::{Row, SearchdStatus};
use crate::error::NodeError;

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Default)]
pub(crate) struct FakeNode {
    status: HashMap<String, String>,
    /// Number of connection attempts that fail before the node answers.
    failing_connects: u32,
    local_tables: HashSet<String>,
    failing_statements: Vec<String>,
}

impl FakeNode {
    /// A node running outside any cluster.
    pub fn standalone() -> Self {
        Self::default()
    }

    pub fn in_cluster(cluster: &str, primary: bool, attached: &[&str]) -> Self {
        let mut status = HashMap::new();
        status.insert("cluster_name".to_string(), cluster.to_string());
        status.insert(
            format!("cluster_{}_status", cluster),
            if primary { "primary" } else { "non-primary" }.to_string(),
        );
        status.insert(format!("cluster_{}_indexes", cluster), attached.join(","));

        Self {
            status,
            local_tables: attached.iter().map(|t| t.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn down() -> Self {
        Self {
            failing_connects: u32::MAX,
            ..Self::default()
        }
    }

    pub fn failing_first(mut self, attempts: u32) -> Self {
        self.failing_connects = attempts;
        self
    }

    pub fn with_local_tables(mut self, tables: &[&str]) -> Self {
        self.local_tables.extend(tables.iter().map(|t| t.to_string()));
        self
    }

    pub fn failing_on(mut self, statement_prefix: &str) -> Self {
        self.failing_statements.push(statement_prefix.to_string());
        self
    }
}

#[derive(Default)]
pub(crate) struct FakeCluster {
    nodes: Mutex<HashMap<String, FakeNode>>,
    connects: Mutex<Vec<String>>,
    statements: Mutex<Vec<(String, String)>>,
}

impl FakeCluster {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn add(self: &Arc<Self>, host: &str, node: FakeNode) -> Arc<Self> {
        self.nodes.lock().unwrap().insert(host.to_string(), node);
        self.clone()
    }

    pub fn connector(self: &Arc<Self>) -> FakeConnector {
        FakeConnector {
            cluster: self.clone(),
        }
    }

    pub fn connect_attempts(&self, host: &str) -> usize {
        self.connects
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.as_str() == host)
            .count()
    }

    pub fn total_connects(&self) -> usize {
        self.connects.lock().unwrap().len()
    }

    /// Statements issued against `host`, excluding read-only `SHOW` queries.
    pub fn writes_for(&self, host: &str) -> Vec<String> {
        self.statements
            .lock()
            .unwrap()
            .iter()
            .filter(|(h, s)| h == host && !s.starts_with("SHOW"))
            .map(|(_, s)| s.clone())
            .collect()
    }
}

pub(crate) struct FakeConnector {
    cluster: Arc<FakeCluster>,
}

#[async_trait]
impl NodeConnector for FakeConnector {
    type Connection = FakeConnection;

    async fn connect(
        &self,
        host: &str,
        port: u16,
        cluster_name: &str,
    ) -> Result<FakeConnection, NodeError> {
        self.cluster.connects.lock().unwrap().push(host.to_string());

        let mut nodes = self.cluster.nodes.lock().unwrap();
        let refused = || NodeError::Connect {
            address: format!("{}:{}", host, port),
            reason: "connection refused".to_string(),
        };

        let node = nodes.get_mut(host).ok_or_else(refused)?;
        if node.failing_connects > 0 {
            if node.failing_connects != u32::MAX {
                node.failing_connects -= 1;
            }
            return Err(refused());
        }

        Ok(FakeConnection {
            host: host.to_string(),
            address: format!("{}:{}", host, port),
            cluster_name: cluster_name.to_string(),
            status: SearchdStatus(node.status.clone()),
            cluster: self.cluster.clone(),
        })
    }
}

pub(crate) struct FakeConnection {
    host: String,
    address: String,
    cluster_name: String,
    status: SearchdStatus,
    cluster: Arc<FakeCluster>,
}

#[async_trait]
impl NodeConnection for FakeConnection {
    fn address(&self) -> &str {
        &self.address
    }

    fn cluster_name(&self) -> &str {
        &self.cluster_name
    }

    fn status(&self) -> &SearchdStatus {
        &self.status
    }

    async fn execute(&self, statement: &str) -> Result<Vec<Row>, NodeError> {
        self.cluster
            .statements
            .lock()
            .unwrap()
            .push((self.host.clone(), statement.to_string()));

        let mut nodes = self.cluster.nodes.lock().unwrap();
        let node = nodes.entry(self.host.clone()).or_default();

        if node
            .failing_statements
            .iter()
            .any(|prefix| statement.starts_with(prefix.as_str()))
        {
            return Err(NodeError::Query {
                address: self.address.clone(),
                statement: statement.to_string(),
                reason: "rejected".to_string(),
            });
        }

        if let Some(rest) = statement.strip_prefix("SHOW TABLES LIKE '") {
            let table = rest.trim_end_matches('\'');
            if node.local_tables.contains(table) {
                let mut row = Row::new();
                row.insert("Index".to_string(), table.into());
                return Ok(vec![row]);
            }
            return Ok(vec![]);
        }

        if let Some(rest) = statement.strip_prefix("CREATE TABLE IF NOT EXISTS ")
            && let Some(table) = rest.split_whitespace().next()
        {
            node.local_tables.insert(table.to_string());
        }

        Ok(vec![])
    }
}

/// Answers a single HTTP request on a loopback port with a canned response.
///
/// Returns the `host:port` to call and a handle resolving to the raw request text.
pub(crate) async fn serve_once(
    status_line: &str,
    body: &str,
) -> (String, tokio::task::JoinHandle<String>) {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        body.len(),
        body
    );

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
            if request_complete(&request) {
                break;
            }
        }
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        String::from_utf8_lossy(&request).into_owned()
    });

    (address, handle)
}

/// Headers received and, when a `Content-Length` is present, the whole body too.
fn request_complete(request: &[u8]) -> bool {
    let text = String::from_utf8_lossy(request);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..header_end]
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);
    request.len() >= header_end + 4 + content_length
}
