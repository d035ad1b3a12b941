use super::connector::{NodeConnection, NodeConnector};
use super::types::{Row, SearchdStatus, value_to_string};
use crate::error::NodeError;

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Talks to a node through its SQL-over-HTTP endpoint (`POST /sql?mode=raw`).
#[derive(Clone)]
pub struct HttpNodeConnector {
    http_client: reqwest::Client,
}

impl HttpNodeConnector {
    pub fn new() -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl NodeConnector for HttpNodeConnector {
    type Connection = HttpNodeConnection;

    async fn connect(
        &self,
        host: &str,
        port: u16,
        cluster_name: &str,
    ) -> Result<HttpNodeConnection, NodeError> {
        let address = format!("{}:{}", host, port);
        let mut connection = HttpNodeConnection {
            http_client: self.http_client.clone(),
            url: format!("http://{}/sql?mode=raw", address),
            address,
            cluster_name: cluster_name.to_string(),
            status: SearchdStatus::default(),
        };

        let rows = connection.run("SHOW STATUS").await.map_err(|e| match e {
            NodeError::Query {
                address, reason, ..
            } => NodeError::Connect { address, reason },
            other => other,
        })?;
        connection.status = SearchdStatus::from_rows(&rows);

        tracing::debug!(
            "Connected to {} ({} status counters)",
            connection.address,
            connection.status.0.len()
        );

        Ok(connection)
    }
}

pub struct HttpNodeConnection {
    http_client: reqwest::Client,
    url: String,
    address: String,
    cluster_name: String,
    status: SearchdStatus,
}

impl HttpNodeConnection {
    async fn run(&self, statement: &str) -> Result<Vec<Row>, NodeError> {
        let response = self
            .http_client
            .post(&self.url)
            .form(&[("query", statement)])
            .send()
            .await
            .map_err(|e| NodeError::Connect {
                address: self.address.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| NodeError::Connect {
            address: self.address.clone(),
            reason: e.to_string(),
        })?;

        parse_sql_response(&self.address, statement, status, &body)
    }
}

/// Classifies a `/sql?mode=raw` response body.
///
/// The node answers with an array of result sets, each carrying `data` rows and an
/// `error` string, or with a bare `{"error": ...}` object when the request itself failed.
pub fn parse_sql_response(
    address: &str,
    statement: &str,
    status: reqwest::StatusCode,
    body: &str,
) -> Result<Vec<Row>, NodeError> {
    let query_error = |reason: String| NodeError::Query {
        address: address.to_string(),
        statement: statement.to_string(),
        reason,
    };

    let payload: Value = serde_json::from_str(body).map_err(|e| NodeError::Protocol {
        address: address.to_string(),
        reason: format!("{} (HTTP {}): {}", e, status, body),
    })?;

    let result_sets = match payload {
        Value::Array(sets) => sets,
        Value::Object(object) => {
            let reason = object
                .get("error")
                .map(value_to_string)
                .filter(|error| !error.is_empty())
                .unwrap_or_else(|| format!("HTTP {}", status));
            return Err(query_error(reason));
        }
        other => {
            return Err(NodeError::Protocol {
                address: address.to_string(),
                reason: format!("unexpected payload {}", other),
            });
        }
    };

    let mut rows = Vec::new();
    for set in result_sets {
        if let Some(error) = set.get("error").map(value_to_string)
            && !error.is_empty()
        {
            return Err(query_error(error));
        }
        if let Some(Value::Array(data)) = set.get("data") {
            rows.extend(data.iter().filter_map(|row| row.as_object().cloned()));
        }
    }

    if !status.is_success() {
        return Err(query_error(format!("HTTP {}", status)));
    }

    Ok(rows)
}

#[async_trait]
impl NodeConnection for HttpNodeConnection {
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
        tracing::debug!("Executing on {}: {}", self.address, statement);
        self.run(statement).await
    }
}
