use super::PodDirectory;
use super::types::{LabelSelector, Pod, PodItem, PodList};
use crate::error::DiscoveryError;

use async_trait::async_trait;
use std::path::Path;

pub const DEFAULT_API_URL: &str = "https://kubernetes.default.svc";
pub const SERVICE_ACCOUNT_DIR: &str = "/var/run/secrets/kubernetes.io/serviceaccount";

/// Lists pods of the current namespace through the orchestration HTTP API.
pub struct KubeApiClient {
    api_url: String,
    namespace: String,
    bearer: Option<String>,
    http_client: reqwest::Client,
}

impl KubeApiClient {
    /// Builds a client without credentials, for API proxies and tests.
    pub fn new(api_url: impl Into<String>, namespace: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            namespace: namespace.into(),
            bearer: None,
            http_client: reqwest::Client::new(),
        }
    }

    /// Builds a client from the mounted service account (token, namespace, CA bundle).
    pub fn in_cluster(api_url: impl Into<String>) -> Result<Self, DiscoveryError> {
        Self::from_service_account(api_url, Path::new(SERVICE_ACCOUNT_DIR))
    }

    pub fn from_service_account(
        api_url: impl Into<String>,
        account_dir: &Path,
    ) -> Result<Self, DiscoveryError> {
        let token = read_credential(&account_dir.join("token"))?;
        let namespace = read_credential(&account_dir.join("namespace"))?;
        let ca_pem = std::fs::read(account_dir.join("ca.crt")).map_err(|source| {
            DiscoveryError::Credentials {
                path: account_dir.join("ca.crt").display().to_string(),
                source,
            }
        })?;

        let certificate = reqwest::Certificate::from_pem(&ca_pem)?;
        let http_client = reqwest::Client::builder()
            .add_root_certificate(certificate)
            .build()?;

        Ok(Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            namespace,
            bearer: Some(token),
            http_client,
        })
    }

    pub fn pods_url(&self, selector: Option<&LabelSelector>) -> String {
        let mut url = format!("{}/api/v1/namespaces/{}/pods", self.api_url, self.namespace);
        if let Some(selector) = selector
            && !selector.is_empty()
        {
            url.push_str("?labelSelector=");
            url.push_str(&selector.to_string());
        }
        url
    }
}

fn read_credential(path: &Path) -> Result<String, DiscoveryError> {
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|source| DiscoveryError::Credentials {
            path: path.display().to_string(),
            source,
        })
}

/// Converts API items to pods, keeping only pods that have an address.
pub fn pods_from_list(list: PodList, default_namespace: &str) -> Vec<Pod> {
    list.items
        .into_iter()
        .filter_map(|item| {
            let ip = item.status.pod_ip.clone().filter(|ip| !ip.is_empty())?;
            if matches!(item.status.phase.as_deref(), Some("Failed") | Some("Succeeded")) {
                return None;
            }
            let hostname = full_hostname(&item, default_namespace);
            Some(Pod::new(item.metadata.name, hostname, ip))
        })
        .collect()
}

/// Interprets a pod listing response: non-2xx statuses become `DiscoveryError::Status`.
pub fn pods_from_response(
    status: u16,
    body: &str,
    default_namespace: &str,
) -> Result<Vec<Pod>, DiscoveryError> {
    if !(200..300).contains(&status) {
        tracing::error!("Pod listing failed with {}: {}", status, body);
        return Err(DiscoveryError::Status {
            status,
            body: body.to_string(),
        });
    }

    let list: PodList = serde_json::from_str(body)?;
    Ok(pods_from_list(list, default_namespace))
}

fn full_hostname(item: &PodItem, default_namespace: &str) -> String {
    let host = item
        .spec
        .hostname
        .clone()
        .unwrap_or_else(|| item.metadata.name.clone());

    match item.spec.subdomain.as_deref() {
        Some(subdomain) if !subdomain.is_empty() => {
            let namespace = item
                .metadata
                .namespace
                .as_deref()
                .unwrap_or(default_namespace);
            format!("{}.{}.{}.svc.cluster.local", host, subdomain, namespace)
        }
        _ => host,
    }
}

#[async_trait]
impl PodDirectory for KubeApiClient {
    async fn list_pods(&self, selector: Option<&LabelSelector>) -> Result<Vec<Pod>, DiscoveryError> {
        let url = self.pods_url(selector);
        tracing::debug!("Listing pods: {}", url);

        let mut request = self
            .http_client
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(token) = &self.bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        pods_from_response(status, &body, &self.namespace)
    }
}
