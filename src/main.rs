use searchd_cluster::cluster::ClusterReconciler;
use searchd_cluster::config::Config;
use searchd_cluster::discovery::KubeApiClient;
use searchd_cluster::membership::MembershipStore;
use searchd_cluster::node::{HttpNodeConnector, PeerProbe};
use searchd_cluster::tables::TableLayout;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    tracing::info!(
        "Starting on {} for cluster {} (binary port {}, http port {})",
        config.hostname,
        config.cluster_name,
        config.binary_port,
        config.http_port
    );

    let layout = TableLayout::new(
        &config.field_rules,
        TableLayout::load_engine_options(&config.rt_include_path),
    );
    tracing::info!("Table layout: {} columns", layout.fields().len());

    let directory = KubeApiClient::in_cluster(&config.kube_api_url)?;
    let store = MembershipStore::open(&config.state_path);
    if store.has_cluster(&config.cluster_name) {
        tracing::info!(
            "Recorded members of {}: {}",
            config.cluster_name,
            store.current_members(&config.cluster_name).join(",")
        );
    }

    let mut reconciler = ClusterReconciler::new(
        config.reconciler_settings(),
        directory,
        PeerProbe::new(HttpNodeConnector::new()?),
        store,
    );

    // 1. Bring the local node into the cluster, retrying the whole protocol on failure:
    loop {
        match reconciler
            .bootstrap_local(&layout, config.reconcile_attempts)
            .await
        {
            Ok(outcome) => {
                tracing::info!("Bootstrap of {} finished: {:?}", config.cluster_name, outcome);
                break;
            }
            Err(e) => {
                tracing::error!("Bootstrap attempt failed: {}", e);
                tokio::time::sleep(config.reconcile_interval).await;
            }
        }
    }

    // 2. Periodic reconciliation:
    let mut interval = tokio::time::interval(config.reconcile_interval);
    loop {
        interval.tick().await;

        match reconciler
            .check_nodes_availability(config.reconcile_attempts)
            .await
        {
            Ok(available) => {
                tracing::info!("Cluster stats: {} available nodes", available.len());
            }
            Err(e) => {
                tracing::error!("Reconciliation pass failed: {}", e);
                continue;
            }
        }

        if let Err(e) = reconciler
            .ensure_primary(&layout, config.quick_attempts)
            .await
        {
            tracing::warn!("Primary check failed: {}", e);
        }
    }
}
