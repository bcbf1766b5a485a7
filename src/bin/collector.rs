use anyhow::Result;
use msp_collector::*;

#[tokio::main]
async fn main() -> Result<()> {
    let collector_config = config::CollectorConfig::from_env()?;
    logging::init(&collector_config.log_filter());

    let customers = match &collector_config.customers_file {
        Some(path) => models::load_customers(path)?,
        None => models::mock_customers(),
    };
    let providers = providers::build_all(&customers);

    let latest = collector_worker::LatestMetrics::new();
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let worker_handle = collector_worker::spawn(
        providers,
        latest.clone(),
        collector_config.collection_interval(),
        shutdown_rx,
    );

    let app = routes::app(latest);
    let addr = format!("0.0.0.0:{}", collector_config.metrics_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(
        customers = customers.len(),
        vm_url = %collector_config.vm_url,
        interval_secs = collector_config.collection_interval_secs,
        "CSP collector listening on http://{}",
        addr
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(logging::shutdown_signal())
        .await?;

    tracing::info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
    let _ = worker_handle.await;
    Ok(())
}
