use anyhow::Result;
use msp_collector::*;

#[tokio::main]
async fn main() -> Result<()> {
    logging::init("info");

    let sim_config = config::SimulatorConfig::from_env()?;
    let registry = match &sim_config.fleet_file {
        Some(path) => fleet::FleetRegistry::load(path)?,
        None => fleet::FleetRegistry::builtin(),
    };
    let sink = push::ImportClient::new(&sim_config.vm_url, sim_config.push_timeout())?;

    tracing::info!(
        target_url = sink.url(),
        interval_secs = sim_config.push_interval_secs,
        timeout_secs = sim_config.push_timeout_secs,
        tenants = registry.tenant_count(),
        servers = registry.servers().len(),
        "fleet simulator starting"
    );

    let simulator = simulator::FleetSimulator::new(registry, sim_config.push_interval_secs);
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let worker_handle = worker::spawn(
        simulator,
        sink,
        worker::WorkerConfig {
            push_interval: sim_config.push_interval(),
        },
        shutdown_rx,
    );

    logging::shutdown_signal().await;
    tracing::info!("Received shutdown signal");
    let _ = shutdown_tx.send(());
    let (simulator, stats) = worker_handle.await?;
    tracing::info!(
        servers_tracked = simulator.store().len(),
        ticks = stats.ticks,
        "fleet simulator stopped"
    );

    Ok(())
}
