// Background collector: every collection interval, drain each provider's metric and cost streams
// and publish the rendered exposition text for GET /metrics.

use futures_util::StreamExt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval};
use tracing::{debug, info, instrument, warn};

use crate::error::Result;
use crate::exposition::{MetricLine, render_payload};
use crate::models::Metric;
use crate::providers::{CspProvider, MetricStream};

pub const PLACEHOLDER_BODY: &str = "# msp-collector: no collection cycle has completed yet\n";

/// Latest rendered collection, shared with the HTTP routes.
#[derive(Clone, Default)]
pub struct LatestMetrics {
    inner: Arc<RwLock<Option<String>>>,
}

impl LatestMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, body: String) {
        *self.inner.write().await = Some(body);
    }

    /// The last published body, or the placeholder before the first cycle.
    pub async fn body(&self) -> String {
        self.inner
            .read()
            .await
            .clone()
            .unwrap_or_else(|| PLACEHOLDER_BODY.to_string())
    }
}

/// Outcome of one provider in one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderReport {
    pub customer_id: String,
    pub csp: &'static str,
    pub healthy: bool,
    pub metrics: usize,
    /// Capabilities that reported NotImplemented or failed this cycle.
    pub unavailable: Vec<&'static str>,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionReport {
    pub body: String,
    pub providers: Vec<ProviderReport>,
}

impl CollectionReport {
    pub fn metric_count(&self) -> usize {
        self.providers.iter().map(|p| p.metrics).sum()
    }
}

async fn drain(
    capability: &'static str,
    provider: &dyn CspProvider,
    result: Result<MetricStream>,
    unavailable: &mut Vec<&'static str>,
) -> Vec<Metric> {
    match result {
        Ok(stream) => stream.collect().await,
        Err(e) if e.is_not_implemented() => {
            debug!(
                customer_id = provider.customer_id(),
                csp = %provider.kind(),
                capability,
                "capability not available; treating as empty"
            );
            unavailable.push(capability);
            Vec::new()
        }
        Err(e) => {
            warn!(
                error = %e,
                customer_id = provider.customer_id(),
                csp = %provider.kind(),
                capability,
                "collection failed"
            );
            unavailable.push(capability);
            Vec::new()
        }
    }
}

async fn collect_provider(
    provider: &dyn CspProvider,
    lines: &mut Vec<MetricLine>,
) -> ProviderReport {
    let started = Instant::now();
    let mut unavailable = Vec::new();

    let healthy = provider.health_check().await;
    let mut metrics = drain(
        "collect_metrics",
        provider,
        provider.collect_metrics().await,
        &mut unavailable,
    )
    .await;
    metrics.extend(
        drain(
            "collect_cost",
            provider,
            provider.collect_cost().await,
            &mut unavailable,
        )
        .await,
    );

    let duration = started.elapsed();
    let csp = provider.csp_label();
    lines.extend(metrics.iter().map(Metric::to_line));
    let health = |name: &str, value: f64| {
        Metric::new(name, value)
            .label("customer_id", provider.customer_id())
            .label("csp", csp)
            .to_line()
    };
    lines.push(health("msp_collector_up", if healthy { 1.0 } else { 0.0 }));
    lines.push(health(
        "msp_collector_last_scrape_duration_seconds",
        duration.as_secs_f64(),
    ));

    ProviderReport {
        customer_id: provider.customer_id().to_string(),
        csp,
        healthy,
        metrics: metrics.len(),
        unavailable,
        duration,
    }
}

/// Runs one collection cycle over every provider, sequentially, and renders the result.
#[instrument(skip_all, fields(providers = providers.len()))]
pub async fn collect_once(providers: &[Box<dyn CspProvider>]) -> CollectionReport {
    let mut lines = Vec::new();
    let mut reports = Vec::with_capacity(providers.len());
    for provider in providers {
        reports.push(collect_provider(provider.as_ref(), &mut lines).await);
    }
    CollectionReport {
        body: render_payload(&lines),
        providers: reports,
    }
}

pub fn spawn(
    providers: Vec<Box<dyn CspProvider>>,
    latest: LatestMetrics,
    collection_interval: Duration,
    mut shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut tick = interval(collection_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    let report = collect_once(&providers).await;
                    let healthy = report.providers.iter().filter(|p| p.healthy).count();
                    info!(
                        providers = report.providers.len(),
                        healthy,
                        metrics = report.metric_count(),
                        bytes = report.body.len(),
                        "collection cycle complete"
                    );
                    latest.set(report.body).await;
                }
                _ = &mut shutdown_rx => {
                    debug!("Collector worker shutting down");
                    break;
                }
            }
        }
    })
}
