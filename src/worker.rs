// Tick orchestrator: on every interval build one payload for the whole fleet and push it.
// Single task, strictly sequential: all servers are computed before the one outbound request,
// and no two ticks overlap. Failed pushes are logged; the next tick is the only retry.

use crate::push::MetricSink;
use crate::simulator::FleetSimulator;
use tokio::time::{Duration, MissedTickBehavior, interval};
use tracing::Instrument;

/// Worker timing config.
pub struct WorkerConfig {
    pub push_interval: Duration,
}

/// Result of one Publishing step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Delivered {
        status: u16,
        lines: usize,
        bytes: usize,
    },
    Failed,
}

/// Running totals, logged on shutdown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushStats {
    pub ticks: u64,
    pub delivered: u64,
    pub failed: u64,
}

impl PushStats {
    fn record(&mut self, outcome: TickOutcome) {
        self.ticks += 1;
        match outcome {
            TickOutcome::Delivered { .. } => self.delivered += 1,
            TickOutcome::Failed => self.failed += 1,
        }
    }
}

/// Wall-clock milliseconds since the epoch, or `None` if the system clock is before it.
pub fn now_ms() -> Option<i64> {
    match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
        Ok(d) => Some(d.as_millis() as i64),
        Err(e) => {
            tracing::warn!(error = %e, operation = "get_timestamp", "system time error");
            None
        }
    }
}

/// Builds the fleet payload and attempts delivery once. Never returns an error: transport
/// failures are logged and reported as [`TickOutcome::Failed`]. Without a timestamp the tick
/// is skipped entirely: no counters advance and nothing is sent.
pub async fn run_tick<S: MetricSink + ?Sized>(
    simulator: &mut FleetSimulator,
    sink: &S,
    timestamp_ms: Option<i64>,
) -> TickOutcome {
    let Some(timestamp_ms) = timestamp_ms else {
        tracing::warn!(operation = "push_metrics", "no wall-clock timestamp; skipping tick");
        return TickOutcome::Failed;
    };
    let payload = simulator.tick(timestamp_ms);
    let lines = payload.line_count;
    let bytes = payload.byte_len();
    let servers = payload.server_count;

    match sink.push(payload.body).await {
        Ok(receipt) => {
            tracing::info!(
                servers,
                lines,
                bytes,
                status = receipt.status,
                "pushed fleet metrics"
            );
            TickOutcome::Delivered {
                status: receipt.status,
                lines,
                bytes,
            }
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                operation = "push_metrics",
                servers,
                bytes,
                "push failed; will retry on next tick"
            );
            TickOutcome::Failed
        }
    }
}

/// Spawns the push loop. The first tick fires immediately. On shutdown the loop finishes the
/// tick in progress and hands the simulator (and its counter state) back through the join handle.
pub fn spawn<S>(
    mut simulator: FleetSimulator,
    sink: S,
    config: WorkerConfig,
    mut shutdown_rx: tokio::sync::oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<(FleetSimulator, PushStats)>
where
    S: MetricSink + 'static,
{
    let worker_span = tracing::span!(
        tracing::Level::DEBUG,
        "push_worker",
        interval_secs = config.push_interval.as_secs()
    );

    tokio::spawn(
        async move {
            let mut tick = interval(config.push_interval);
            // a slow push pushes the schedule back rather than bursting to catch up
            tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

            let mut stats = PushStats::default();

            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        let outcome = run_tick(&mut simulator, &sink, now_ms()).await;
                        stats.record(outcome);
                        tracing::debug!(
                            ticks = stats.ticks,
                            delivered = stats.delivered,
                            failed = stats.failed,
                            "tick complete"
                        );
                    }
                    _ = &mut shutdown_rx => {
                        tracing::debug!("Push worker shutting down");
                        break;
                    }
                }
            }

            tracing::info!(
                ticks = stats.ticks,
                delivered = stats.delivered,
                failed = stats.failed,
                "push worker stopped"
            );
            (simulator, stats)
        }
        .instrument(worker_span),
    )
}
