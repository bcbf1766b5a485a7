// Fleet telemetry simulator: per-tick sampling, counter advance and node_exporter-style rendering

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::exposition::{MetricLine, render_payload};
use crate::fleet::{FleetRegistry, NET_RX, NET_TX, NET_TX_PHASE_SHIFT, Scenarios};
use crate::models::ServerIdentity;
use crate::signal::{SignalGenerator, clamp_pct, non_negative, phase_for, uniform, wave_at};
use crate::state::{CpuMode, ServerState, StateStore};

const MEM_FREE_SHARE: f64 = 0.3;
const MEM_BUFFERS_SHARE: f64 = 0.1;
const MEM_CACHED_SHARE: f64 = 0.4;
const LOAD1_JITTER: f64 = 0.3;
const LOAD5_JITTER: f64 = 0.2;
const LOAD5_FACTOR: f64 = 0.9;

const ROOT_MOUNT: &[(&str, &str)] = &[
    ("mountpoint", "/"),
    ("fstype", "ext4"),
    ("device", "/dev/sda1"),
];
const NET_DEVICE: &str = "eth0";

/// Instantaneous readings for one server in one tick. Percentages are clamped to `[0, 100]`,
/// rates and load averages are non-negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServerSample {
    pub cpu_pct: f64,
    pub mem_pct: f64,
    pub fs_pct: f64,
    pub rx_rate: f64,
    pub tx_rate: f64,
    pub load1: f64,
    pub load5: f64,
}

/// Draws one tick's readings for `server`.
pub fn sample_server<R: Rng + ?Sized>(
    scenarios: &Scenarios,
    server: &ServerIdentity,
    elapsed_secs: f64,
    rng: &mut R,
) -> ServerSample {
    let phase = phase_for(&server.tenant_id, &server.server_name);
    let cores = f64::from(server.profile().core_count);

    let cpu_pct = clamp_pct(wave_at(scenarios.cpu(server), elapsed_secs, phase, rng));
    let mem_pct = clamp_pct(wave_at(scenarios.memory(server), elapsed_secs, phase, rng));
    let fs_pct = clamp_pct(wave_at(scenarios.filesystem(server), elapsed_secs, phase, rng));
    let rx_rate = non_negative(wave_at(NET_RX, elapsed_secs, phase, rng));
    let tx_rate = non_negative(wave_at(
        NET_TX,
        elapsed_secs,
        phase + NET_TX_PHASE_SHIFT,
        rng,
    ));

    let busy_cores = cpu_pct / 100.0 * cores;
    let load1 = non_negative(busy_cores + uniform(rng, LOAD1_JITTER));
    let load5 = non_negative(busy_cores * LOAD5_FACTOR + uniform(rng, LOAD5_JITTER));

    ServerSample {
        cpu_pct,
        mem_pct,
        fs_pct,
        rx_rate,
        tx_rate,
        load1,
        load5,
    }
}

/// Applies one tick of counter deltas. Call at most once per server per tick.
pub fn advance_server(state: &mut ServerState, sample: &ServerSample, interval_secs: f64) {
    state.advance_cpu(sample.cpu_pct, interval_secs);
    state.advance_network(sample.rx_rate, sample.tx_rate, interval_secs);
}

fn base_labels<'a>(
    server: &'a ServerIdentity,
    environment: &'a str,
) -> [(&'static str, &'a str); 3] {
    [
        ("customer_id", server.tenant_id.as_str()),
        ("server_name", server.server_name.as_str()),
        ("environment", environment),
    ]
}

/// Renders every line for one server. Pure: rendering the same inputs twice yields the same lines.
pub fn render_server(
    server: &ServerIdentity,
    environment: &str,
    state: &ServerState,
    sample: &ServerSample,
    elapsed_secs: f64,
    timestamp_ms: i64,
) -> Vec<MetricLine> {
    let profile = server.profile();
    let base = base_labels(server, environment);
    let line = |name: &str, value: f64| MetricLine::new(name, value).labels(base).at(timestamp_ms);

    let mut lines = Vec::with_capacity(13 + state.core_count() as usize * CpuMode::ALL.len());

    lines.push(
        line("node_uname_info", 1.0)
            .label("nodename", server.server_name.as_str())
            .label("sysname", "Linux")
            .label("release", "5.15.0-generic"),
    );

    for core in 0..state.core_count() {
        let cpu = core.to_string();
        for mode in CpuMode::ALL {
            lines.push(
                line("node_cpu_seconds_total", state.cpu_seconds(core, mode))
                    .label("cpu", cpu.as_str())
                    .label("mode", mode.as_str()),
            );
        }
    }

    let mem_total = profile.memory_bytes;
    let mem_avail = (mem_total as f64 * (1.0 - sample.mem_pct / 100.0)) as u64;
    let share = |fraction: f64| (mem_avail as f64 * fraction) as u64;
    lines.push(line("node_memory_MemTotal_bytes", mem_total as f64));
    lines.push(line("node_memory_MemAvailable_bytes", mem_avail as f64));
    lines.push(line("node_memory_MemFree_bytes", share(MEM_FREE_SHARE) as f64));
    lines.push(line("node_memory_Buffers_bytes", share(MEM_BUFFERS_SHARE) as f64));
    lines.push(line("node_memory_Cached_bytes", share(MEM_CACHED_SHARE) as f64));

    let disk_total = profile.disk_bytes;
    let disk_avail = (disk_total as f64 * (1.0 - sample.fs_pct / 100.0)) as u64;
    lines.push(
        line("node_filesystem_size_bytes", disk_total as f64).labels(ROOT_MOUNT.iter().copied()),
    );
    lines.push(
        line("node_filesystem_avail_bytes", disk_avail as f64).labels(ROOT_MOUNT.iter().copied()),
    );

    lines.push(
        line("node_network_receive_bytes_total", state.bytes_received()).label("device", NET_DEVICE),
    );
    lines.push(
        line("node_network_transmit_bytes_total", state.bytes_transmitted())
            .label("device", NET_DEVICE),
    );

    lines.push(line("node_load1", sample.load1));
    lines.push(line("node_load5", sample.load5));

    let uptime = elapsed_secs.max(0.0).floor() as u64 + state.uptime_offset_secs();
    lines.push(line("node_uptime_seconds", uptime as f64));

    lines
}

/// One tick's output: the exposition body plus counts for logging.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    pub body: String,
    pub line_count: usize,
    pub server_count: usize,
    pub timestamp_ms: i64,
}

impl Payload {
    pub fn byte_len(&self) -> usize {
        self.body.len()
    }
}

/// Owns the fleet's counter state and produces one payload per tick.
pub struct FleetSimulator {
    registry: FleetRegistry,
    store: StateStore,
    signals: SignalGenerator,
    rng: StdRng,
    interval_secs: f64,
}

impl FleetSimulator {
    pub fn new(registry: FleetRegistry, interval_secs: u64) -> Self {
        Self::with_rng(registry, interval_secs, StdRng::from_entropy())
    }

    /// Uses the given random source for baselines, noise and jitter.
    pub fn with_rng(registry: FleetRegistry, interval_secs: u64, rng: StdRng) -> Self {
        Self {
            registry,
            store: StateStore::new(),
            signals: SignalGenerator::new(),
            rng,
            interval_secs: interval_secs as f64,
        }
    }

    pub fn registry(&self) -> &FleetRegistry {
        &self.registry
    }

    pub fn store(&self) -> &StateStore {
        &self.store
    }

    /// Runs one tick at the current process-relative time.
    pub fn tick(&mut self, timestamp_ms: i64) -> Payload {
        let elapsed = self.signals.elapsed_secs();
        self.tick_at(timestamp_ms, elapsed)
    }

    /// Runs one tick at an explicit elapsed time: sample, advance, render every server in
    /// registry order, then assemble the payload.
    pub fn tick_at(&mut self, timestamp_ms: i64, elapsed_secs: f64) -> Payload {
        let Self {
            registry,
            store,
            rng,
            interval_secs,
            ..
        } = self;

        let mut lines = Vec::new();
        for server in registry.servers() {
            let sample = sample_server(registry.scenarios(), server, elapsed_secs, rng);
            let state = store.get_or_seed(server, rng);
            advance_server(state, &sample, *interval_secs);
            lines.extend(render_server(
                server,
                registry.environment(),
                state,
                &sample,
                elapsed_secs,
                timestamp_ms,
            ));
        }

        Payload {
            body: render_payload(&lines),
            line_count: lines.len(),
            server_count: registry.servers().len(),
            timestamp_ms,
        }
    }
}
