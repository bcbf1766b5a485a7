// Per-server cumulative counter state, created lazily and advanced once per tick

use rand::Rng;
use std::collections::HashMap;

use crate::models::{RoleProfile, ServerIdentity};

/// CPU accounting modes, in exposition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CpuMode {
    Idle,
    User,
    System,
    Iowait,
    Nice,
    Softirq,
}

impl CpuMode {
    pub const ALL: [CpuMode; 6] = [
        CpuMode::Idle,
        CpuMode::User,
        CpuMode::System,
        CpuMode::Iowait,
        CpuMode::Nice,
        CpuMode::Softirq,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CpuMode::Idle => "idle",
            CpuMode::User => "user",
            CpuMode::System => "system",
            CpuMode::Iowait => "iowait",
            CpuMode::Nice => "nice",
            CpuMode::Softirq => "softirq",
        }
    }

    /// Share of the busy fraction charged to this mode. Idle takes the non-busy remainder instead.
    fn busy_weight(self) -> f64 {
        match self {
            CpuMode::Idle => 0.0,
            CpuMode::User => 0.55,
            CpuMode::System => 0.30,
            CpuMode::Iowait => 0.10,
            CpuMode::Nice => 0.03,
            CpuMode::Softirq => 0.02,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Seconds added to one core's `mode` accumulator for a tick at `utilization_pct`.
pub fn mode_delta(mode: CpuMode, utilization_pct: f64, interval_secs: f64) -> f64 {
    let busy = utilization_pct.clamp(0.0, 100.0) / 100.0;
    let share = match mode {
        CpuMode::Idle => 1.0 - busy,
        m => busy * m.busy_weight(),
    };
    share * interval_secs.max(0.0)
}

/// Baseline ranges used when a server is first seen.
pub const CPU_BASELINE_SECS: (f64, f64) = (10_000.0, 50_000.0);
pub const RX_BASELINE_BYTES: (f64, f64) = (1e9, 5e9);
pub const TX_BASELINE_BYTES: (f64, f64) = (5e8, 2e9);
pub const UPTIME_OFFSET_SECS: (u64, u64) = (86_400, 864_000);

/// Cumulative counters of one simulated server. Every counter is non-decreasing.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerState {
    core_count: u32,
    /// `[core][mode]` accumulated seconds.
    time_in_mode: Vec<[f64; 6]>,
    bytes_received: f64,
    bytes_transmitted: f64,
    uptime_offset_secs: u64,
}

impl ServerState {
    /// Seeds the counters with random baselines so the server looks like it has been up a while.
    pub fn seeded<R: Rng + ?Sized>(profile: RoleProfile, rng: &mut R) -> Self {
        let (cpu_lo, cpu_hi) = CPU_BASELINE_SECS;
        let time_in_mode = (0..profile.core_count)
            .map(|_| std::array::from_fn(|_| rng.gen_range(cpu_lo..=cpu_hi)))
            .collect();
        Self {
            core_count: profile.core_count,
            time_in_mode,
            bytes_received: rng.gen_range(RX_BASELINE_BYTES.0..=RX_BASELINE_BYTES.1),
            bytes_transmitted: rng.gen_range(TX_BASELINE_BYTES.0..=TX_BASELINE_BYTES.1),
            uptime_offset_secs: rng.gen_range(UPTIME_OFFSET_SECS.0..=UPTIME_OFFSET_SECS.1),
        }
    }

    /// Fixed baselines, for tests that need exact arithmetic.
    pub fn with_baselines(
        core_count: u32,
        cpu_secs: f64,
        bytes_received: f64,
        bytes_transmitted: f64,
    ) -> Self {
        Self {
            core_count,
            time_in_mode: vec![[cpu_secs; 6]; core_count as usize],
            bytes_received,
            bytes_transmitted,
            uptime_offset_secs: UPTIME_OFFSET_SECS.0,
        }
    }

    pub fn core_count(&self) -> u32 {
        self.core_count
    }

    pub fn cpu_seconds(&self, core: u32, mode: CpuMode) -> f64 {
        self.time_in_mode
            .get(core as usize)
            .map(|modes| modes[mode.index()])
            .unwrap_or(0.0)
    }

    pub fn bytes_received(&self) -> f64 {
        self.bytes_received
    }

    pub fn bytes_transmitted(&self) -> f64 {
        self.bytes_transmitted
    }

    pub fn uptime_offset_secs(&self) -> u64 {
        self.uptime_offset_secs
    }

    /// Splits `utilization_pct` across the six modes and charges every core for the interval.
    pub fn advance_cpu(&mut self, utilization_pct: f64, interval_secs: f64) {
        let deltas = CpuMode::ALL.map(|m| mode_delta(m, utilization_pct, interval_secs));
        for modes in &mut self.time_in_mode {
            for (acc, delta) in modes.iter_mut().zip(deltas) {
                *acc += delta;
            }
        }
    }

    /// Adds `rate * interval` to each byte counter. Negative rates are treated as zero.
    pub fn advance_network(&mut self, rx_rate: f64, tx_rate: f64, interval_secs: f64) {
        let interval_secs = interval_secs.max(0.0);
        self.bytes_received += rx_rate.max(0.0) * interval_secs;
        self.bytes_transmitted += tx_rate.max(0.0) * interval_secs;
    }
}

/// All server states, keyed by identity. Entries are created on first reference and never removed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StateStore {
    states: HashMap<ServerIdentity, ServerState>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identity: &ServerIdentity) -> Option<&ServerState> {
        self.states.get(identity)
    }

    /// Returns the state for `identity`, seeding it from the role profile on first use.
    pub fn get_or_seed<R: Rng + ?Sized>(
        &mut self,
        identity: &ServerIdentity,
        rng: &mut R,
    ) -> &mut ServerState {
        self.states
            .entry(identity.clone())
            .or_insert_with(|| ServerState::seeded(identity.profile(), rng))
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
