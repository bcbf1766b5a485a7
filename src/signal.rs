// Smooth, per-server phased pseudo-periodic signals with bounded noise

use rand::Rng;
use std::f64::consts::TAU;
use tokio::time::Instant;

/// Shape of one sine wave: `base + amplitude * sin(2π t / period + phase) ± noise`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveParams {
    pub base: f64,
    pub amplitude: f64,
    pub period_secs: f64,
    pub noise: f64,
}

impl WaveParams {
    pub const fn new(base: f64, amplitude: f64, period_secs: f64, noise: f64) -> Self {
        Self {
            base,
            amplitude,
            period_secs,
            noise,
        }
    }

    /// The noiseless value at `elapsed_secs` for the given phase.
    pub fn at(&self, elapsed_secs: f64, phase: f64) -> f64 {
        self.base + self.amplitude * (TAU * elapsed_secs / self.period_secs + phase).sin()
    }

    /// Lowest and highest value the wave can produce before clamping.
    pub fn range(&self) -> (f64, f64) {
        let spread = self.amplitude.abs() + self.noise.abs();
        (self.base - spread, self.base + spread)
    }
}

/// Process-relative clock feeding `elapsed_secs` into [`wave_at`]. Elapsed time is measured
/// from construction.
#[derive(Debug)]
pub struct SignalGenerator {
    started: Instant,
}

impl Default for SignalGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalGenerator {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

/// `base + amplitude * sin(2π elapsed / period + phase) + U(-noise, noise)`. The only
/// side effect is the noise draw.
pub fn wave_at<R: Rng + ?Sized>(
    params: WaveParams,
    elapsed_secs: f64,
    phase: f64,
    rng: &mut R,
) -> f64 {
    params.at(elapsed_secs, phase) + uniform(rng, params.noise)
}

/// Uniform draw in `[-spread, spread]`; zero spread draws nothing.
pub fn uniform<R: Rng + ?Sized>(rng: &mut R, spread: f64) -> f64 {
    if spread > 0.0 {
        rng.gen_range(-spread..=spread)
    } else {
        0.0
    }
}

pub fn clamp_pct(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

/// Rates feed monotone counters and must never go negative.
pub fn non_negative(value: f64) -> f64 {
    value.max(0.0)
}

/// Deterministic phase in `[0, 2π)` from a stable FNV-1a hash of `tenant:server`.
pub fn phase_for(tenant_id: &str, server_name: &str) -> f64 {
    let h = fnv1a64(
        tenant_id
            .bytes()
            .chain(std::iter::once(b':'))
            .chain(server_name.bytes()),
    );
    (h % 1000) as f64 / 1000.0 * TAU
}

fn fnv1a64(bytes: impl IntoIterator<Item = u8>) -> u64 {
    const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    bytes
        .into_iter()
        .fold(OFFSET, |h, b| (h ^ u64::from(b)).wrapping_mul(PRIME))
}
