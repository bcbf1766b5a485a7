// Synthetic provider: CSP-shaped resource, inventory and cost metrics driven by slow waves of
// wall-clock time, for exercising the collector and dashboards without cloud credentials.

use async_trait::async_trait;
use chrono::Datelike;
use futures_util::StreamExt;
use futures_util::stream;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{CspProvider, MetricStream};
use crate::error::Result;
use crate::models::{CspKind, Customer, Metric};
use crate::signal::{WaveParams, clamp_pct, non_negative, wave_at};

/// Daily base cost per service in USD, before the customer's cost scale.
pub const SERVICE_DAILY_COSTS: [(&str, f64); 3] = [
    ("AmazonEC2", 8.50),
    ("AmazonS3", 2.30),
    ("AmazonRDS", 6.80),
];

/// Noise is a fifth of the amplitude on every mock wave.
const NOISE_SHARE: f64 = 0.2;

fn mock_wave(base: f64, amplitude: f64, period_minutes: f64) -> WaveParams {
    WaveParams::new(base, amplitude, period_minutes * 60.0, amplitude * NOISE_SHARE)
}

fn sample<R: Rng + ?Sized>(t: f64, params: WaveParams, rng: &mut R) -> f64 {
    non_negative(wave_at(params, t, 0.0, rng))
}

pub struct MockProvider {
    customer: Customer,
    seed: Option<u64>,
}

impl MockProvider {
    pub fn new(customer: Customer) -> Self {
        Self {
            customer,
            seed: None,
        }
    }

    /// Deterministic noise for tests.
    pub fn with_seed(customer: Customer, seed: u64) -> Self {
        Self {
            customer,
            seed: Some(seed),
        }
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Resource and inventory metrics at wall-clock second `t`.
    pub fn resource_metrics<R: Rng + ?Sized>(&self, t: f64, rng: &mut R) -> Vec<Metric> {
        let c = &self.customer;
        let p = &c.profile;
        let region = c.primary_region();
        let mut out = Vec::with_capacity(c.servers.len() * 6 + 2);

        for srv in &c.servers {
            let base = |name: &str, value: f64| {
                Metric::new(name, value)
                    .label("customer_id", c.id.as_str())
                    .label("csp", self.csp_label())
                    .label("region", region)
                    .label("resource_id", srv.resource_id.as_str())
            };

            let cpu = clamp_pct(sample(t, mock_wave(p.cpu_base, p.cpu_amp, 45.0), rng));
            out.push(
                base("msp_csp_cpu_utilization", cpu)
                    .label("instance_type", srv.instance_type.as_str()),
            );
            let mem = clamp_pct(sample(t, mock_wave(p.mem_base, p.mem_amp, 90.0), rng));
            out.push(base("msp_csp_memory_utilization", mem));
            out.push(base(
                "msp_csp_network_in_bytes",
                sample(t, mock_wave(5_000_000.0, 2_000_000.0, 30.0), rng),
            ));
            out.push(base(
                "msp_csp_network_out_bytes",
                sample(t, mock_wave(3_000_000.0, 1_500_000.0, 30.0), rng),
            ));
            out.push(base(
                "msp_csp_disk_read_bytes",
                sample(t, mock_wave(1_000_000.0, 500_000.0, 120.0), rng),
            ));
            out.push(base(
                "msp_csp_disk_write_bytes",
                sample(t, mock_wave(800_000.0, 400_000.0, 120.0), rng),
            ));
        }

        let running = c.servers.iter().filter(|s| s.running).count();
        out.push(self.customer_metric("msp_csp_instance_count", c.servers.len() as f64));
        out.push(self.customer_metric("msp_csp_instance_running", running as f64));
        out
    }

    /// Daily and month-to-date cost per service at wall-clock second `t`.
    pub fn cost_metrics<R: Rng + ?Sized>(
        &self,
        t: f64,
        day_of_month: u32,
        rng: &mut R,
    ) -> Vec<Metric> {
        let scale = self.customer.profile.cost_scale;
        let mut out = Vec::with_capacity(SERVICE_DAILY_COSTS.len() * 2 + 1);
        let mut monthly_total = 0.0;

        for (service, base_daily) in SERVICE_DAILY_COSTS {
            let daily_base = base_daily * scale;
            let daily = non_negative(wave_at(
                mock_wave(daily_base, daily_base * 0.1, 1440.0),
                t,
                0.0,
                rng,
            ));
            let monthly = daily * f64::from(day_of_month);
            monthly_total += monthly;
            out.push(
                self.customer_metric("msp_csp_cost_daily", daily)
                    .label("service", service),
            );
            out.push(
                self.customer_metric("msp_csp_cost_monthly", monthly)
                    .label("service", service),
            );
        }

        out.push(self.customer_metric("msp_csp_cost_monthly_total", monthly_total));
        out
    }

    fn customer_metric(&self, name: &str, value: f64) -> Metric {
        Metric::new(name, value)
            .label("customer_id", self.customer.id.as_str())
            .label("csp", self.csp_label())
    }
}

fn wall_clock_secs() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[async_trait]
impl CspProvider for MockProvider {
    fn kind(&self) -> CspKind {
        CspKind::Mock
    }

    fn customer_id(&self) -> &str {
        &self.customer.id
    }

    fn csp_label(&self) -> &'static str {
        self.customer.emulate.unwrap_or(CspKind::Mock).as_str()
    }

    async fn collect_metrics(&self) -> Result<MetricStream> {
        if !self.customer.collects("ec2") {
            return Ok(stream::empty().boxed());
        }
        let metrics = self.resource_metrics(wall_clock_secs(), &mut self.rng());
        Ok(stream::iter(metrics).boxed())
    }

    async fn collect_cost(&self) -> Result<MetricStream> {
        if !self.customer.collects("cost") {
            return Ok(stream::empty().boxed());
        }
        let day = chrono::Local::now().day();
        let metrics = self.cost_metrics(wall_clock_secs(), day, &mut self.rng());
        Ok(stream::iter(metrics).boxed())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
