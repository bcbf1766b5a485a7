// CSP provider capability contract and construction from customer config
//
// Each provider offers three capabilities: a metrics stream, a cost stream and a health check.
// Streams are finite for one collection cycle; calling again starts a new cycle, dropping the
// stream cancels it.

mod aws;
mod mock;
mod pending;

pub use aws::AwsProvider;
pub use mock::{MockProvider, SERVICE_DAILY_COSTS};
pub use pending::PendingProvider;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

use crate::error::Result;
use crate::models::{CspKind, Customer, Metric};

pub type MetricStream = BoxStream<'static, Metric>;

#[async_trait]
pub trait CspProvider: Send + Sync {
    fn kind(&self) -> CspKind;

    fn customer_id(&self) -> &str;

    /// Value of the `csp` label on everything this provider emits.
    fn csp_label(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Resource metrics (CPU, network, disk, ...) for one collection cycle.
    async fn collect_metrics(&self) -> Result<MetricStream>;

    /// Cost records for one collection cycle.
    async fn collect_cost(&self) -> Result<MetricStream>;

    /// Whether the provider API is reachable with the configured credentials.
    async fn health_check(&self) -> bool;
}

/// Picks the provider variant for `customer.csp`.
pub fn build(customer: &Customer) -> Box<dyn CspProvider> {
    match customer.csp {
        CspKind::Aws => Box::new(AwsProvider::new(customer)),
        CspKind::Mock => Box::new(MockProvider::new(customer.clone())),
        kind @ (CspKind::Azure | CspKind::Gcp | CspKind::Ncp) => {
            Box::new(PendingProvider::new(kind, customer))
        }
    }
}

pub fn build_all(customers: &[Customer]) -> Vec<Box<dyn CspProvider>> {
    customers.iter().map(build).collect()
}
