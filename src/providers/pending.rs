// Placeholder for providers (Azure, GCP, NCP) that are selectable in config but have no backend.

use async_trait::async_trait;

use super::{CspProvider, MetricStream};
use crate::error::{Error, Result};
use crate::models::{CspKind, Customer};

pub struct PendingProvider {
    kind: CspKind,
    customer_id: String,
}

impl PendingProvider {
    pub fn new(kind: CspKind, customer: &Customer) -> Self {
        Self {
            kind,
            customer_id: customer.id.clone(),
        }
    }
}

#[async_trait]
impl CspProvider for PendingProvider {
    fn kind(&self) -> CspKind {
        self.kind
    }

    fn customer_id(&self) -> &str {
        &self.customer_id
    }

    async fn collect_metrics(&self) -> Result<MetricStream> {
        Err(Error::NotImplemented {
            provider: self.kind,
            operation: "collect_metrics",
        })
    }

    async fn collect_cost(&self) -> Result<MetricStream> {
        Err(Error::NotImplemented {
            provider: self.kind,
            operation: "collect_cost",
        })
    }

    async fn health_check(&self) -> bool {
        false
    }
}
