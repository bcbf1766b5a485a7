// AWS provider: CloudWatch metrics and Cost Explorer billing. No SDK backend is wired in yet,
// so both collection capabilities report NotImplemented and the health check is negative.

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::{CspProvider, MetricStream};
use crate::error::{Error, Result};
use crate::models::{CspKind, Customer};

pub struct AwsProvider {
    customer_id: String,
    regions: Vec<String>,
    has_credentials: bool,
}

impl AwsProvider {
    pub fn new(customer: &Customer) -> Self {
        Self {
            customer_id: customer.id.clone(),
            regions: customer.regions.clone(),
            has_credentials: !customer.credentials.is_empty(),
        }
    }
}

#[async_trait]
impl CspProvider for AwsProvider {
    fn kind(&self) -> CspKind {
        CspKind::Aws
    }

    fn customer_id(&self) -> &str {
        &self.customer_id
    }

    async fn collect_metrics(&self) -> Result<MetricStream> {
        Err(Error::NotImplemented {
            provider: CspKind::Aws,
            operation: "collect_metrics",
        })
    }

    async fn collect_cost(&self) -> Result<MetricStream> {
        Err(Error::NotImplemented {
            provider: CspKind::Aws,
            operation: "collect_cost",
        })
    }

    #[instrument(skip(self), fields(provider = "aws", customer_id = %self.customer_id))]
    async fn health_check(&self) -> bool {
        debug!(
            has_credentials = self.has_credentials,
            regions = ?self.regions,
            "caller identity check not available; reporting unhealthy"
        );
        false
    }
}
