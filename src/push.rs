// Delivery of exposition payloads to a VictoriaMetrics-compatible import endpoint

use async_trait::async_trait;
use std::time::Duration;
use tracing::instrument;

use crate::error::Result;
use crate::version;

pub const IMPORT_PATH: &str = "/api/v1/import/prometheus";

/// What the endpoint answered. Any HTTP response counts as delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushReceipt {
    pub status: u16,
}

/// Destination for one tick's payload.
#[async_trait]
pub trait MetricSink: Send + Sync {
    async fn push(&self, body: String) -> Result<PushReceipt>;
}

/// HTTP POST sink with a bounded per-request timeout.
#[derive(Debug, Clone)]
pub struct ImportClient {
    client: reqwest::Client,
    url: String,
}

impl ImportClient {
    pub fn new(endpoint_base: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(version::user_agent())
            .build()?;
        Ok(Self {
            client,
            url: import_url(endpoint_base),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// `{base}/api/v1/import/prometheus`, tolerating a trailing slash on the base.
pub fn import_url(endpoint_base: &str) -> String {
    format!("{}{}", endpoint_base.trim_end_matches('/'), IMPORT_PATH)
}

#[async_trait]
impl MetricSink for ImportClient {
    #[instrument(skip(self, body), fields(url = %self.url, bytes = body.len()))]
    async fn push(&self, body: String) -> Result<PushReceipt> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "text/plain")
            .body(body)
            .send()
            .await?;
        let status = response.status();
        // drain so the connection can be reused
        let _ = response.bytes().await?;
        Ok(PushReceipt {
            status: status.as_u16(),
        })
    }
}
