// Unified, CSP-agnostic metric record

use std::collections::BTreeMap;

use crate::exposition::MetricLine;

/// A metric as produced by any provider. Labels are kept sorted by key so the rendered line is
/// stable regardless of insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub name: String,
    pub value: f64,
    pub labels: BTreeMap<String, String>,
    pub timestamp_ms: Option<i64>,
}

impl Metric {
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            labels: BTreeMap::new(),
            timestamp_ms: None,
        }
    }

    pub fn label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.labels.insert(key.into(), value.into());
        self
    }

    pub fn at(mut self, timestamp_ms: i64) -> Self {
        self.timestamp_ms = Some(timestamp_ms);
        self
    }

    pub fn to_line(&self) -> MetricLine {
        let mut line = MetricLine::new(&self.name, self.value);
        for (k, v) in &self.labels {
            line = line.label(k, v);
        }
        if let Some(ts) = self.timestamp_ms {
            line = line.at(ts);
        }
        line
    }

    pub fn to_prometheus_line(&self) -> String {
        self.to_line().render()
    }
}
