// Shared test helpers
#![allow(dead_code)]

use async_trait::async_trait;
use msp_collector::error::{Error, Result};
use msp_collector::fleet::FleetRegistry;
use msp_collector::push::{MetricSink, PushReceipt};
use msp_collector::simulator::FleetSimulator;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::sync::{Arc, Mutex};

pub fn seeded_simulator(seed: u64) -> FleetSimulator {
    FleetSimulator::with_rng(FleetRegistry::builtin(), 15, StdRng::seed_from_u64(seed))
}

/// A parsed exposition line: name, labels in order, value, timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub name: String,
    pub labels: Vec<(String, String)>,
    pub value: f64,
    pub timestamp_ms: Option<i64>,
}

impl Parsed {
    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Parses `name{k="v",...} value[ ts]`. Label values must not contain `"` or `,`.
pub fn parse_line(line: &str) -> Parsed {
    let open = line.find('{').expect("label block");
    let close = line.find("} ").expect("end of label block");
    let name = line[..open].to_string();
    let labels = line[open + 1..close]
        .split(',')
        .filter(|kv| !kv.is_empty())
        .map(|kv| {
            let (k, v) = kv.split_once('=').expect("k=v");
            (k.to_string(), v.trim_matches('"').to_string())
        })
        .collect();
    let mut rest = line[close + 2..].split(' ');
    let value = rest.next().expect("value").parse().expect("numeric value");
    let timestamp_ms = rest.next().map(|t| t.parse().expect("numeric timestamp"));
    Parsed {
        name,
        labels,
        value,
        timestamp_ms,
    }
}

pub fn parse_payload(body: &str) -> Vec<Parsed> {
    body.lines().map(parse_line).collect()
}

/// Records every body it receives and answers 204.
#[derive(Clone, Default)]
pub struct RecordingSink {
    pub bodies: Arc<Mutex<Vec<String>>>,
}

impl RecordingSink {
    pub fn count(&self) -> usize {
        self.bodies.lock().unwrap().len()
    }
}

#[async_trait]
impl MetricSink for RecordingSink {
    async fn push(&self, body: String) -> Result<PushReceipt> {
        self.bodies.lock().unwrap().push(body);
        Ok(PushReceipt { status: 204 })
    }
}

/// Fails every push with a transport-layer error, without touching the network.
#[derive(Clone, Default)]
pub struct FailingSink {
    pub attempts: Arc<Mutex<usize>>,
}

impl FailingSink {
    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl MetricSink for FailingSink {
    async fn push(&self, _body: String) -> Result<PushReceipt> {
        *self.attempts.lock().unwrap() += 1;
        let err = reqwest::Client::new()
            .post("http://[::1")
            .build()
            .expect_err("malformed url");
        Err(Error::Transport(err))
    }
}
