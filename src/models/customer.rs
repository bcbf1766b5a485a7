// Managed customer (tenant) definitions for the collector

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CspKind {
    Aws,
    Azure,
    Gcp,
    Ncp,
    /// Synthetic provider for local testing; no cloud API is contacted.
    Mock,
}

impl CspKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CspKind::Aws => "aws",
            CspKind::Azure => "azure",
            CspKind::Gcp => "gcp",
            CspKind::Ncp => "ncp",
            CspKind::Mock => "mock",
        }
    }
}

impl fmt::Display for CspKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One cloud resource (instance) owned by a customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub resource_id: String,
    pub instance_type: String,
    #[serde(default = "default_running")]
    pub running: bool,
}

fn default_running() -> bool {
    true
}

/// Load shape used by the mock provider. Real providers ignore it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadProfile {
    pub cpu_base: f64,
    pub cpu_amp: f64,
    pub mem_base: f64,
    pub mem_amp: f64,
    pub cost_scale: f64,
}

impl Default for LoadProfile {
    fn default() -> Self {
        Self {
            cpu_base: 35.0,
            cpu_amp: 15.0,
            mem_base: 50.0,
            mem_amp: 10.0,
            cost_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub csp: CspKind,
    #[serde(default = "default_environment")]
    pub environment: String,
    #[serde(default)]
    pub regions: Vec<String>,
    #[serde(default = "default_collect")]
    pub collect: Vec<String>,
    #[serde(default)]
    pub credentials: HashMap<String, String>,
    #[serde(default)]
    pub servers: Vec<ResourceSpec>,
    #[serde(default)]
    pub profile: LoadProfile,
    /// For `csp = "mock"`: the CSP whose `csp` label the synthetic series carry, so dashboards
    /// filtering on a real CSP pick them up.
    #[serde(default)]
    pub emulate: Option<CspKind>,
}

fn default_environment() -> String {
    "production".into()
}

fn default_collect() -> Vec<String> {
    vec!["ec2".into(), "cost".into()]
}

impl Customer {
    /// First configured region, or `"unknown"`.
    pub fn primary_region(&self) -> &str {
        self.regions.first().map(String::as_str).unwrap_or("unknown")
    }

    pub fn collects(&self, target: &str) -> bool {
        self.collect.iter().any(|c| c == target)
    }
}

#[derive(Debug, Clone, Deserialize)]
struct CustomerFile {
    #[serde(default)]
    customers: Vec<Customer>,
}

/// Read and parse a customer file.
pub fn load_customers(path: impl AsRef<std::path::Path>) -> anyhow::Result<Vec<Customer>> {
    let path = path.as_ref();
    let s = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("customers file {}: {}", path.display(), e))?;
    customers_from_str(&s)
}

/// Parse a `[[customers]]` TOML document.
pub fn customers_from_str(s: &str) -> anyhow::Result<Vec<Customer>> {
    let file: CustomerFile = toml::from_str(s)?;
    let mut seen = std::collections::HashSet::new();
    for c in &file.customers {
        anyhow::ensure!(!c.id.is_empty(), "customer id must be non-empty");
        anyhow::ensure!(seen.insert(c.id.as_str()), "duplicate customer id {:?}", c.id);
    }
    Ok(file.customers)
}

fn customer(
    id: &str,
    name: &str,
    region: &str,
    servers: &[(&str, &str)],
    profile: LoadProfile,
) -> Customer {
    Customer {
        id: id.into(),
        name: name.into(),
        csp: CspKind::Mock,
        environment: default_environment(),
        regions: vec![region.into()],
        collect: default_collect(),
        credentials: HashMap::new(),
        servers: servers
            .iter()
            .map(|(rid, itype)| ResourceSpec {
                resource_id: (*rid).into(),
                instance_type: (*itype).into(),
                running: true,
            })
            .collect(),
        profile,
        emulate: Some(CspKind::Aws),
    }
}

/// The five demo customers served when no customer file is configured. Their series are
/// labelled as AWS.
pub fn mock_customers() -> Vec<Customer> {
    let mut epsilon = customer(
        "epsilon",
        "Epsilon Ltd",
        "ap-northeast-2",
        &[
            ("web-01", "t3.medium"),
            ("web-02", "t3.medium"),
            ("db-01", "r5.large"),
        ],
        LoadProfile {
            cpu_base: 12.0,
            cpu_amp: 5.0,
            mem_base: 20.0,
            mem_amp: 5.0,
            cost_scale: 1.1,
        },
    );
    // one idle instance, so the unused-resource panels have something to show
    if let Some(last) = epsilon.servers.last_mut() {
        last.running = false;
    }

    vec![
        customer(
            "alpha",
            "Alpha Corp",
            "ap-northeast-2",
            &[
                ("web-01", "t3.medium"),
                ("web-02", "t3.medium"),
                ("db-01", "r5.large"),
            ],
            LoadProfile::default(),
        ),
        customer(
            "beta",
            "Beta Inc",
            "ap-northeast-2",
            &[("app-01", "c5.xlarge"), ("app-02", "c5.xlarge")],
            LoadProfile {
                cpu_base: 78.0,
                cpu_amp: 7.0,
                mem_base: 65.0,
                mem_amp: 10.0,
                cost_scale: 1.4,
            },
        ),
        customer(
            "gamma",
            "Gamma LLC",
            "us-east-1",
            &[
                ("web-01", "m5.xlarge"),
                ("api-01", "m5.xlarge"),
                ("db-01", "r5.2xlarge"),
                ("batch-01", "c5.2xlarge"),
            ],
            LoadProfile {
                cpu_base: 45.0,
                cpu_amp: 20.0,
                mem_base: 60.0,
                mem_amp: 15.0,
                cost_scale: 3.2,
            },
        ),
        customer(
            "delta",
            "Delta Co",
            "ap-northeast-2",
            &[("web-01", "t3.small"), ("db-01", "t3.medium")],
            LoadProfile {
                cpu_base: 25.0,
                cpu_amp: 10.0,
                mem_base: 40.0,
                mem_amp: 8.0,
                cost_scale: 0.5,
            },
        ),
        epsilon,
    ]
}
