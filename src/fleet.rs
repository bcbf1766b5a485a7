// Fleet registry (tenants, servers, roles) and the scripted scenario rules

use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

use crate::models::{Role, ServerIdentity};
use crate::signal::WaveParams;

pub const DEFAULT_ENVIRONMENT: &str = "production";

/// Built-in fleet: five tenants, fourteen servers.
const BUILTIN_SERVERS: &[(&str, &str, Role)] = &[
    ("alpha", "web-01", Role::Web),
    ("alpha", "web-02", Role::Web),
    ("alpha", "db-01", Role::Db),
    ("beta", "app-01", Role::App),
    ("beta", "app-02", Role::App),
    ("gamma", "web-01", Role::Web),
    ("gamma", "api-01", Role::Api),
    ("gamma", "db-01", Role::Db),
    ("gamma", "batch-01", Role::Batch),
    ("delta", "web-01", Role::Web),
    ("delta", "db-01", Role::Db),
    ("epsilon", "web-01", Role::Web),
    ("epsilon", "web-02", Role::Web),
    ("epsilon", "db-01", Role::Db),
];

const CPU_DEFAULT: WaveParams = WaveParams::new(35.0, 15.0, 300.0, 5.0);
const CPU_COMPUTE_BOUND: WaveParams = WaveParams::new(80.0, 10.0, 240.0, 3.0);
const MEM_DB: WaveParams = WaveParams::new(65.0, 10.0, 600.0, 3.0);
const MEM_BATCH: WaveParams = WaveParams::new(55.0, 15.0, 360.0, 4.0);
const MEM_DEFAULT: WaveParams = WaveParams::new(45.0, 12.0, 300.0, 4.0);
const FS_DISK_PRESSURE: WaveParams = WaveParams::new(90.0, 5.0, 900.0, 1.0);
const FS_DB: WaveParams = WaveParams::new(55.0, 8.0, 600.0, 2.0);
const FS_DEFAULT: WaveParams = WaveParams::new(40.0, 10.0, 300.0, 3.0);
pub const NET_RX: WaveParams = WaveParams::new(5_000_000.0, 3_000_000.0, 180.0, 500_000.0);
pub const NET_TX: WaveParams = WaveParams::new(2_000_000.0, 1_500_000.0, 200.0, 300_000.0);
/// Transmit runs this far ahead of receive so the two counters do not move in lockstep.
pub const NET_TX_PHASE_SHIFT: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
pub struct ServerRef {
    pub tenant_id: String,
    pub server_name: String,
}

/// Scripted deviations from the default load shapes.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Scenarios {
    /// Tenants whose servers all run at elevated, tightly banded CPU.
    #[serde(default)]
    pub compute_bound_tenants: Vec<String>,
    /// Servers whose root filesystem hovers near capacity.
    #[serde(default)]
    pub disk_pressure: Vec<ServerRef>,
}

impl Scenarios {
    fn builtin() -> Self {
        Self {
            compute_bound_tenants: vec!["beta".into()],
            disk_pressure: vec![ServerRef {
                tenant_id: "gamma".into(),
                server_name: "batch-01".into(),
            }],
        }
    }

    pub fn cpu(&self, server: &ServerIdentity) -> WaveParams {
        if self
            .compute_bound_tenants
            .iter()
            .any(|t| *t == server.tenant_id)
        {
            CPU_COMPUTE_BOUND
        } else {
            CPU_DEFAULT
        }
    }

    pub fn memory(&self, server: &ServerIdentity) -> WaveParams {
        match server.role {
            Role::Db => MEM_DB,
            Role::Batch => MEM_BATCH,
            _ => MEM_DEFAULT,
        }
    }

    pub fn filesystem(&self, server: &ServerIdentity) -> WaveParams {
        let pressured = self
            .disk_pressure
            .iter()
            .any(|r| r.tenant_id == server.tenant_id && r.server_name == server.server_name);
        if pressured {
            FS_DISK_PRESSURE
        } else if server.role == Role::Db {
            FS_DB
        } else {
            FS_DEFAULT
        }
    }
}

/// Read-only catalog of the simulated fleet.
#[derive(Debug, Clone, PartialEq)]
pub struct FleetRegistry {
    environment: String,
    servers: Vec<ServerIdentity>,
    scenarios: Scenarios,
}

#[derive(Debug, Deserialize)]
struct FleetFile {
    #[serde(default = "default_environment")]
    environment: String,
    #[serde(default)]
    servers: Vec<ServerIdentity>,
    #[serde(default)]
    scenarios: Scenarios,
}

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.into()
}

impl Default for FleetRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl FleetRegistry {
    pub fn builtin() -> Self {
        Self {
            environment: DEFAULT_ENVIRONMENT.into(),
            servers: BUILTIN_SERVERS
                .iter()
                .map(|(t, s, r)| ServerIdentity::new(*t, *s, *r))
                .collect(),
            scenarios: Scenarios::builtin(),
        }
    }

    pub fn new(
        environment: impl Into<String>,
        servers: Vec<ServerIdentity>,
        scenarios: Scenarios,
    ) -> anyhow::Result<Self> {
        let registry = Self {
            environment: environment.into(),
            servers,
            scenarios,
        };
        registry.validate()?;
        Ok(registry)
    }

    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("fleet file {}: {}", path.display(), e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate a fleet definition (TOML).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let file: FleetFile = toml::from_str(s)?;
        Self::new(file.environment, file.servers, file.scenarios)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.servers.is_empty(), "fleet must define at least one server");
        anyhow::ensure!(
            !self.environment.is_empty(),
            "fleet environment must be non-empty"
        );
        let mut seen = HashSet::with_capacity(self.servers.len());
        for s in &self.servers {
            anyhow::ensure!(
                !s.tenant_id.is_empty() && !s.server_name.is_empty(),
                "fleet entries need a tenant_id and server_name, got {:?}",
                s
            );
            anyhow::ensure!(
                seen.insert((s.tenant_id.as_str(), s.server_name.as_str())),
                "duplicate fleet entry {}",
                s
            );
        }
        for tenant in &self.scenarios.compute_bound_tenants {
            anyhow::ensure!(
                self.servers.iter().any(|s| s.tenant_id == *tenant),
                "scenarios.compute_bound_tenants names unknown tenant {:?}",
                tenant
            );
        }
        for r in &self.scenarios.disk_pressure {
            anyhow::ensure!(
                seen.contains(&(r.tenant_id.as_str(), r.server_name.as_str())),
                "scenarios.disk_pressure names unknown server {}:{}",
                r.tenant_id,
                r.server_name
            );
        }
        Ok(())
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn servers(&self) -> &[ServerIdentity] {
        &self.servers
    }

    pub fn scenarios(&self) -> &Scenarios {
        &self.scenarios
    }

    pub fn tenant_count(&self) -> usize {
        self.servers
            .iter()
            .map(|s| s.tenant_id.as_str())
            .collect::<HashSet<_>>()
            .len()
    }
}
