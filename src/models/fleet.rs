// Server identity and role capacity models

use serde::{Deserialize, Serialize};
use std::fmt;

const GIB: u64 = 1024 * 1024 * 1024;

/// Server archetype. Determines the capacity profile of every server carrying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Web,
    Db,
    App,
    Api,
    Batch,
}

impl Role {
    pub const ALL: [Role; 5] = [Role::Web, Role::Db, Role::App, Role::Api, Role::Batch];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Web => "web",
            Role::Db => "db",
            Role::App => "app",
            Role::Api => "api",
            Role::Batch => "batch",
        }
    }

    /// Capacity shared (read-only) by all servers of this role.
    pub const fn profile(self) -> RoleProfile {
        match self {
            Role::Web | Role::App | Role::Api => RoleProfile {
                memory_bytes: 8 * GIB,
                disk_bytes: 50 * GIB,
                core_count: 4,
            },
            Role::Db => RoleProfile {
                memory_bytes: 16 * GIB,
                disk_bytes: 200 * GIB,
                core_count: 8,
            },
            Role::Batch => RoleProfile {
                memory_bytes: 32 * GIB,
                disk_bytes: 500 * GIB,
                core_count: 8,
            },
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleProfile {
    pub memory_bytes: u64,
    pub disk_bytes: u64,
    pub core_count: u32,
}

/// One simulated server. Unique within a fleet by `(tenant_id, server_name)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ServerIdentity {
    pub tenant_id: String,
    pub server_name: String,
    pub role: Role,
}

impl ServerIdentity {
    pub fn new(tenant_id: impl Into<String>, server_name: impl Into<String>, role: Role) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            server_name: server_name.into(),
            role,
        }
    }

    pub fn profile(&self) -> RoleProfile {
        self.role.profile()
    }
}

impl fmt::Display for ServerIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tenant_id, self.server_name)
    }
}
