// Fleet registry, role profiles and scenario rule tests

use msp_collector::fleet::{FleetRegistry, Scenarios};
use msp_collector::models::{Role, ServerIdentity};
use std::collections::HashSet;

const GIB: u64 = 1024 * 1024 * 1024;

const CUSTOM_FLEET: &str = r#"
environment = "staging"

[[servers]]
tenant_id = "acme"
server_name = "web-01"
role = "web"

[[servers]]
tenant_id = "acme"
server_name = "etl-01"
role = "batch"

[scenarios]
compute_bound_tenants = ["acme"]

[[scenarios.disk_pressure]]
tenant_id = "acme"
server_name = "etl-01"
"#;

#[test]
fn test_builtin_fleet_has_fourteen_unique_servers() {
    let fleet = FleetRegistry::builtin();
    assert_eq!(fleet.servers().len(), 14);
    assert_eq!(fleet.tenant_count(), 5);
    assert_eq!(fleet.environment(), "production");
    let keys: HashSet<_> = fleet
        .servers()
        .iter()
        .map(|s| (s.tenant_id.as_str(), s.server_name.as_str()))
        .collect();
    assert_eq!(keys.len(), 14);
}

#[test]
fn test_role_profiles() {
    assert_eq!(Role::Web.profile().memory_bytes, 8 * GIB);
    assert_eq!(Role::Db.profile().disk_bytes, 200 * GIB);
    assert_eq!(Role::Db.profile().core_count, 8);
    assert_eq!(Role::Batch.profile().memory_bytes, 32 * GIB);
    assert_eq!(Role::Batch.profile().disk_bytes, 500 * GIB);
    assert_eq!(Role::Api.profile(), Role::App.profile());
}

#[test]
fn test_compute_bound_tenant_gets_elevated_cpu_band() {
    let fleet = FleetRegistry::builtin();
    let scenarios = fleet.scenarios();
    let beta = ServerIdentity::new("beta", "app-01", Role::App);
    let alpha = ServerIdentity::new("alpha", "web-01", Role::Web);
    let (beta_lo, _) = scenarios.cpu(&beta).range();
    let (_, alpha_hi) = scenarios.cpu(&alpha).range();
    assert!(beta_lo >= 65.0, "compute-bound floor {beta_lo}");
    assert!(scenarios.cpu(&beta).amplitude < scenarios.cpu(&alpha).amplitude);
    assert!(alpha_hi <= 55.0);
}

#[test]
fn test_disk_pressure_server_runs_near_capacity() {
    let fleet = FleetRegistry::builtin();
    let scenarios = fleet.scenarios();
    let batch = ServerIdentity::new("gamma", "batch-01", Role::Batch);
    let other_batch = ServerIdentity::new("delta", "batch-01", Role::Batch);
    let fs = scenarios.filesystem(&batch);
    assert_eq!(fs.base, 90.0);
    assert!(fs.range().0 >= 84.0);
    assert_eq!(scenarios.filesystem(&other_batch).base, 40.0);
}

#[test]
fn test_memory_shape_depends_on_role() {
    let scenarios = Scenarios::default();
    let db = ServerIdentity::new("x", "db", Role::Db);
    let batch = ServerIdentity::new("x", "batch", Role::Batch);
    let web = ServerIdentity::new("x", "web", Role::Web);
    assert_eq!(scenarios.memory(&db).base, 65.0);
    assert_eq!(scenarios.memory(&batch).base, 55.0);
    assert_eq!(scenarios.memory(&web).base, 45.0);
    assert_eq!(scenarios.filesystem(&db).base, 55.0);
}

#[test]
fn test_fleet_loads_from_toml() {
    let fleet = FleetRegistry::load_from_str(CUSTOM_FLEET).expect("valid fleet");
    assert_eq!(fleet.environment(), "staging");
    assert_eq!(fleet.servers().len(), 2);
    assert_eq!(fleet.servers()[1].role, Role::Batch);
    let etl = &fleet.servers()[1];
    assert_eq!(fleet.scenarios().filesystem(etl).base, 90.0);
    assert_eq!(fleet.scenarios().cpu(etl).base, 80.0);
}

#[test]
fn test_fleet_load_from_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("fleet.toml");
    std::fs::write(&path, CUSTOM_FLEET).unwrap();
    let fleet = FleetRegistry::load(&path).expect("load from file");
    assert_eq!(fleet.tenant_count(), 1);
}

#[test]
fn test_fleet_missing_file_names_path() {
    let err = FleetRegistry::load("/definitely/not/here.toml").unwrap_err();
    assert!(err.to_string().contains("/definitely/not/here.toml"));
}

#[test]
fn test_fleet_rejects_duplicate_servers() {
    let dup = r#"
[[servers]]
tenant_id = "acme"
server_name = "web-01"
role = "web"

[[servers]]
tenant_id = "acme"
server_name = "web-01"
role = "db"
"#;
    let err = FleetRegistry::load_from_str(dup).unwrap_err();
    assert!(err.to_string().contains("duplicate"));
}

#[test]
fn test_fleet_rejects_empty_server_list() {
    let err = FleetRegistry::load_from_str("environment = \"prod\"\n").unwrap_err();
    assert!(err.to_string().contains("at least one server"));
}

#[test]
fn test_fleet_rejects_unknown_role() {
    let bad = r#"
[[servers]]
tenant_id = "acme"
server_name = "gpu-01"
role = "gpu"
"#;
    assert!(FleetRegistry::load_from_str(bad).is_err());
}

#[test]
fn test_fleet_rejects_scenario_for_unknown_tenant() {
    let bad = CUSTOM_FLEET.replace(
        "compute_bound_tenants = [\"acme\"]",
        "compute_bound_tenants = [\"initech\"]",
    );
    let err = FleetRegistry::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("initech"));
}

#[test]
fn test_fleet_rejects_disk_pressure_on_unknown_server() {
    let bad = r#"
[[servers]]
tenant_id = "acme"
server_name = "etl-01"
role = "batch"

[[scenarios.disk_pressure]]
tenant_id = "acme"
server_name = "etl-09"
"#;
    let err = FleetRegistry::load_from_str(bad).unwrap_err();
    assert!(err.to_string().contains("acme:etl-09"));
}

#[test]
fn test_builtin_scenarios_pass_validation() {
    let fleet = FleetRegistry::builtin();
    let rebuilt = FleetRegistry::new(
        fleet.environment(),
        fleet.servers().to_vec(),
        fleet.scenarios().clone(),
    )
    .expect("built-in fleet is valid");
    assert_eq!(rebuilt, fleet);
}
