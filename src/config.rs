// Environment-sourced configuration for the simulator and the collector

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_VM_URL: &str = "http://victoriametrics:8428";

#[derive(Debug, Clone, PartialEq)]
pub struct SimulatorConfig {
    /// Ingestion endpoint base URL, without a trailing slash.
    pub vm_url: String,
    pub push_interval_secs: u64,
    /// Upper bound on one push request.
    pub push_timeout_secs: u64,
    /// Optional TOML fleet definition replacing the built-in registry.
    pub fleet_file: Option<PathBuf>,
}

impl SimulatorConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup (e.g. a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let config = Self {
            vm_url: string_or(&lookup, "VM_URL", DEFAULT_VM_URL),
            push_interval_secs: parse_or(&lookup, "PUSH_INTERVAL", 15)?,
            push_timeout_secs: parse_or(&lookup, "PUSH_TIMEOUT", 10)?,
            fleet_file: lookup("FLEET_FILE")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(!self.vm_url.is_empty(), "VM_URL must be non-empty");
        anyhow::ensure!(
            self.vm_url.starts_with("http://") || self.vm_url.starts_with("https://"),
            "VM_URL must be an http(s) URL, got {:?}",
            self.vm_url
        );
        anyhow::ensure!(
            self.push_interval_secs > 0,
            "PUSH_INTERVAL must be > 0, got {}",
            self.push_interval_secs
        );
        anyhow::ensure!(
            self.push_timeout_secs > 0,
            "PUSH_TIMEOUT must be > 0, got {}",
            self.push_timeout_secs
        );
        Ok(())
    }

    pub fn push_interval(&self) -> Duration {
        Duration::from_secs(self.push_interval_secs)
    }

    pub fn push_timeout(&self) -> Duration {
        Duration::from_secs(self.push_timeout_secs)
    }
}

const LOG_LEVELS: [&str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];

#[derive(Debug, Clone, PartialEq)]
pub struct CollectorConfig {
    pub vm_url: String,
    pub collection_interval_secs: u64,
    /// Upper-case level name; used as the log filter when `RUST_LOG` is unset.
    pub log_level: String,
    pub metrics_port: u16,
    /// Optional TOML customer list; the built-in mock customers are used otherwise.
    pub customers_file: Option<PathBuf>,
}

impl CollectorConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let config = Self {
            vm_url: string_or(&lookup, "VM_URL", DEFAULT_VM_URL),
            collection_interval_secs: parse_or(&lookup, "COLLECTION_INTERVAL", 300)?,
            log_level: string_or(&lookup, "LOG_LEVEL", "INFO").to_ascii_uppercase(),
            metrics_port: parse_or(&lookup, "METRICS_PORT", 9091)?,
            customers_file: lookup("CUSTOMERS_FILE")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.collection_interval_secs > 0,
            "COLLECTION_INTERVAL must be > 0, got {}",
            self.collection_interval_secs
        );
        anyhow::ensure!(
            self.metrics_port > 0,
            "METRICS_PORT must be between 1 and 65535, got {}",
            self.metrics_port
        );
        anyhow::ensure!(
            LOG_LEVELS.contains(&self.log_level.as_str()),
            "LOG_LEVEL must be one of {:?}, got {:?}",
            LOG_LEVELS,
            self.log_level
        );
        Ok(())
    }

    pub fn collection_interval(&self) -> Duration {
        Duration::from_secs(self.collection_interval_secs)
    }

    /// `tracing` filter directive for this level, e.g. `"info"`.
    pub fn log_filter(&self) -> String {
        self.log_level.to_ascii_lowercase()
    }
}

fn string_or(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Missing or blank falls back to `default`; anything else must parse.
fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map_err(|e| anyhow::anyhow!("{key} must be a number, got {raw:?}: {e}")),
        _ => Ok(default),
    }
}
