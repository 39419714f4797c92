//! Top-level configuration for the notary.
//!
//! This module aggregates configuration for:
//!
//! - the certificate store backend (in-memory or RocksDB),
//! - the metrics exporter (enable flag + listen address).
//!
//! Every struct has a `Default`, and [`NotaryConfig::from_env`] overlays
//! environment variables on top of those defaults:
//!
//! | variable                 | default          |
//! |--------------------------|------------------|
//! | `NOTARY_STORAGE_BACKEND` | `rocksdb`        |
//! | `NOTARY_DB_PATH`         | `data/notary-db` |
//! | `NOTARY_METRICS_ENABLED` | `true`           |
//! | `NOTARY_METRICS_ADDR`    | `127.0.0.1:9898` |

use std::net::SocketAddr;
use std::str::FromStr;

use crate::storage::RocksDbConfig;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Which certificate store to run against.
#[derive(Clone, Debug)]
pub enum StorageConfig {
    /// Non-durable store, lost on restart.
    Memory,
    /// Embedded RocksDB database.
    RocksDb(RocksDbConfig),
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig::RocksDb(RocksDbConfig::default())
    }
}

/// Configuration for the Prometheus metrics exporter.
#[derive(Clone, Debug)]
pub struct MetricsConfig {
    /// Whether to run a `/metrics` HTTP exporter.
    pub enabled: bool,
    /// Address to bind the metrics HTTP server to.
    pub listen_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        // Safe to unwrap: this is a fixed, valid address literal.
        let addr: SocketAddr = "127.0.0.1:9898"
            .parse()
            .expect("hard-coded metrics listen address should parse");
        Self {
            enabled: true,
            listen_addr: addr,
        }
    }
}

/// Top-level configuration for a notary deployment.
#[derive(Clone, Debug, Default)]
pub struct NotaryConfig {
    pub storage: StorageConfig,
    pub metrics: MetricsConfig,
}

impl NotaryConfig {
    /// Builds a configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup. Missing or
    /// empty keys fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let mut cfg = Self::default();

        let mut rocks = RocksDbConfig::default();
        if let Some(path) = get("NOTARY_DB_PATH") {
            rocks.path = path;
        }

        cfg.storage = match get("NOTARY_STORAGE_BACKEND").as_deref() {
            None | Some("rocksdb") => StorageConfig::RocksDb(rocks),
            Some("memory") => StorageConfig::Memory,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    key: "NOTARY_STORAGE_BACKEND",
                    value: other.to_string(),
                });
            }
        };

        if let Some(v) = get("NOTARY_METRICS_ENABLED") {
            cfg.metrics.enabled = parse_bool("NOTARY_METRICS_ENABLED", &v)?;
        }
        if let Some(v) = get("NOTARY_METRICS_ADDR") {
            cfg.metrics.listen_addr = parse_value("NOTARY_METRICS_ADDR", &v)?;
        }

        Ok(cfg)
    }
}

/// Parses a typed value, reporting the offending key on failure.
pub fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::Invalid {
        key,
        value: value.to_string(),
    })
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
        }),
    }
}
