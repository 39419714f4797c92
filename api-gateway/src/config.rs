//! API gateway configuration.
//!
//! Configures the HTTP listener and request limits. The notary itself
//! (storage backend, metrics exporter) is configured through
//! `notary::NotaryConfig::from_env()`.
//!
//! | variable                      | default     |
//! |-------------------------------|-------------|
//! | `SERVER_PORT`                 | `8080`      |
//! | `NOTARY_MAX_UPLOAD_BYTES`     | `104857600` |
//! | `NOTARY_REQUEST_TIMEOUT_SECS` | `30`        |

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use notary::ConfigError;
use notary::config::parse_value;

/// Default upload cap: 100 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 << 20;

/// Configuration for the API gateway HTTP server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP server to.
    pub listen_addr: SocketAddr,
    /// Maximum accepted request body size, in bytes.
    pub max_upload_bytes: usize,
    /// Upper bound on a single certification or verification call.
    pub request_timeout: Duration,
}

impl Default for ApiConfig {
    fn default() -> Self {
        // Bind to all interfaces so a container port mapping is reachable
        // from the host.
        Self {
            listen_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let mut cfg = Self::default();

        if let Some(port) = get("SERVER_PORT") {
            let port: u16 = parse_value("SERVER_PORT", &port)?;
            cfg.listen_addr.set_port(port);
        }
        if let Some(v) = get("NOTARY_MAX_UPLOAD_BYTES") {
            cfg.max_upload_bytes = parse_value("NOTARY_MAX_UPLOAD_BYTES", &v)?;
        }
        if let Some(v) = get("NOTARY_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = parse_value("NOTARY_REQUEST_TIMEOUT_SECS", &v)?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    key: "NOTARY_REQUEST_TIMEOUT_SECS",
                    value: v,
                });
            }
            cfg.request_timeout = Duration::from_secs(secs);
        }

        Ok(cfg)
    }
}
