//! Metrics and instrumentation for the notary.
//!
//! This module defines Prometheus-compatible metrics for certification and
//! verification and exposes a small HTTP exporter that serves `/metrics` in
//! Prometheus text format.
//!
//! Typical usage:
//!
//! ```ignore
//! use std::net::SocketAddr;
//! use std::sync::Arc;
//! use notary::metrics::{MetricsRegistry, run_prometheus_http_server};
//!
//! let registry = Arc::new(MetricsRegistry::new()?);
//! let addr: SocketAddr = "127.0.0.1:9898".parse()?;
//!
//! // Spawn the HTTP exporter in the background until Ctrl-C:
//! tokio::spawn(run_prometheus_http_server(registry.clone(), addr, async {
//!     let _ = tokio::signal::ctrl_c().await;
//! }));
//!
//! // Elsewhere in the code:
//! registry.notary.certifications_total.inc();
//! ```

pub mod prometheus;

pub use self::prometheus::{
    MetricsRegistry, NotaryMetrics, run_prometheus_http_server, serve_metrics,
};
