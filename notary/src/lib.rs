//! Notary library crate.
//!
//! This crate provides the building blocks for a content-integrity
//! certification service:
//!
//! - strongly-typed domain types (`types`),
//! - deterministic content fingerprinting (`fingerprint`),
//! - the certification and verification workflows plus the ports they
//!   consume (`workflow`),
//! - certificate store backends (`storage`),
//! - attestation ledger implementations (`attestation`),
//! - Prometheus-based metrics (`metrics`),
//! - and a top-level configuration (`config`).
//!
//! Transport layers (e.g. the `api-gateway` binary) compose these pieces
//! and own request parsing, response encoding and timeouts.

pub mod attestation;
pub mod config;
pub mod fingerprint;
pub mod metrics;
pub mod storage;
pub mod types;
pub mod workflow;

// Re-export top-level configuration types.
pub use config::{ConfigError, MetricsConfig, NotaryConfig, StorageConfig};

// Re-export the workflows and their ports.
pub use workflow::{
    AttestationError, AttestationPort, CancellationFlag, CertificateStore, CertifyWorkflow,
    StoreError, VerifyQuery, VerifyWorkflow, WorkflowError,
};

// Re-export fingerprinting.
pub use fingerprint::{FingerprintError, fingerprint, fingerprint_bytes};

// Re-export storage backends.
pub use storage::{InMemoryCertificateStore, RocksDbCertificateStore, RocksDbConfig, open_store};

// Re-export ledger implementations.
pub use attestation::{InstrumentedLedger, StubLedger};

// Re-export metrics registry and notary metrics.
pub use metrics::{MetricsRegistry, NotaryMetrics, run_prometheus_http_server, serve_metrics};

// Re-export domain types at the crate root for convenience.
pub use types::*;

/// Type alias for the shared certificate store handle used by a deployment.
pub type SharedStore = std::sync::Arc<dyn CertificateStore>;

/// Type alias for the default ledger stack: the stub ledger with metrics.
pub type DefaultLedger = InstrumentedLedger<StubLedger>;

/// Type alias for the default certification workflow stack.
pub type DefaultCertifyWorkflow = CertifyWorkflow<SharedStore, DefaultLedger>;

/// Type alias for the default verification workflow stack.
pub type DefaultVerifyWorkflow = VerifyWorkflow<SharedStore>;
