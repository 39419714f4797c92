//! Shared application state.

use std::sync::Arc;
use std::time::Duration;

use crate::config::ApiConfig;

use notary::{
    DefaultCertifyWorkflow, DefaultLedger, DefaultVerifyWorkflow, InstrumentedLedger,
    MetricsRegistry, SharedStore, StubLedger,
};

/// Shared state held by the API handlers.
///
/// This is wrapped in an [`Arc`] and passed to request handlers via Axum's
/// `State` extractor. Both workflows share the same certificate store.
pub struct AppState {
    /// Write path: fingerprint, check, attest, persist.
    pub certify: DefaultCertifyWorkflow,
    /// Read path: fingerprint or hash, then look up.
    pub verify: DefaultVerifyWorkflow,
    /// Metrics registry shared with the ledger decorator.
    pub metrics: Arc<MetricsRegistry>,
    /// Upper bound on a single workflow call.
    pub request_timeout: Duration,
    /// Upload cap, reported back in 413 responses.
    pub max_upload_bytes: usize,
}

impl AppState {
    /// Wires both workflows over `store`, using the stub ledger.
    pub fn new(store: SharedStore, metrics: Arc<MetricsRegistry>, api: &ApiConfig) -> Self {
        let ledger: DefaultLedger =
            InstrumentedLedger::new(StubLedger::new(), metrics.notary.clone());

        Self {
            certify: DefaultCertifyWorkflow::new(store.clone(), ledger),
            verify: DefaultVerifyWorkflow::new(store),
            metrics,
            request_timeout: api.request_timeout,
            max_upload_bytes: api.max_upload_bytes,
        }
    }
}

/// Thread-safe alias for `AppState`.
pub type SharedState = Arc<AppState>;
