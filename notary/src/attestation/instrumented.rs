//! Metrics decorator for attestation ledgers.

use std::time::Instant;

use crate::metrics::NotaryMetrics;
use crate::types::{Attestation, ContentHash};
use crate::workflow::attestation::{AttestationError, AttestationPort};

/// Wraps any [`AttestationPort`] and records registration latency and
/// failures into [`NotaryMetrics`].
pub struct InstrumentedLedger<A> {
    inner: A,
    metrics: NotaryMetrics,
}

impl<A> InstrumentedLedger<A> {
    pub fn new(inner: A, metrics: NotaryMetrics) -> Self {
        Self { inner, metrics }
    }

    #[cfg(test)]
    pub fn inner(&self) -> &A {
        &self.inner
    }
}

impl<A: AttestationPort> AttestationPort for InstrumentedLedger<A> {
    fn register_hash(&self, hash: &ContentHash) -> Result<Attestation, AttestationError> {
        let start = Instant::now();
        let result = self.inner.register_hash(hash);
        self.metrics
            .attestation_seconds
            .observe(start.elapsed().as_secs_f64());

        if let Err(e) = &result {
            self.metrics.attestation_failures.inc();
            tracing::warn!(content_hash = %hash, error = %e, "attestation registration failed");
        }
        result
    }

    fn is_hash_registered(&self, hash: &ContentHash) -> Result<bool, AttestationError> {
        self.inner.is_hash_registered(hash)
    }
}
