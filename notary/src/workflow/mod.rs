//! Certification and verification workflows.
//!
//! This module provides the orchestration layer consisting of:
//!
//! - the ports the workflows consume ([`store::CertificateStore`],
//!   [`attestation::AttestationPort`]),
//! - the write path ([`certify::CertifyWorkflow`]),
//! - the read path ([`verify::VerifyWorkflow`]),
//! - a shared error taxonomy ([`error::WorkflowError`]) and cooperative
//!   cancellation ([`cancel::CancellationFlag`]).

pub mod attestation;
pub mod cancel;
pub mod certify;
pub mod error;
pub mod store;
pub mod verify;

#[cfg(test)]
pub(crate) mod doubles;

pub use attestation::{AttestationError, AttestationPort};
pub use cancel::CancellationFlag;
pub use certify::CertifyWorkflow;
pub use error::WorkflowError;
pub use store::{CertificateStore, StoreError};
pub use verify::{VerifyQuery, VerifyWorkflow};

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::doubles::CountingLedger;
    use super::*;
    use crate::storage::InMemoryCertificateStore;

    const HELLO_WORLD_SHA256: &str =
        "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9";

    #[test]
    fn certify_then_verify_hello_world() {
        let store = Arc::new(InMemoryCertificateStore::new());
        let ledger = Arc::new(CountingLedger::default());
        let certify = CertifyWorkflow::new(store.clone(), ledger.clone());
        let verify = VerifyWorkflow::new(store.clone());

        let before = Utc::now();
        let cert = certify
            .certify(&b"hello world"[..], "alice")
            .expect("first certification succeeds");
        let after = Utc::now();

        assert_eq!(cert.content_hash.as_str(), HELLO_WORLD_SHA256);
        assert_eq!(cert.registrant, "alice");
        assert!(!cert.tx_hash.is_empty());
        assert!(cert.created_at >= before && cert.created_at <= after);

        let again = certify.certify(&b"hello world"[..], "alice").unwrap_err();
        assert!(matches!(again, WorkflowError::AlreadyCertified { .. }));
        assert_eq!(store.len(), 1);
        assert_eq!(ledger.register_calls(), 1);

        let hit = verify.verify(VerifyQuery::by_hash(HELLO_WORLD_SHA256)).unwrap();
        assert!(hit.certified);
        assert_eq!(hit.certificate.as_ref(), Some(&cert));

        let miss = verify.verify(VerifyQuery::by_hash("deadbeef")).unwrap();
        assert!(!miss.certified);
        assert!(miss.certificate.is_none());

        // The auxiliary ledger lookup is never part of the decision path.
        assert_eq!(ledger.lookup_calls(), 0);
    }

    #[test]
    fn concurrent_certifications_of_same_content_yield_one_certificate() {
        let store = Arc::new(InMemoryCertificateStore::new());
        let ledger = Arc::new(CountingLedger::default());
        let certify = Arc::new(CertifyWorkflow::new(store.clone(), ledger.clone()));

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let certify = certify.clone();
                std::thread::spawn(move || certify.certify(&b"contended upload"[..], &format!("r{i}")))
            })
            .collect();

        let results: Vec<_> = handles
            .into_iter()
            .map(|h| h.join().expect("worker thread panicked"))
            .collect();

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        for err in results.iter().filter_map(|r| r.as_ref().err()) {
            assert!(
                matches!(err, WorkflowError::AlreadyCertified { .. }),
                "unexpected error: {err:?}"
            );
        }
        assert_eq!(store.len(), 1);
        assert!(ledger.register_calls() >= 1);
    }
}
