//! Verification workflow.
//!
//! Answers "was this certified?" either for a digest the caller already
//! has or for re-uploaded content, which is fingerprinted first. An unknown
//! digest is a normal outcome, not an error. This path never writes.

use std::io::Read;

use crate::fingerprint::fingerprint;
use crate::types::{ContentHash, VerificationResult};

use super::cancel::CancellationFlag;
use super::error::WorkflowError;
use super::store::CertificateStore;

/// Lookup criteria for [`VerifyWorkflow::verify`].
///
/// When both are present, `content` wins and `hash` is ignored.
#[derive(Debug)]
pub struct VerifyQuery<R> {
    pub content: Option<R>,
    pub hash: Option<String>,
}

impl<R> Default for VerifyQuery<R> {
    fn default() -> Self {
        Self {
            content: None,
            hash: None,
        }
    }
}

impl<R> VerifyQuery<R> {
    pub fn by_content(content: R) -> Self {
        Self {
            content: Some(content),
            hash: None,
        }
    }
}

impl VerifyQuery<std::io::Empty> {
    /// Query by digest only. The hash is used verbatim.
    pub fn by_hash(hash: impl Into<String>) -> Self {
        Self {
            content: None,
            hash: Some(hash.into()),
        }
    }
}

/// Read-only verification over a [`CertificateStore`].
pub struct VerifyWorkflow<S> {
    store: S,
}

impl<S> VerifyWorkflow<S>
where
    S: CertificateStore,
{
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Looks up the certificate matching `query`.
    pub fn verify<R: Read>(
        &self,
        query: VerifyQuery<R>,
    ) -> Result<VerificationResult, WorkflowError> {
        self.verify_cancellable(query, &CancellationFlag::new())
    }

    pub fn verify_cancellable<R: Read>(
        &self,
        query: VerifyQuery<R>,
        cancel: &CancellationFlag,
    ) -> Result<VerificationResult, WorkflowError> {
        let hash = match (query.content, query.hash) {
            (Some(content), _) => fingerprint(content)?,
            (None, Some(hash)) if !hash.is_empty() => ContentHash::new(hash),
            _ => return Err(WorkflowError::MissingCriteria),
        };

        if cancel.is_cancelled() {
            return Err(WorkflowError::Cancelled);
        }

        let found = self
            .store
            .find_by_content_hash(&hash)
            .map_err(WorkflowError::Persistence)?;

        tracing::debug!(content_hash = %hash, certified = found.is_some(), "verification lookup");
        Ok(VerificationResult::from(found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::fingerprint_bytes;
    use crate::workflow::certify::CertifyWorkflow;
    use crate::workflow::doubles::{CountingLedger, FaultyReader, ScriptedStore};

    #[test]
    fn unknown_hash_is_not_an_error() {
        let store = ScriptedStore::default();
        let wf = VerifyWorkflow::new(&store);

        let result = wf.verify(VerifyQuery::by_hash("deadbeef")).unwrap();
        assert!(!result.certified);
        assert!(result.certificate.is_none());
    }

    #[test]
    fn missing_criteria_is_rejected() {
        let store = ScriptedStore::default();
        let wf = VerifyWorkflow::new(&store);

        let none: VerifyQuery<&[u8]> = VerifyQuery::default();
        assert!(matches!(
            wf.verify(none),
            Err(WorkflowError::MissingCriteria)
        ));

        let empty = VerifyQuery::by_hash("");
        assert!(matches!(
            wf.verify(empty),
            Err(WorkflowError::MissingCriteria)
        ));
        assert_eq!(store.lookups(), 0);
    }

    #[test]
    fn hash_and_content_queries_agree() {
        let store = ScriptedStore::default();
        let ledger = CountingLedger::default();
        CertifyWorkflow::new(&store, &ledger)
            .certify(&b"photo bytes"[..], "carol")
            .unwrap();

        let wf = VerifyWorkflow::new(&store);
        let hash = fingerprint_bytes(b"photo bytes");

        let by_hash = wf.verify(VerifyQuery::by_hash(hash.as_str())).unwrap();
        let by_content = wf.verify(VerifyQuery::by_content(&b"photo bytes"[..])).unwrap();

        assert!(by_hash.certified);
        assert_eq!(by_hash, by_content);
    }

    #[test]
    fn content_overrides_supplied_hash() {
        let store = ScriptedStore::default();
        let ledger = CountingLedger::default();
        CertifyWorkflow::new(&store, &ledger)
            .certify(&b"real"[..], "dave")
            .unwrap();

        let wf = VerifyWorkflow::new(&store);
        let query = VerifyQuery {
            content: Some(&b"real"[..]),
            hash: Some("deadbeef".to_string()),
        };
        assert!(wf.verify(query).unwrap().certified);
    }

    #[test]
    fn content_read_fault_is_reported() {
        let store = ScriptedStore::default();
        let wf = VerifyWorkflow::new(&store);

        let err = wf
            .verify(VerifyQuery::by_content(FaultyReader::after(10)))
            .unwrap_err();
        assert!(matches!(err, WorkflowError::ContentRead(_)), "got {err:?}");
        assert_eq!(store.lookups(), 0);
    }

    #[test]
    fn lookup_failure_is_persistence_error() {
        let store = ScriptedStore::failing_lookups();
        let wf = VerifyWorkflow::new(&store);

        let err = wf.verify(VerifyQuery::by_hash("deadbeef")).unwrap_err();
        assert!(matches!(err, WorkflowError::Persistence(_)), "got {err:?}");
    }

    #[test]
    fn verify_does_not_write() {
        let store = ScriptedStore::default();
        let wf = VerifyWorkflow::new(&store);

        wf.verify(VerifyQuery::by_content(&b"never certified"[..]))
            .unwrap();
        assert_eq!(store.saved(), 0);
    }

    #[test]
    fn cancelled_verification_skips_lookup() {
        let store = ScriptedStore::default();
        let wf = VerifyWorkflow::new(&store);
        let cancel = CancellationFlag::new();
        cancel.cancel();

        let err = wf
            .verify_cancellable(VerifyQuery::by_hash("deadbeef"), &cancel)
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Cancelled));
        assert_eq!(store.lookups(), 0);
    }
}
