//! Certification workflow.
//!
//! The workflow wires together:
//!
//! - the content [`fingerprint`],
//! - a [`CertificateStore`] for the existence check and the final insert,
//! - an [`AttestationPort`] that anchors the fingerprint on a ledger.
//!
//! The existence check runs before the ledger call so that re-uploads of
//! already certified content never burn an attestation. Two concurrent
//! certifications of the same new content can both pass that check; the
//! store's uniqueness constraint decides the winner and the loser gets the
//! same [`WorkflowError::AlreadyCertified`] as the pre-check path.

use std::io::Read;

use chrono::Utc;

use crate::fingerprint::fingerprint;
use crate::types::Certificate;

use super::attestation::AttestationPort;
use super::cancel::CancellationFlag;
use super::error::WorkflowError;
use super::store::{CertificateStore, StoreError};

/// Issues certificates for previously unseen content.
///
/// This struct is generic over:
///
/// - `S`: storage backend implementing [`CertificateStore`],
/// - `A`: ledger implementing [`AttestationPort`].
///
/// It holds no mutable state of its own and can be shared across threads.
pub struct CertifyWorkflow<S, A> {
    store: S,
    ledger: A,
}

impl<S, A> CertifyWorkflow<S, A>
where
    S: CertificateStore,
    A: AttestationPort,
{
    pub fn new(store: S, ledger: A) -> Self {
        Self { store, ledger }
    }

    /// Certifies `content` on behalf of `registrant`.
    ///
    /// On success exactly one ledger registration and one store insert have
    /// happened. If the insert fails after the ledger call succeeded, the
    /// ledger entry is left in place and the error is reported as
    /// [`WorkflowError::Persistence`]; retrying will register again.
    pub fn certify<R: Read>(
        &self,
        content: R,
        registrant: &str,
    ) -> Result<Certificate, WorkflowError> {
        self.certify_cancellable(content, registrant, &CancellationFlag::new())
    }

    /// Like [`certify`](Self::certify), but stops before the next
    /// collaborator call once `cancel` is set.
    pub fn certify_cancellable<R: Read>(
        &self,
        content: R,
        registrant: &str,
        cancel: &CancellationFlag,
    ) -> Result<Certificate, WorkflowError> {
        // 1. Fingerprint. Nothing has been touched yet if this fails.
        let content_hash = fingerprint(content)?;
        checkpoint(cancel)?;

        // 2. Existence check.
        let existing = self
            .store
            .find_by_content_hash(&content_hash)
            .map_err(WorkflowError::Persistence)?;

        // 3. Already certified: no ledger call, no write.
        if existing.is_some() {
            tracing::info!(%content_hash, "rejecting already certified content");
            return Err(WorkflowError::AlreadyCertified { content_hash });
        }
        checkpoint(cancel)?;

        // 4. Anchor on the ledger.
        let attestation = self.ledger.register_hash(&content_hash)?;

        // 5. Build the certificate; the store assigns the id.
        let cert = Certificate::issue(content_hash, registrant, attestation, Utc::now());

        // No further side effects once cancellation is observed, even though
        // the ledger entry already exists.
        if cancel.is_cancelled() {
            tracing::warn!(
                content_hash = %cert.content_hash,
                tx_hash = %cert.tx_hash,
                "certification cancelled after attestation; ledger entry has no certificate"
            );
            return Err(WorkflowError::Cancelled);
        }

        // 6. Persist.
        match self.store.save(&cert) {
            Ok(id) => {
                let cert = cert.with_id(id);
                tracing::info!(
                    id = %id,
                    content_hash = %cert.content_hash,
                    tx_hash = %cert.tx_hash,
                    block_number = cert.block_number,
                    "certificate issued"
                );
                Ok(cert)
            }
            Err(StoreError::Conflict(content_hash)) => {
                tracing::warn!(
                    %content_hash,
                    tx_hash = %cert.tx_hash,
                    "lost certification race; ledger entry has no certificate"
                );
                Err(WorkflowError::AlreadyCertified { content_hash })
            }
            Err(e) => {
                tracing::warn!(
                    content_hash = %cert.content_hash,
                    tx_hash = %cert.tx_hash,
                    error = %e,
                    "failed to persist certificate after attestation"
                );
                Err(WorkflowError::Persistence(e))
            }
        }
    }
}

fn checkpoint(cancel: &CancellationFlag) -> Result<(), WorkflowError> {
    if cancel.is_cancelled() {
        return Err(WorkflowError::Cancelled);
    }
    Ok(())
}
