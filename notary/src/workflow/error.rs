use crate::fingerprint::FingerprintError;
use crate::types::ContentHash;

use super::attestation::AttestationError;
use super::store::StoreError;

/// Errors returned by the certification and verification workflows.
///
/// Every workflow step aborts the remaining sequence on its first error;
/// nothing is retried internally.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    /// The content stream failed before it was fully read.
    #[error("content could not be read: {0}")]
    ContentRead(#[from] FingerprintError),

    /// A certificate for this content already exists.
    #[error("content already certified: {content_hash}")]
    AlreadyCertified { content_hash: ContentHash },

    /// The attestation ledger call failed. No certificate was stored.
    #[error("attestation failed: {0}")]
    Attestation(#[from] AttestationError),

    /// The certificate store failed to read or write.
    #[error("persistence failed: {0}")]
    Persistence(#[source] StoreError),

    /// Verification was requested with neither content nor a hash.
    #[error("no content or hash provided")]
    MissingCriteria,

    /// The caller cancelled the operation before it completed.
    #[error("operation cancelled")]
    Cancelled,
}

impl From<StoreError> for WorkflowError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(content_hash) => WorkflowError::AlreadyCertified { content_hash },
            other => WorkflowError::Persistence(other),
        }
    }
}
