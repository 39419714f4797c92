//! Attestation ledger abstraction used by the certification workflow.

use std::sync::Arc;

use crate::types::{Attestation, ContentHash};

/// Errors that can occur while talking to the attestation ledger.
#[derive(Debug, thiserror::Error)]
pub enum AttestationError {
    /// Transport-level error (e.g. connection failure, timeout).
    #[error("ledger transport error: {0}")]
    Transport(String),
    /// The ledger actively refused to register this digest.
    #[error("ledger rejected registration: {0}")]
    Rejected(String),
}

/// Abstract attestation ledger.
///
/// Implementations anchor a content digest on some external, append-only
/// system and hand back a transaction reference plus the ordinal at which
/// it landed. Callers treat the ledger as untrusted and fallible.
pub trait AttestationPort: Send + Sync {
    /// Registers `hash` and returns the resulting receipt.
    fn register_hash(&self, hash: &ContentHash) -> Result<Attestation, AttestationError>;

    /// Reports whether `hash` has already been registered.
    ///
    /// Not consulted by [`crate::CertifyWorkflow`]; the certificate store
    /// is the source of truth for "already certified".
    fn is_hash_registered(&self, hash: &ContentHash) -> Result<bool, AttestationError>;
}

impl<T: AttestationPort + ?Sized> AttestationPort for Arc<T> {
    fn register_hash(&self, hash: &ContentHash) -> Result<Attestation, AttestationError> {
        (**self).register_hash(hash)
    }

    fn is_hash_registered(&self, hash: &ContentHash) -> Result<bool, AttestationError> {
        (**self).is_hash_registered(hash)
    }
}

impl<T: AttestationPort + ?Sized> AttestationPort for &T {
    fn register_hash(&self, hash: &ContentHash) -> Result<Attestation, AttestationError> {
        (**self).register_hash(hash)
    }

    fn is_hash_registered(&self, hash: &ContentHash) -> Result<bool, AttestationError> {
        (**self).is_hash_registered(hash)
    }
}
