//! Storage abstraction used by the workflows.

use std::sync::Arc;

use crate::types::{Certificate, CertificateId, ContentHash};

/// Errors surfaced by a [`CertificateStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A certificate with this content hash already exists. This is the
    /// storage-level uniqueness signal and must be distinguishable from
    /// ordinary failures.
    #[error("certificate for {0} already exists")]
    Conflict(ContentHash),
    /// The backend failed to read or write.
    #[error("storage backend failure: {0}")]
    Backend(String),
    /// A stored record could not be decoded.
    #[error("corrupted record: {0}")]
    Corrupted(String),
}

/// Abstract certificate storage used by the workflows.
///
/// Implementations can be backed by in-memory maps, RocksDB, etc. The
/// interface is intentionally small: the workflows only need to look a
/// certificate up by its content hash and to insert a new one.
///
/// Implementations must enforce uniqueness of `content_hash` on insert and
/// report a duplicate as [`StoreError::Conflict`]. The workflow's own
/// existence check is only there to avoid wasted ledger calls.
pub trait CertificateStore: Send + Sync {
    /// Persists a new certificate and returns the identifier assigned to it.
    ///
    /// Any `id` already present on `cert` is ignored.
    fn save(&self, cert: &Certificate) -> Result<CertificateId, StoreError>;

    /// Fetches the certificate issued for `hash`, if any.
    fn find_by_content_hash(&self, hash: &ContentHash) -> Result<Option<Certificate>, StoreError>;
}

impl<T: CertificateStore + ?Sized> CertificateStore for Arc<T> {
    fn save(&self, cert: &Certificate) -> Result<CertificateId, StoreError> {
        (**self).save(cert)
    }

    fn find_by_content_hash(&self, hash: &ContentHash) -> Result<Option<Certificate>, StoreError> {
        (**self).find_by_content_hash(hash)
    }
}

impl<T: CertificateStore + ?Sized> CertificateStore for &T {
    fn save(&self, cert: &Certificate) -> Result<CertificateId, StoreError> {
        (**self).save(cert)
    }

    fn find_by_content_hash(&self, hash: &ContentHash) -> Result<Option<Certificate>, StoreError> {
        (**self).find_by_content_hash(hash)
    }
}
