//! In-memory certificate store.
//!
//! This implementation is useful for unit tests and throwaway deployments.
//! It keeps all certificates in a `HashMap` keyed by `ContentHash` behind a
//! single mutex, so the uniqueness check and the insert are one atomic step.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Mutex, MutexGuard};

use crate::types::{Certificate, CertificateId, ContentHash};
use crate::workflow::store::{CertificateStore, StoreError};

#[derive(Default)]
struct Inner {
    certificates: HashMap<ContentHash, Certificate>,
    last_id: u64,
}

/// In-memory implementation of [`CertificateStore`].
#[derive(Default)]
pub struct InMemoryCertificateStore {
    inner: Mutex<Inner>,
}

impl InMemoryCertificateStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of certificates currently stored.
    pub fn len(&self) -> usize {
        self.lock().map(|inner| inner.certificates.len()).unwrap_or(0)
    }

    /// Returns `true` if no certificates are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("in-memory store lock poisoned".to_string()))
    }
}

impl CertificateStore for InMemoryCertificateStore {
    fn save(&self, cert: &Certificate) -> Result<CertificateId, StoreError> {
        let mut guard = self.lock()?;
        let inner = &mut *guard;
        let id = CertificateId(inner.last_id + 1);

        match inner.certificates.entry(cert.content_hash.clone()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(cert.content_hash.clone())),
            Entry::Vacant(slot) => {
                slot.insert(cert.clone().with_id(id));
                inner.last_id = id.0;
                Ok(id)
            }
        }
    }

    fn find_by_content_hash(&self, hash: &ContentHash) -> Result<Option<Certificate>, StoreError> {
        Ok(self.lock()?.certificates.get(hash).cloned())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::types::{Attestation, TxHash};

    fn dummy_cert(hash: &str) -> Certificate {
        Certificate::issue(
            ContentHash::new(hash),
            "tester",
            Attestation {
                tx_hash: TxHash::new("0x01"),
                block_number: 1,
            },
            Utc::now(),
        )
    }

    #[test]
    fn save_and_find_roundtrip() {
        let store = InMemoryCertificateStore::new();
        let cert = dummy_cert("aa");

        let id = store.save(&cert).expect("save succeeds");
        let fetched = store
            .find_by_content_hash(&cert.content_hash)
            .unwrap()
            .expect("certificate should be present");

        assert_eq!(fetched.id, Some(id));
        assert_eq!(fetched.registrant, "tester");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn ids_are_assigned_sequentially() {
        let store = InMemoryCertificateStore::new();
        assert!(store.is_empty());

        let first = store.save(&dummy_cert("aa")).unwrap();
        let second = store.save(&dummy_cert("bb")).unwrap();
        assert_eq!(first, CertificateId(1));
        assert_eq!(second, CertificateId(2));
    }

    #[test]
    fn duplicate_hash_is_a_conflict() {
        let store = InMemoryCertificateStore::new();
        store.save(&dummy_cert("aa")).unwrap();

        let err = store.save(&dummy_cert("aa")).unwrap_err();
        assert!(matches!(err, StoreError::Conflict(ref h) if h.as_str() == "aa"));
        assert_eq!(store.len(), 1);

        // A rejected insert does not consume an id.
        assert_eq!(store.save(&dummy_cert("bb")).unwrap(), CertificateId(2));
    }

    #[test]
    fn unknown_hash_is_absent() {
        let store = InMemoryCertificateStore::new();
        let found = store
            .find_by_content_hash(&ContentHash::new("missing"))
            .unwrap();
        assert!(found.is_none());
    }
}
