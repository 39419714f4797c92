//! RocksDB-backed certificate store.
//!
//! This implementation persists certificates and id allocation metadata in
//! a RocksDB instance with dedicated column families:
//!
//! - `"certificates"`: maps the content hash (UTF-8 bytes) -> encoded record,
//! - `"meta"`:         stores the last assigned id under a fixed key `"last_id"`.
//!
//! Inserts take a per-store write lock around the existence check, id
//! allocation and write, and commit the record together with the new
//! `last_id` in one `WriteBatch`. That is what enforces one certificate per
//! content hash; readers never take the lock.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options, WriteBatch};
use serde::{Deserialize, Serialize};

use crate::types::{Certificate, CertificateId, ContentHash, TxHash};
use crate::workflow::store::{CertificateStore, StoreError};

const CF_CERTIFICATES: &str = "certificates";
const CF_META: &str = "meta";
const KEY_LAST_ID: &[u8] = b"last_id";

/// Configuration for [`RocksDbCertificateStore`].
#[derive(Clone, Debug)]
pub struct RocksDbConfig {
    /// Filesystem path to the RocksDB database directory.
    pub path: String,
    /// Whether to create the database and missing column families if they
    /// do not yet exist.
    pub create_if_missing: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "data/notary-db".to_string(),
            create_if_missing: true,
        }
    }
}

impl From<rocksdb::Error> for StoreError {
    fn from(e: rocksdb::Error) -> Self {
        StoreError::Backend(e.to_string())
    }
}

/// On-disk representation of a certificate.
///
/// Kept separate from [`Certificate`] so the storage encoding does not move
/// when the domain type gains fields or changes its serde attributes.
#[derive(Debug, Serialize, Deserialize)]
struct StoredCertificate {
    id: u64,
    content_hash: String,
    registrant: String,
    tx_hash: String,
    block_number: u64,
    created_at_micros: i64,
}

impl StoredCertificate {
    fn from_domain(id: CertificateId, cert: &Certificate) -> Self {
        Self {
            id: id.0,
            content_hash: cert.content_hash.as_str().to_string(),
            registrant: cert.registrant.clone(),
            tx_hash: cert.tx_hash.as_str().to_string(),
            block_number: cert.block_number,
            created_at_micros: cert.created_at.timestamp_micros(),
        }
    }

    fn into_domain(self) -> Result<Certificate, StoreError> {
        let created_at = DateTime::<Utc>::from_timestamp_micros(self.created_at_micros)
            .ok_or_else(|| {
                StoreError::Corrupted(format!(
                    "created_at out of range for {}: {}",
                    self.content_hash, self.created_at_micros
                ))
            })?;

        Ok(Certificate {
            id: Some(CertificateId(self.id)),
            content_hash: ContentHash::new(self.content_hash),
            registrant: self.registrant,
            tx_hash: TxHash::new(self.tx_hash),
            block_number: self.block_number,
            created_at,
        })
    }
}

/// RocksDB-backed implementation of [`CertificateStore`].
pub struct RocksDbCertificateStore {
    db: DB,
    write_lock: Mutex<()>,
}

impl RocksDbCertificateStore {
    /// Opens (or creates) a RocksDB-backed certificate store at the given path.
    ///
    /// This sets up the `"certificates"` and `"meta"` column families. The
    /// `"default"` column family is also created to keep RocksDB happy,
    /// but it is not currently used.
    pub fn open(cfg: &RocksDbConfig) -> Result<Self, StoreError> {
        let path = Path::new(&cfg.path);

        let mut opts = Options::default();
        opts.create_if_missing(cfg.create_if_missing);
        opts.create_missing_column_families(cfg.create_if_missing);

        let cfs = vec![
            ColumnFamilyDescriptor::new("default", Options::default()),
            ColumnFamilyDescriptor::new(CF_CERTIFICATES, Options::default()),
            ColumnFamilyDescriptor::new(CF_META, Options::default()),
        ];

        let db = DB::open_cf_descriptors(&opts, path, cfs)?;
        tracing::info!(path = %cfg.path, "opened certificate store");

        Ok(Self {
            db,
            write_lock: Mutex::new(()),
        })
    }

    fn cf_certificates(&self) -> Result<&ColumnFamily, StoreError> {
        self.db
            .cf_handle(CF_CERTIFICATES)
            .ok_or_else(|| StoreError::Backend(format!("missing column family {CF_CERTIFICATES}")))
    }

    fn cf_meta(&self) -> Result<&ColumnFamily, StoreError> {
        self.db
            .cf_handle(CF_META)
            .ok_or_else(|| StoreError::Backend(format!("missing column family {CF_META}")))
    }

    fn lock_writes(&self) -> Result<MutexGuard<'_, ()>, StoreError> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Backend("certificate store write lock poisoned".to_string()))
    }

    fn encode(record: &StoredCertificate) -> Result<Vec<u8>, StoreError> {
        bincode::serde::encode_to_vec(record, bincode::config::standard())
            .map_err(|e| StoreError::Backend(format!("encoding certificate: {e}")))
    }

    fn decode(bytes: &[u8]) -> Result<StoredCertificate, StoreError> {
        let (record, _): (StoredCertificate, usize) =
            bincode::serde::decode_from_slice(bytes, bincode::config::standard())
                .map_err(|e| StoreError::Corrupted(format!("decoding certificate: {e}")))?;
        Ok(record)
    }

    /// Loads the last assigned id from the meta column family (0 if none).
    fn load_last_id(&self) -> Result<u64, StoreError> {
        match self.db.get_cf(self.cf_meta()?, KEY_LAST_ID)? {
            None => Ok(0),
            Some(bytes) => {
                let arr: [u8; 8] = bytes
                    .as_slice()
                    .try_into()
                    .map_err(|_| StoreError::Corrupted("last_id length".to_string()))?;
                Ok(u64::from_be_bytes(arr))
            }
        }
    }
}

impl CertificateStore for RocksDbCertificateStore {
    fn save(&self, cert: &Certificate) -> Result<CertificateId, StoreError> {
        let _guard = self.lock_writes()?;
        let cf_certs = self.cf_certificates()?;
        let key = cert.content_hash.as_bytes();

        if self.db.get_pinned_cf(cf_certs, key)?.is_some() {
            return Err(StoreError::Conflict(cert.content_hash.clone()));
        }

        let id = CertificateId(self.load_last_id()? + 1);
        let bytes = Self::encode(&StoredCertificate::from_domain(id, cert))?;

        let mut batch = WriteBatch::default();
        batch.put_cf(cf_certs, key, bytes);
        batch.put_cf(self.cf_meta()?, KEY_LAST_ID, id.0.to_be_bytes());
        self.db.write(batch)?;

        Ok(id)
    }

    fn find_by_content_hash(&self, hash: &ContentHash) -> Result<Option<Certificate>, StoreError> {
        match self.db.get_cf(self.cf_certificates()?, hash.as_bytes())? {
            None => Ok(None),
            Some(bytes) => Self::decode(&bytes)?.into_domain().map(Some),
        }
    }
}
