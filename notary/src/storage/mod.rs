//! Storage backends for certificates.
//!
//! This module provides concrete implementations of the
//! [`crate::workflow::store::CertificateStore`] trait, including:
//!
//! - an in-memory store ([`mem::InMemoryCertificateStore`]) suitable for tests,
//! - a RocksDB-backed store ([`rocksdb::RocksDbCertificateStore`]) for
//!   persistent deployments.

use std::sync::Arc;

use crate::config::StorageConfig;
use crate::workflow::store::{CertificateStore, StoreError};

pub mod mem;
pub mod rocksdb;

pub use mem::InMemoryCertificateStore;
pub use self::rocksdb::{RocksDbCertificateStore, RocksDbConfig};

/// Opens the store selected by `cfg` behind a shared trait object.
pub fn open_store(cfg: &StorageConfig) -> Result<Arc<dyn CertificateStore>, StoreError> {
    match cfg {
        StorageConfig::Memory => {
            tracing::warn!("using in-memory certificate store; certificates are lost on restart");
            Ok(Arc::new(InMemoryCertificateStore::new()))
        }
        StorageConfig::RocksDb(rocks) => Ok(Arc::new(RocksDbCertificateStore::open(rocks)?)),
    }
}
