//! Test doubles for the workflow ports.

use std::io::{self, Read};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::storage::InMemoryCertificateStore;
use crate::types::{Attestation, Certificate, CertificateId, ContentHash, TxHash};

use super::attestation::{AttestationError, AttestationPort};
use super::cancel::CancellationFlag;
use super::store::{CertificateStore, StoreError};

/// Reader that yields `remaining` bytes and then fails.
pub struct FaultyReader {
    remaining: usize,
}

impl FaultyReader {
    pub fn after(bytes: usize) -> Self {
        Self { remaining: bytes }
    }
}

impl Read for FaultyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "stream reset"));
        }
        let n = self.remaining.min(buf.len());
        buf[..n].fill(0xA5);
        self.remaining -= n;
        Ok(n)
    }
}

#[derive(Default)]
enum LedgerMode {
    #[default]
    Ok,
    Fail,
    CancelAfterRegister(CancellationFlag),
}

/// Ledger that counts calls and hands out `0xtest{n}` / block `n`.
#[derive(Default)]
pub struct CountingLedger {
    mode: LedgerMode,
    register_calls: AtomicUsize,
    lookup_calls: AtomicUsize,
}

impl CountingLedger {
    pub fn failing() -> Self {
        Self {
            mode: LedgerMode::Fail,
            ..Self::default()
        }
    }

    /// Succeeds, but sets `flag` as if the caller gave up mid-call.
    pub fn cancelling(flag: CancellationFlag) -> Self {
        Self {
            mode: LedgerMode::CancelAfterRegister(flag),
            ..Self::default()
        }
    }

    pub fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    pub fn lookup_calls(&self) -> usize {
        self.lookup_calls.load(Ordering::SeqCst)
    }
}

impl AttestationPort for CountingLedger {
    fn register_hash(&self, _hash: &ContentHash) -> Result<Attestation, AttestationError> {
        let n = self.register_calls.fetch_add(1, Ordering::SeqCst) + 1;
        match &self.mode {
            LedgerMode::Fail => Err(AttestationError::Transport("ledger unreachable".into())),
            LedgerMode::CancelAfterRegister(flag) => {
                flag.cancel();
                Ok(receipt(n))
            }
            LedgerMode::Ok => Ok(receipt(n)),
        }
    }

    fn is_hash_registered(&self, _hash: &ContentHash) -> Result<bool, AttestationError> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        Ok(false)
    }
}

fn receipt(n: usize) -> Attestation {
    Attestation {
        tx_hash: TxHash::new(format!("0xtest{n}")),
        block_number: n as u64,
    }
}

#[derive(Default, Clone, Copy)]
enum StoreMode {
    #[default]
    Ok,
    FailLookups,
    FailSaves,
    /// Lookups report "absent" but saves conflict, as when another request
    /// inserts between the check and the write.
    Racing,
}

/// In-memory store with scripted failures and call counters.
#[derive(Default)]
pub struct ScriptedStore {
    mode: StoreMode,
    inner: InMemoryCertificateStore,
    lookups: AtomicUsize,
    saved: AtomicUsize,
}

impl ScriptedStore {
    pub fn failing_lookups() -> Self {
        Self {
            mode: StoreMode::FailLookups,
            ..Self::default()
        }
    }

    pub fn failing_saves() -> Self {
        Self {
            mode: StoreMode::FailSaves,
            ..Self::default()
        }
    }

    pub fn racing() -> Self {
        Self {
            mode: StoreMode::Racing,
            ..Self::default()
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    /// Number of certificates successfully persisted.
    pub fn saved(&self) -> usize {
        self.saved.load(Ordering::SeqCst)
    }
}

impl CertificateStore for ScriptedStore {
    fn save(&self, cert: &Certificate) -> Result<CertificateId, StoreError> {
        match self.mode {
            StoreMode::FailSaves => Err(StoreError::Backend("write timed out".into())),
            StoreMode::Racing => Err(StoreError::Conflict(cert.content_hash.clone())),
            StoreMode::Ok | StoreMode::FailLookups => {
                let id = self.inner.save(cert)?;
                self.saved.fetch_add(1, Ordering::SeqCst);
                Ok(id)
            }
        }
    }

    fn find_by_content_hash(&self, hash: &ContentHash) -> Result<Option<Certificate>, StoreError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        match self.mode {
            StoreMode::FailLookups => Err(StoreError::Backend("connection refused".into())),
            StoreMode::Racing => Ok(None),
            StoreMode::Ok | StoreMode::FailSaves => self.inner.find_by_content_hash(hash),
        }
    }
}
