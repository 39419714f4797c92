//! Stand-in attestation ledger.
//!
//! `StubLedger` never leaves the process. It derives a deterministic
//! transaction reference from the content hash,
//!
//! ```text
//! tx_hash = "0x" + left_zero_pad_64(first 16 hex chars of the hash)
//! ```
//!
//! and hands out increasing block numbers, one per registration. It keeps
//! a registration count per hash so [`AttestationPort::is_hash_registered`]
//! answers from what it has actually seen.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::types::{Attestation, ContentHash, TxHash};
use crate::workflow::attestation::{AttestationError, AttestationPort};

/// Number of leading hash characters folded into the stub transaction id.
const TX_PREFIX_LEN: usize = 16;

#[derive(Default)]
struct LedgerState {
    height: u64,
    registrations: HashMap<ContentHash, usize>,
}

/// In-process ledger stub implementing [`AttestationPort`].
#[derive(Default)]
pub struct StubLedger {
    state: Mutex<LedgerState>,
}

impl StubLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current block height (number of registrations so far).
    #[cfg(test)]
    pub fn height(&self) -> u64 {
        self.lock().map(|s| s.height).unwrap_or(0)
    }

    /// Number of times `hash` has been registered.
    #[cfg(test)]
    pub fn registrations_of(&self, hash: &ContentHash) -> usize {
        self.lock()
            .map(|s| s.registrations.get(hash).copied().unwrap_or(0))
            .unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, LedgerState>, AttestationError> {
        self.state
            .lock()
            .map_err(|_| AttestationError::Transport("stub ledger lock poisoned".to_string()))
    }
}

fn stub_tx_hash(hash: &ContentHash) -> Result<TxHash, AttestationError> {
    let prefix = hash.as_str().get(..TX_PREFIX_LEN).ok_or_else(|| {
        AttestationError::Rejected(format!(
            "hash {hash} shorter than {TX_PREFIX_LEN} characters"
        ))
    })?;
    Ok(TxHash::new(format!("0x{prefix:0>64}")))
}

impl AttestationPort for StubLedger {
    fn register_hash(&self, hash: &ContentHash) -> Result<Attestation, AttestationError> {
        let tx_hash = stub_tx_hash(hash)?;

        let mut state = self.lock()?;
        state.height += 1;
        let attestation = Attestation {
            tx_hash,
            block_number: state.height,
        };
        *state.registrations.entry(hash.clone()).or_default() += 1;

        tracing::debug!(
            content_hash = %hash,
            tx_hash = %attestation.tx_hash,
            block_number = attestation.block_number,
            "stub ledger registered hash"
        );
        Ok(attestation)
    }

    fn is_hash_registered(&self, hash: &ContentHash) -> Result<bool, AttestationError> {
        let registered = self.lock()?.registrations.contains_key(hash);
        tracing::debug!(content_hash = %hash, registered, "stub ledger lookup");
        Ok(registered)
    }
}
