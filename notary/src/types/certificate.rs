//! Types for issued certificates.
//!
//! A [`Certificate`] ties together:
//!
//! - a content fingerprint ([`ContentHash`]),
//! - a free-form registrant label,
//! - and the attestation receipt ([`TxHash`] + block number),
//!
//! together with the UTC instant at which certification began.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CertificateId, ContentHash, TxHash};

/// Receipt returned by the attestation ledger for a registered digest.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Attestation {
    /// Transaction reference on the ledger.
    pub tx_hash: TxHash,
    /// Ordinal (block) position of the registration.
    pub block_number: u64,
}

/// Content-integrity certificate.
///
/// A `Certificate` is created exactly once per [`ContentHash`] by
/// [`crate::CertifyWorkflow`]. It is never mutated afterwards; the store
/// only fills in `id` when the record is first persisted.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    /// Identifier assigned by the store. `None` until saved.
    pub id: Option<CertificateId>,

    /// Fingerprint of the certified content. Natural unique key.
    pub content_hash: ContentHash,

    /// Caller-supplied label. May be empty and is not validated.
    pub registrant: String,

    /// Ledger transaction reference obtained at certification time.
    pub tx_hash: TxHash,

    /// Ledger ordinal obtained at certification time.
    pub block_number: u64,

    /// UTC instant at which attestation and persistence began.
    pub created_at: DateTime<Utc>,
}

impl Certificate {
    /// Builds an unsaved certificate from a fingerprint and its attestation.
    pub fn issue(
        content_hash: ContentHash,
        registrant: impl Into<String>,
        attestation: Attestation,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: None,
            content_hash,
            registrant: registrant.into(),
            tx_hash: attestation.tx_hash,
            block_number: attestation.block_number,
            created_at,
        }
    }

    /// Returns a copy of this certificate carrying the store-assigned id.
    pub fn with_id(mut self, id: CertificateId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Outcome of a verification query.
///
/// `certified` is always equal to `certificate.is_some()`; the flag is kept
/// as a separate field because it is what callers render.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub certified: bool,
    pub certificate: Option<Certificate>,
}

impl VerificationResult {
    pub fn found(certificate: Certificate) -> Self {
        Self {
            certified: true,
            certificate: Some(certificate),
        }
    }

    pub fn not_found() -> Self {
        Self {
            certified: false,
            certificate: None,
        }
    }
}

impl From<Option<Certificate>> for VerificationResult {
    fn from(found: Option<Certificate>) -> Self {
        match found {
            Some(cert) => Self::found(cert),
            None => Self::not_found(),
        }
    }
}
