//! Core domain types used by the notary.
//!
//! This module defines strongly-typed content fingerprints, attestation
//! references, and certificate identifiers shared across the workflows,
//! storage backends, and ledger adapters. The goal is to avoid "naked"
//! strings in public APIs and instead use domain-specific newtypes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Certificates and verification outcomes.
pub mod certificate;

pub use certificate::{Attestation, Certificate, VerificationResult};

/// Hex-encoded content fingerprint.
///
/// Fingerprints produced by [`crate::fingerprint`] are always lowercase
/// and exactly 64 characters long. Values supplied by
/// callers (e.g. a hash typed into a verification query) are carried
/// verbatim and are not normalised, so a lookup only matches when the
/// caller already used the canonical form.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentHash(String);

impl ContentHash {
    /// Wraps a caller-supplied digest string without validating it.
    pub fn new(hex: impl Into<String>) -> Self {
        ContentHash(hex.into())
    }

    /// Returns the digest as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the digest as raw bytes, used as a storage key.
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Transaction reference returned by the attestation ledger.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxHash(String);

impl TxHash {
    pub fn new(reference: impl Into<String>) -> Self {
        TxHash(reference.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TxHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque certificate identifier assigned by a [`crate::CertificateStore`]
/// at save time.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateId(pub u64);

impl fmt::Display for CertificateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
