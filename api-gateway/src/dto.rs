//! JSON response bodies.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};

use notary::{Certificate, VerificationResult};

/// Wire form of a [`Certificate`].
///
/// `id` is rendered as a string so that clients in languages without 64-bit
/// integers do not lose precision.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CertificateDto {
    pub id: String,
    pub content_hash: String,
    pub registrant: String,
    pub tx_hash: String,
    pub block_number: u64,
    pub created_at: String,
}

impl From<&Certificate> for CertificateDto {
    fn from(cert: &Certificate) -> Self {
        Self {
            id: cert.id.map(|id| id.to_string()).unwrap_or_default(),
            content_hash: cert.content_hash.as_str().to_owned(),
            registrant: cert.registrant.clone(),
            tx_hash: cert.tx_hash.as_str().to_owned(),
            block_number: cert.block_number,
            created_at: cert.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Body of both verification routes.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyResponse {
    pub certified: bool,
    pub certificate: Option<CertificateDto>,
}

impl From<&VerificationResult> for VerifyResponse {
    fn from(result: &VerificationResult) -> Self {
        Self {
            certified: result.certified,
            certificate: result.certificate.as_ref().map(CertificateDto::from),
        }
    }
}
