//! Content fingerprinting.
//!
//! A fingerprint is the lowercase hex SHA-256 digest of the full byte
//! content of an upload. It depends on nothing but those bytes: file names,
//! declared media types, and upload times never enter the digest, so two
//! uploads with the same bytes always map to the same [`ContentHash`].

use std::io::{self, Read};

use sha2::{Digest, Sha256};

use crate::types::ContentHash;

/// Size of the buffer used to stream content through the hasher.
const CHUNK_SIZE: usize = 64 * 1024;

/// Failure while consuming a content stream.
#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    /// The stream yielded an I/O error before reaching end-of-file.
    #[error("reading content after {bytes_read} bytes: {source}")]
    Read {
        bytes_read: u64,
        #[source]
        source: io::Error,
    },
}

/// Streams `reader` to end-of-file and returns its fingerprint.
///
/// The reader is consumed exactly once. If it fails part-way through, no
/// digest is returned.
pub fn fingerprint<R: Read>(mut reader: R) -> Result<ContentHash, FingerprintError> {
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut bytes_read: u64 = 0;

    loop {
        match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => {
                hasher.update(&buf[..n]);
                bytes_read += n as u64;
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(source) => return Err(FingerprintError::Read { bytes_read, source }),
        }
    }

    Ok(ContentHash::new(hex::encode(hasher.finalize())))
}

/// Fingerprints an in-memory buffer.
pub fn fingerprint_bytes(content: &[u8]) -> ContentHash {
    ContentHash::new(hex::encode(Sha256::digest(content)))
}
