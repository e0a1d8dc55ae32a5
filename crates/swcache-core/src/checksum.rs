//! SHA-256 digests for cached bodies and shared files.

use sha2::{Digest, Sha256};

/// Digest of `data` as lowercase hex.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}
