//! One-way digests for bearer credentials and visitor secrets.

use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `input`.
#[must_use]
pub(crate) fn sha256_hex(input: &[u8]) -> String {
    format!("{:x}", Sha256::digest(input))
}
