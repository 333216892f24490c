//! Visitor secrets.
//!
//! Secrets look like `VT-K7M2QX9PLA`: a fixed prefix followed by characters from an alphabet
//! without look-alikes (no `0`/`O`, `1`/`I`). Only the SHA-256 of the normalised secret is used
//! for lookups.

use std::fmt;

use rand::{rngs::OsRng, seq::SliceRandom};
use zeroize::Zeroize;

use crate::digest::sha256_hex;

/// Human-readable secret prefix.
pub const VISITOR_SECRET_PREFIX: &str = "VT-";

/// Number of random characters after the prefix.
pub const VISITOR_SECRET_LENGTH: usize = 10;

const VISITOR_SECRET_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

#[derive(Clone, PartialEq, Eq)]
pub struct VisitorSecret(String);

impl VisitorSecret {
    /// Generate a new secret from the OS random number generator.
    #[must_use]
    pub fn generate() -> Self {
        let mut rng = OsRng;
        let mut secret = String::with_capacity(VISITOR_SECRET_PREFIX.len() + VISITOR_SECRET_LENGTH);

        secret.push_str(VISITOR_SECRET_PREFIX);

        while secret.len() < VISITOR_SECRET_PREFIX.len() + VISITOR_SECRET_LENGTH {
            if let Some(byte) = VISITOR_SECRET_ALPHABET.choose(&mut rng) {
                secret.push(char::from(*byte));
            }
        }

        Self(secret)
    }

    /// Normalise a secret typed or scanned at the gate: surrounding whitespace is dropped and
    /// letters are upper-cased.
    #[must_use]
    pub fn from_presented(raw: &str) -> Self {
        Self(raw.trim().to_ascii_uppercase())
    }

    pub(crate) fn from_stored(stored: String) -> Self {
        Self(stored)
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Digest under which the token is stored.
    #[must_use]
    pub fn hash(&self) -> String {
        sha256_hex(self.0.as_bytes())
    }
}

impl fmt::Debug for VisitorSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VisitorSecret(**redacted**)")
    }
}

impl Drop for VisitorSecret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
