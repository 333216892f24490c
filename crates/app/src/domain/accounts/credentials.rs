//! Account API tokens.
//!
//! Tokens are random, shown once at creation and stored only as a SHA-256 digest.

use std::fmt;

use rand::{RngCore, rngs::OsRng};
use zeroize::Zeroize;

use crate::digest::sha256_hex;

/// API token prefix.
pub const API_TOKEN_PREFIX: &str = "gh";

/// Number of random bytes encoded in a token.
pub const API_TOKEN_SECRET_BYTES: usize = 32;

/// A freshly generated bearer token. Redacted in debug output and wiped on drop.
pub struct ApiToken(String);

impl ApiToken {
    /// Generate a token from the OS random number generator.
    #[must_use]
    pub fn generate() -> Self {
        let mut secret = [0_u8; API_TOKEN_SECRET_BYTES];

        OsRng.fill_bytes(&mut secret);

        let mut encoded = String::with_capacity(API_TOKEN_PREFIX.len() + 1 + secret.len() * 2);

        encoded.push_str(API_TOKEN_PREFIX);
        encoded.push('_');

        for byte in &secret {
            encoded.push_str(&format!("{byte:02x}"));
        }

        secret.zeroize();

        Self(encoded)
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn hash(&self) -> String {
        hash_api_token(&self.0)
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(**redacted**)")
    }
}

impl Drop for ApiToken {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

/// Digest under which a bearer token is stored and looked up.
#[must_use]
pub fn hash_api_token(token: &str) -> String {
    sha256_hex(token.trim().as_bytes())
}
