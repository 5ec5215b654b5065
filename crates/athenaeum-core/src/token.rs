//! Single-use token generation.
//!
//! Tokens are 32 random bytes from the operating system RNG, hex-encoded to a
//! 64 character string (256 bits of entropy). Only the SHA-256 digest of a
//! token is persisted; the plaintext goes to the mailer and nowhere else.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

use crate::clock::Clock;

pub const TOKEN_BYTES: usize = 32;

/// A freshly generated token and what the store needs to remember about it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Delivered to the user, never stored.
    pub plain: String,
    /// Stored and matched against.
    pub digest: String,
    pub expires_at: DateTime<Utc>,
}

/// Hashes a presented token the same way it was hashed at issuance.
pub fn digest_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

fn random_hex() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[derive(Debug, Clone)]
pub struct TokenIssuer {
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn new_token(&self) -> String {
        random_hex()
    }

    pub fn expiry_from_now(&self, ttl: Duration) -> DateTime<Utc> {
        self.clock.now() + ttl
    }

    pub fn issue(&self, ttl: Duration) -> IssuedToken {
        let plain = self.new_token();
        IssuedToken {
            digest: digest_token(&plain),
            expires_at: self.expiry_from_now(ttl),
            plain,
        }
    }
}
