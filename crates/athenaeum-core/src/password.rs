//! Password hashing using bcrypt.
//!
//! bcrypt is a slow, salted one-way function; [`bcrypt::verify`] compares
//! digests in constant time. Length and format policy is not enforced here,
//! that belongs to request validation.

use std::fmt;

use tracing::warn;

/// Fixed input for the dummy hash used to equalise login timing.
const DUMMY_PASSWORD: &str = "athenaeum-timing-equaliser";

/// A bcrypt digest as persisted in the credential store.
///
/// There is no way to build one from plaintext except [`PasswordHasher::hash`].
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wraps a digest loaded from storage.
    pub fn from_stored(digest: String) -> Self {
        Self(digest)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

#[derive(Clone, Debug)]
pub struct PasswordHasher {
    cost: u32,
    dummy: PasswordHash,
}

impl PasswordHasher {
    /// Creates a hasher with the given bcrypt cost.
    ///
    /// Computes one digest up front so that [`verify_dummy`](Self::verify_dummy)
    /// costs the same as a real verification.
    pub fn new(cost: u32) -> Result<Self, bcrypt::BcryptError> {
        let dummy = PasswordHash(bcrypt::hash(DUMMY_PASSWORD, cost)?);
        Ok(Self { cost, dummy })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn hash(&self, plaintext: &str) -> Result<PasswordHash, bcrypt::BcryptError> {
        bcrypt::hash(plaintext, self.cost).map(PasswordHash)
    }

    /// Returns `false` for a mismatch and for a malformed stored digest.
    pub fn verify(&self, plaintext: &str, hash: &PasswordHash) -> bool {
        match bcrypt::verify(plaintext, hash.as_str()) {
            Ok(matches) => matches,
            Err(e) => {
                warn!(error = %e, "stored password hash could not be parsed");
                false
            }
        }
    }

    /// Burns one verification so a lookup miss takes as long as a real check.
    pub fn verify_dummy(&self, plaintext: &str) {
        let _ = self.verify(plaintext, &self.dummy);
    }
}
