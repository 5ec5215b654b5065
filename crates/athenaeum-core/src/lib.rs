//! # Athenaeum Core
//!
//! Core types, errors, and credential primitives for the Athenaeum API.
//!
//! - [`errors`]: Application error taxonomy with HTTP response conversion
//! - [`password`]: Salted one-way password hashing and verification
//! - [`token`]: Random single-use token generation and digesting
//! - [`clock`]: Injectable source of "now" for expiry checks
//! - [`deadline`]: Request-scoped deadlines for store calls
//! - [`serde`]: Custom serde deserialization helpers
//!
//! # Example
//!
//! ```ignore
//! use athenaeum_core::{AppError, PasswordHasher, TokenIssuer, SystemClock};
//!
//! let hasher = PasswordHasher::new(bcrypt::DEFAULT_COST)?;
//! let hash = hasher.hash("secret123")?;
//! assert!(hasher.verify("secret123", &hash));
//!
//! let issuer = TokenIssuer::new(Arc::new(SystemClock));
//! let token = issuer.issue(chrono::Duration::hours(24));
//! ```

pub mod clock;
pub mod deadline;
pub mod errors;
pub mod password;
pub mod serde;
pub mod token;

// Re-export commonly used types at crate root
pub use clock::{Clock, SystemClock};
pub use deadline::with_deadline;
pub use errors::{AppError, ErrorBody, ErrorKind};
pub use password::{PasswordHash, PasswordHasher};
pub use token::{IssuedToken, TokenIssuer, digest_token};

#[cfg(any(test, feature = "test-utils"))]
pub use clock::ManualClock;
