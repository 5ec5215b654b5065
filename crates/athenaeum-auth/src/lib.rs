//! # Athenaeum Auth
//!
//! Session tokens for the Athenaeum API.
//!
//! A session token is an HS256 JWT whose subject is the user id and whose
//! expiry is a fixed window (30 days by default) after issuance. There is no
//! server-side session store: any holder of a valid, unexpired token is
//! treated as the referenced user, provided that user still exists and is
//! active (checked by the access gate, not here).
//!
//! - [`claims`]: the claim set embedded in every session token
//! - [`jwt`]: [`SessionSigner`], which issues and verifies tokens against an
//!   injected [`Clock`](athenaeum_core::Clock)
//!
//! # Example
//!
//! ```ignore
//! use athenaeum_auth::SessionSigner;
//! use athenaeum_config::JwtConfig;
//! use athenaeum_core::SystemClock;
//!
//! let signer = SessionSigner::new(&JwtConfig::from_env()?, Arc::new(SystemClock));
//! let token = signer.issue(user_id)?;
//! assert_eq!(signer.verify(&token)?, user_id);
//! ```

pub mod claims;
pub mod jwt;

// Re-export commonly used types at crate root
pub use claims::SessionClaims;
pub use jwt::{SessionError, SessionSigner};
