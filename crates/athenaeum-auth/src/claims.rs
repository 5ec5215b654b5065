use serde::{Deserialize, Serialize};

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id (subject claim)
    pub sub: String,
    /// Issued-at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
    /// Unique token id, so a rotated token never equals its predecessor
    pub jti: String,
}
