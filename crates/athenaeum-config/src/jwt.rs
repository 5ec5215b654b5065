use anyhow::{Context, bail};

use crate::env::parse_or;

/// Thirty days.
pub const DEFAULT_SESSION_EXPIRY_SECS: i64 = 30 * 24 * 60 * 60;

#[derive(Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub session_expiry_secs: i64,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("secret", &"<redacted>")
            .field("session_expiry_secs", &self.session_expiry_secs)
            .finish()
    }
}

impl JwtConfig {
    /// Loads the signing secret. A missing or blank `JWT_SECRET` is a startup error.
    pub fn from_env() -> anyhow::Result<Self> {
        let secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        Self::new(
            secret,
            parse_or("JWT_SESSION_EXPIRY_SECS", DEFAULT_SESSION_EXPIRY_SECS),
        )
    }

    pub fn new(secret: String, session_expiry_secs: i64) -> anyhow::Result<Self> {
        if secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }
        if session_expiry_secs <= 0 {
            bail!("JWT_SESSION_EXPIRY_SECS must be positive");
        }
        Ok(Self {
            secret,
            session_expiry_secs,
        })
    }
}
