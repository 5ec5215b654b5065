use std::time::Duration;

use crate::env::parse_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthConfig {
    pub bcrypt_cost: u32,
    pub verification_ttl_secs: i64,
    pub reset_ttl_secs: i64,
    pub store_timeout_ms: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: bcrypt::DEFAULT_COST,
            verification_ttl_secs: 24 * 60 * 60,
            reset_ttl_secs: 60 * 60,
            store_timeout_ms: 5_000,
        }
    }
}

impl AuthConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bcrypt_cost: parse_or("BCRYPT_COST", defaults.bcrypt_cost),
            verification_ttl_secs: parse_or(
                "EMAIL_VERIFICATION_TTL_SECS",
                defaults.verification_ttl_secs,
            ),
            reset_ttl_secs: parse_or("PASSWORD_RESET_TTL_SECS", defaults.reset_ttl_secs),
            store_timeout_ms: parse_or("STORE_TIMEOUT_MS", defaults.store_timeout_ms),
        }
    }

    pub fn verification_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.verification_ttl_secs)
    }

    pub fn reset_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.reset_ttl_secs)
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_lifetimes() {
        let config = AuthConfig::default();
        assert_eq!(config.verification_ttl(), chrono::Duration::hours(24));
        assert_eq!(config.reset_ttl(), chrono::Duration::hours(1));
        assert_eq!(config.store_timeout(), Duration::from_secs(5));
    }
}
