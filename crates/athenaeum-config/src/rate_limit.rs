//! Rate limiting configuration for API endpoints.
//!
//! Limits are enforced in front of the auth handlers by `tower_governor`,
//! keyed by client IP. The handlers themselves keep no attempt counters.
//!
//! # Strategy
//!
//! Each quota is a token bucket: `burst` requests may be made at once, and one
//! request is replenished every `replenish_secs` seconds. The defaults give:
//!
//! | Quota | Routes | Default |
//! |---|---|---|
//! | `login` | `POST /auth/login` | 5 per 15 minutes |
//! | `email` | forgot-password, resend-verification | 3 per hour |
//! | `general` | every other `/api` route | 100 per 15 minutes |
//!
//! # Configuration
//!
//! - `RATE_LIMIT_ENABLED`: master switch (default: true)
//! - `RATE_LIMIT_LOGIN_REPLENISH_SECS` / `RATE_LIMIT_LOGIN_BURST`
//! - `RATE_LIMIT_EMAIL_REPLENISH_SECS` / `RATE_LIMIT_EMAIL_BURST`
//! - `RATE_LIMIT_GENERAL_REPLENISH_SECS` / `RATE_LIMIT_GENERAL_BURST`

use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::SmartIpKeyExtractor;
use tracing::warn;

use crate::env::{flag_or, parse_or};

pub type IpGovernorConfig =
    GovernorConfig<SmartIpKeyExtractor, ::governor::middleware::NoOpMiddleware>;

/// A single token bucket.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Quota {
    pub replenish_secs: u64,
    pub burst: u32,
}

impl Quota {
    fn from_env(prefix: &str, default: Quota) -> Self {
        Self {
            replenish_secs: parse_or(
                &format!("RATE_LIMIT_{}_REPLENISH_SECS", prefix),
                default.replenish_secs,
            ),
            burst: parse_or(&format!("RATE_LIMIT_{}_BURST", prefix), default.burst),
        }
    }

    /// Builds the governor config, or `None` when the quota is degenerate.
    pub fn governor_config(&self) -> Option<IpGovernorConfig> {
        let config = GovernorConfigBuilder::default()
            .per_second(self.replenish_secs)
            .burst_size(self.burst)
            .key_extractor(SmartIpKeyExtractor)
            .finish();

        if config.is_none() {
            warn!(quota = ?self, "invalid rate limit quota, limiter disabled");
        }
        config
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub login: Quota,
    pub email: Quota,
    pub general: Quota,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            login: Quota {
                replenish_secs: 180,
                burst: 5,
            },
            email: Quota {
                replenish_secs: 1200,
                burst: 3,
            },
            general: Quota {
                replenish_secs: 9,
                burst: 100,
            },
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: flag_or("RATE_LIMIT_ENABLED", defaults.enabled),
            login: Quota::from_env("LOGIN", defaults.login),
            email: Quota::from_env("EMAIL", defaults.email),
            general: Quota::from_env("GENERAL", defaults.general),
        }
    }

    /// A configuration with limiting switched off, for tests and local tooling.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_quotas() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        // 5 per 15 minutes
        assert_eq!(config.login.burst, 5);
        assert_eq!(config.login.replenish_secs * 5, 15 * 60);
        // 3 per hour
        assert_eq!(config.email.burst, 3);
        assert_eq!(config.email.replenish_secs * 3, 60 * 60);
        // 100 per 15 minutes
        assert_eq!(config.general.burst, 100);
        assert_eq!(config.general.replenish_secs * 100, 15 * 60);
    }

    #[test]
    fn default_quotas_build() {
        let config = RateLimitConfig::default();
        assert!(config.login.governor_config().is_some());
        assert!(config.email.governor_config().is_some());
        assert!(config.general.governor_config().is_some());
    }

    #[test]
    fn zero_burst_is_rejected() {
        let quota = Quota {
            replenish_secs: 1,
            burst: 0,
        };
        assert!(quota.governor_config().is_none());
    }

    #[test]
    fn disabled_keeps_quotas() {
        let config = RateLimitConfig::disabled();
        assert!(!config.enabled);
        assert_eq!(config.login, RateLimitConfig::default().login);
    }
}
