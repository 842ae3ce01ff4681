//! Per-IP rate limits for the unauthenticated auth endpoints.
//!
//! Each limited endpoint gets its own `tower_governor` configuration keyed on
//! the peer address of the connection. Forwarding headers are not consulted, so
//! a client cannot pick its own bucket. The quota allows `n` requests per minute
//! with a burst of `n`.
//!
//! - `RATE_LIMIT_ENABLED`: turn limiting on/off (default: true)
//! - `RATE_LIMIT_SIGNUP_PER_MINUTE`: default 5
//! - `RATE_LIMIT_LOGIN_PER_MINUTE`: default 10
//! - `RATE_LIMIT_FORGOT_PASSWORD_PER_MINUTE`: default 5

use governor::middleware::NoOpMiddleware;
use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::PeerIpKeyExtractor;

pub type AuthGovernorConfig = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

const MILLIS_PER_MINUTE: u64 = 60_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub signup_per_minute: u32,
    pub login_per_minute: u32,
    pub forgot_password_per_minute: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            signup_per_minute: 5,
            login_per_minute: 10,
            forgot_password_per_minute: 5,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(crate::env_lookup)
    }

    #[must_use]
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            enabled: lookup("RATE_LIMIT_ENABLED")
                .and_then(|v| crate::parse_bool(&v))
                .unwrap_or(defaults.enabled),
            signup_per_minute: crate::parse_or(
                &lookup,
                "RATE_LIMIT_SIGNUP_PER_MINUTE",
                defaults.signup_per_minute,
            ),
            login_per_minute: crate::parse_or(
                &lookup,
                "RATE_LIMIT_LOGIN_PER_MINUTE",
                defaults.login_per_minute,
            ),
            forgot_password_per_minute: crate::parse_or(
                &lookup,
                "RATE_LIMIT_FORGOT_PASSWORD_PER_MINUTE",
                defaults.forgot_password_per_minute,
            ),
        }
    }

    /// Limits disabled, for tests and local tooling.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// `None` when limiting is disabled.
    #[must_use]
    pub fn signup_governor_config(&self) -> Option<AuthGovernorConfig> {
        self.governor_config(self.signup_per_minute)
    }

    #[must_use]
    pub fn login_governor_config(&self) -> Option<AuthGovernorConfig> {
        self.governor_config(self.login_per_minute)
    }

    #[must_use]
    pub fn forgot_password_governor_config(&self) -> Option<AuthGovernorConfig> {
        self.governor_config(self.forgot_password_per_minute)
    }

    fn governor_config(&self, per_minute: u32) -> Option<AuthGovernorConfig> {
        if !self.enabled {
            return None;
        }

        let (burst, replenish_ms) = quota(per_minute);
        GovernorConfigBuilder::default()
            .per_millisecond(replenish_ms)
            .burst_size(burst)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
    }
}

/// Burst size and the interval after which one request is replenished.
/// A configured value of 0 is treated as 1.
fn quota(per_minute: u32) -> (u32, u64) {
    let burst = per_minute.max(1);
    (burst, (MILLIS_PER_MINUTE / u64::from(burst)).max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup_from;
    use std::net::IpAddr;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.signup_per_minute, 5);
        assert_eq!(config.login_per_minute, 10);
        assert_eq!(config.forgot_password_per_minute, 5);
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = RateLimitConfig::from_lookup(lookup_from(&[
            ("RATE_LIMIT_ENABLED", "false"),
            ("RATE_LIMIT_LOGIN_PER_MINUTE", "3"),
        ]));
        assert!(!config.enabled);
        assert_eq!(config.login_per_minute, 3);
        assert_eq!(config.signup_per_minute, 5);
    }

    #[test]
    fn test_quota_spreads_limit_over_a_minute() {
        assert_eq!(quota(10), (10, 6_000));
        assert_eq!(quota(5), (5, 12_000));
        assert_eq!(quota(0), (1, 60_000));
        assert_eq!(quota(u32::MAX).1, 1);
    }

    #[test]
    fn test_disabled_config_has_no_limiter() {
        let config = RateLimitConfig::disabled();
        assert!(config.signup_governor_config().is_none());
        assert!(config.login_governor_config().is_none());
        assert!(config.forgot_password_governor_config().is_none());
    }

    #[test]
    fn test_limiter_allows_burst_then_rejects() {
        let config = RateLimitConfig {
            login_per_minute: 2,
            ..RateLimitConfig::default()
        };
        let governor = config.login_governor_config().unwrap();
        let limiter = governor.limiter();
        let ip: IpAddr = "203.0.113.9".parse().unwrap();
        let other: IpAddr = "203.0.113.10".parse().unwrap();

        assert!(limiter.check_key(&ip).is_ok());
        assert!(limiter.check_key(&ip).is_ok());
        assert!(limiter.check_key(&ip).is_err());
        assert!(limiter.check_key(&other).is_ok());
    }
}
