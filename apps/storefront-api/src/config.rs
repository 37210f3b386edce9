//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use haven_core::domain::{PolicyTable, ThrottleScope};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// JSON export of listings served by the search endpoint.
    pub listings_path: Option<PathBuf>,
    pub lead_webhook_url: Option<String>,
    pub password_reset_webhook_url: Option<String>,
    /// Bearer token for clearing throttled keys. Clearing is disabled without it.
    pub admin_token: Option<String>,
    pub policies: PolicyTable,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port: var("PORT").and_then(|p| p.parse().ok()).unwrap_or(8080),
            listings_path: non_empty("LISTINGS_PATH").map(PathBuf::from),
            lead_webhook_url: non_empty("LEAD_WEBHOOK_URL"),
            password_reset_webhook_url: non_empty("PASSWORD_RESET_WEBHOOK_URL"),
            admin_token: non_empty("ADMIN_TOKEN"),
            policies: Self::parse_policies(&var),
        }
    }

    /// Apply per-scope overrides on top of the built-in policies.
    /// Format: RATE_LIMIT_<SCOPE>_{MAX_ATTEMPTS,WINDOW_SECS,BLOCK_SECS}
    /// Example: RATE_LIMIT_SEARCH_MAX_ATTEMPTS=60
    fn parse_policies(var: &impl Fn(&str) -> Option<String>) -> PolicyTable {
        let mut table = PolicyTable::default();

        for scope in ThrottleScope::ALL {
            let prefix = format!("RATE_LIMIT_{}", scope.env_name());
            let number = |suffix: &str| -> Option<u64> {
                let key = format!("{prefix}_{suffix}");
                let raw = var(&key)?;
                match raw.trim().parse() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        tracing::warn!(key = %key, value = %raw, "Ignoring non-numeric rate limit override");
                        None
                    }
                }
            };

            let mut policy = *table.get(scope);
            let mut overridden = false;

            if let Some(max) = number("MAX_ATTEMPTS") {
                policy.max_attempts = u32::try_from(max).unwrap_or(u32::MAX);
                overridden = true;
            }
            if let Some(secs) = number("WINDOW_SECS") {
                policy.window = Duration::from_secs(secs);
                overridden = true;
            }
            if let Some(secs) = number("BLOCK_SECS") {
                policy.block_duration = Some(Duration::from_secs(secs));
                overridden = true;
            }

            if !overridden {
                continue;
            }
            if let Err(e) = table.set(scope, policy) {
                tracing::warn!(scope = %scope, error = %e, "Ignoring invalid rate limit override");
            }
        }

        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haven_core::domain::RateLimitPolicy;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 8080);
        assert!(cfg.listings_path.is_none());
        assert!(cfg.admin_token.is_none());
        assert_eq!(cfg.policies, PolicyTable::default());
    }

    #[test]
    fn test_blank_values_are_unset() {
        let cfg = config(&[("ADMIN_TOKEN", "  "), ("LEAD_WEBHOOK_URL", "")]);
        assert!(cfg.admin_token.is_none());
        assert!(cfg.lead_webhook_url.is_none());
    }

    #[test]
    fn test_policy_overrides() {
        let cfg = config(&[
            ("RATE_LIMIT_SEARCH_MAX_ATTEMPTS", "60"),
            ("RATE_LIMIT_PASSWORD_RESET_WINDOW_SECS", "600"),
            ("RATE_LIMIT_PASSWORD_RESET_BLOCK_SECS", "900"),
        ]);

        let search = cfg.policies.get(ThrottleScope::Search);
        assert_eq!(search.max_attempts, 60);
        assert_eq!(search.window, RateLimitPolicy::SEARCH.window);
        assert_eq!(search.block_duration, None);

        let reset = cfg.policies.get(ThrottleScope::PasswordReset);
        assert_eq!(reset.max_attempts, 3);
        assert_eq!(reset.window, Duration::from_secs(600));
        assert_eq!(reset.lockout(), Duration::from_secs(900));
    }

    #[test]
    fn test_invalid_overrides_are_ignored() {
        let cfg = config(&[
            ("RATE_LIMIT_API_MAX_ATTEMPTS", "0"),
            ("RATE_LIMIT_LOGIN_WINDOW_SECS", "soon"),
        ]);
        assert_eq!(cfg.policies.get(ThrottleScope::Api), &RateLimitPolicy::API);
        assert_eq!(cfg.policies.get(ThrottleScope::Login), &RateLimitPolicy::LOGIN);
    }

    #[test]
    fn test_oversized_overrides_are_ignored() {
        let cfg = config(&[
            ("RATE_LIMIT_SEARCH_WINDOW_SECS", "18446744073709551615"),
            ("RATE_LIMIT_LOGIN_BLOCK_SECS", "18446744073709551615"),
            ("RATE_LIMIT_API_WINDOW_SECS", "31536001"),
        ]);
        assert_eq!(cfg.policies.get(ThrottleScope::Search), &RateLimitPolicy::SEARCH);
        assert_eq!(cfg.policies.get(ThrottleScope::Login), &RateLimitPolicy::LOGIN);
        assert_eq!(cfg.policies.get(ThrottleScope::Api), &RateLimitPolicy::API);
    }
}
