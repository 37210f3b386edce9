//! Fixed-window throttling model.
//!
//! A key moves between three implicit states: unseen (no entry), inside an
//! active window, and locked out. [`RateLimitEntry`] owns the transitions;
//! the adapters in `haven-infra` only own the key to entry map.

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(60 * 60);

/// Longest window or lockout a policy may carry: one year.
pub const MAX_POLICY_SPAN: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Throttling policy for one kind of action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Attempts allowed inside one window.
    pub max_attempts: u32,
    /// Window length.
    pub window: Duration,
    /// Lockout applied once `max_attempts` is exceeded.
    /// `None` means twice the window.
    pub block_duration: Option<Duration>,
}

impl RateLimitPolicy {
    /// Sign-in attempts: 5 per 15 minutes, 30 minute lockout.
    pub const LOGIN: Self = Self::new(5, Duration::from_secs(15 * 60))
        .with_block_duration(Duration::from_secs(30 * 60));

    /// Password reset requests: 3 per hour, 2 hour lockout.
    pub const PASSWORD_RESET: Self =
        Self::new(3, HOUR).with_block_duration(Duration::from_secs(2 * 60 * 60));

    /// Contact form submissions: 5 per hour, 1 hour lockout.
    pub const CONTACT_FORM: Self = Self::new(5, HOUR).with_block_duration(HOUR);

    /// Listing search: 30 per minute.
    pub const SEARCH: Self = Self::new(30, MINUTE);

    /// Generic API calls: 100 per minute.
    pub const API: Self = Self::new(100, MINUTE);

    pub const fn new(max_attempts: u32, window: Duration) -> Self {
        Self {
            max_attempts,
            window,
            block_duration: None,
        }
    }

    pub const fn with_block_duration(self, block_duration: Duration) -> Self {
        Self {
            block_duration: Some(block_duration),
            ..self
        }
    }

    /// Effective lockout once the ceiling is breached.
    pub fn lockout(&self) -> Duration {
        self.block_duration
            .unwrap_or_else(|| self.window.saturating_mul(2))
    }

    /// Reject policies that could never admit an attempt.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_attempts == 0 {
            return Err(DomainError::validation("max_attempts must be positive"));
        }
        if self.window.is_zero() {
            return Err(DomainError::validation("window must be non-zero"));
        }
        if self.window > MAX_POLICY_SPAN {
            return Err(DomainError::validation("window must not exceed one year"));
        }
        if self.lockout() > MAX_POLICY_SPAN {
            return Err(DomainError::validation("lockout must not exceed one year"));
        }
        Ok(())
    }
}

/// Per-key accounting record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at: Instant,
    pub blocked_until: Option<Instant>,
}

impl RateLimitEntry {
    /// Open a fresh window with the first attempt counted.
    pub fn start(now: Instant, policy: &RateLimitPolicy) -> Self {
        Self {
            count: 1,
            reset_at: deadline(now, policy.window),
            blocked_until: None,
        }
    }

    pub fn is_blocked(&self, now: Instant) -> bool {
        self.blocked_until.is_some_and(|until| now < until)
    }

    pub fn window_expired(&self, now: Instant) -> bool {
        now > self.reset_at
    }

    /// Count one more attempt in the current window.
    ///
    /// Returns `false` and starts a lockout when the ceiling is exceeded.
    /// Callers must have ruled out an active lockout and an expired window.
    pub fn record(&mut self, now: Instant, policy: &RateLimitPolicy) -> bool {
        self.count = self.count.saturating_add(1);

        if self.count > policy.max_attempts {
            self.blocked_until = Some(deadline(now, policy.lockout()));
            return false;
        }

        true
    }

    pub fn remaining(&self, now: Instant, policy: &RateLimitPolicy) -> u32 {
        if self.window_expired(now) {
            return policy.max_attempts;
        }
        policy.max_attempts.saturating_sub(self.count)
    }

    /// Time until the key accepts attempts again, or until its window rolls.
    pub fn reset_after(&self, now: Instant) -> Duration {
        match self.blocked_until {
            Some(until) if now < until => until - now,
            _ if now < self.reset_at => self.reset_at - now,
            _ => Duration::ZERO,
        }
    }
}

/// `now + span`, with `span` capped so the addition cannot overflow.
fn deadline(now: Instant, span: Duration) -> Instant {
    let span = span.min(MAX_POLICY_SPAN);
    now.checked_add(span).unwrap_or(now)
}

/// Whole seconds, rounded up.
pub fn ceil_secs(duration: Duration) -> u64 {
    duration.as_secs() + u64::from(duration.subsec_nanos() > 0)
}

/// The storefront actions that are throttled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThrottleScope {
    Login,
    PasswordReset,
    ContactForm,
    Search,
    Api,
}

impl ThrottleScope {
    pub const ALL: [ThrottleScope; 5] = [
        ThrottleScope::Login,
        ThrottleScope::PasswordReset,
        ThrottleScope::ContactForm,
        ThrottleScope::Search,
        ThrottleScope::Api,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ThrottleScope::Login => "login",
            ThrottleScope::PasswordReset => "password-reset",
            ThrottleScope::ContactForm => "contact-form",
            ThrottleScope::Search => "search",
            ThrottleScope::Api => "api",
        }
    }

    /// Suffix used for `RATE_LIMIT_<SCOPE>_*` environment overrides.
    pub fn env_name(&self) -> &'static str {
        match self {
            ThrottleScope::Login => "LOGIN",
            ThrottleScope::PasswordReset => "PASSWORD_RESET",
            ThrottleScope::ContactForm => "CONTACT_FORM",
            ThrottleScope::Search => "SEARCH",
            ThrottleScope::Api => "API",
        }
    }

    pub fn default_policy(&self) -> RateLimitPolicy {
        match self {
            ThrottleScope::Login => RateLimitPolicy::LOGIN,
            ThrottleScope::PasswordReset => RateLimitPolicy::PASSWORD_RESET,
            ThrottleScope::ContactForm => RateLimitPolicy::CONTACT_FORM,
            ThrottleScope::Search => RateLimitPolicy::SEARCH,
            ThrottleScope::Api => RateLimitPolicy::API,
        }
    }

    /// Build the limiter key for `subject`.
    ///
    /// Search is throttled as one global bucket, so its subject is ignored.
    /// Email-based scopes are case-insensitive.
    pub fn key(&self, subject: &str) -> String {
        match self {
            ThrottleScope::Login => format!("login:{}", subject.to_lowercase()),
            ThrottleScope::PasswordReset => format!("password-reset:{}", subject.to_lowercase()),
            ThrottleScope::ContactForm => format!("contact:{}", subject.to_lowercase()),
            ThrottleScope::Search => "search:global".to_string(),
            ThrottleScope::Api => format!("api:{subject}"),
        }
    }
}

impl fmt::Display for ThrottleScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThrottleScope {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ThrottleScope::ALL
            .into_iter()
            .find(|scope| scope.as_str() == s)
            .ok_or_else(|| DomainError::Validation(format!("unknown throttle scope: {s}")))
    }
}

/// Policy lookup per scope, seeded with the built-in policies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyTable {
    policies: [RateLimitPolicy; 5],
}

impl PolicyTable {
    fn slot(scope: ThrottleScope) -> usize {
        match scope {
            ThrottleScope::Login => 0,
            ThrottleScope::PasswordReset => 1,
            ThrottleScope::ContactForm => 2,
            ThrottleScope::Search => 3,
            ThrottleScope::Api => 4,
        }
    }

    pub fn get(&self, scope: ThrottleScope) -> &RateLimitPolicy {
        &self.policies[Self::slot(scope)]
    }

    /// Replace the policy for `scope`. Invalid policies are rejected.
    pub fn set(&mut self, scope: ThrottleScope, policy: RateLimitPolicy) -> Result<(), DomainError> {
        policy.validate()?;
        self.policies[Self::slot(scope)] = policy;
        Ok(())
    }
}

impl Default for PolicyTable {
    fn default() -> Self {
        Self {
            policies: ThrottleScope::ALL.map(|scope| scope.default_policy()),
        }
    }
}
