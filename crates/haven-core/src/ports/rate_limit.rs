//! Rate limiting port.

use crate::domain::RateLimitPolicy;

/// Rate limiter trait - abstraction over throttling backends.
///
/// Calls are synchronous and never fail: a rejected attempt is a normal
/// `false`, not an error. Each `check` is atomic with respect to other
/// callers sharing the same limiter.
pub trait RateLimiter: Send + Sync {
    /// Record an attempt for `key` and report whether it is allowed.
    ///
    /// While the key is locked out the attempt is rejected without
    /// touching its state.
    fn check(&self, key: &str, policy: &RateLimitPolicy) -> bool;

    /// Attempts left in the current window. Does not record an attempt.
    fn remaining(&self, key: &str, policy: &RateLimitPolicy) -> u32;

    /// Seconds (rounded up) until the lockout ends, or until the current
    /// window rolls over. Zero for unknown or idle keys.
    fn reset_after(&self, key: &str) -> u64;

    /// Forget everything about `key`.
    fn clear(&self, key: &str);

    /// Forget every key.
    fn clear_all(&self);

    /// `check` plus a read-back of the resulting state.
    ///
    /// The default takes no lock across the three calls; adapters that can
    /// should override it so concurrent callers each see their own result.
    fn attempt(&self, key: &str, policy: &RateLimitPolicy) -> RateLimitResult {
        let allowed = self.check(key, policy);
        RateLimitResult {
            allowed,
            remaining: self.remaining(key, policy),
            reset_after_secs: self.reset_after(key),
        }
    }
}

/// Result of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_after_secs: u64,
}

/// One key bound to its policy on a shared limiter.
pub struct Throttle<'a> {
    limiter: &'a dyn RateLimiter,
    key: String,
    policy: RateLimitPolicy,
}

impl<'a> Throttle<'a> {
    pub fn new(limiter: &'a dyn RateLimiter, key: impl Into<String>, policy: RateLimitPolicy) -> Self {
        Self {
            limiter,
            key: key.into(),
            policy,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    pub fn check(&self) -> bool {
        self.limiter.check(&self.key, &self.policy)
    }

    pub fn remaining(&self) -> u32 {
        self.limiter.remaining(&self.key, &self.policy)
    }

    pub fn reset_after(&self) -> u64 {
        self.limiter.reset_after(&self.key)
    }

    pub fn clear(&self) {
        self.limiter.clear(&self.key)
    }
}
