//! In-memory fixed-window rate limiter with lockout.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use haven_core::domain::{RateLimitEntry, RateLimitPolicy, ceil_secs};
use haven_core::ports::{Clock, RateLimitResult, RateLimiter, SystemClock};

/// Process-local rate limiter.
///
/// Counts attempts per key in fixed windows and locks a key out once it
/// exceeds its policy. Entries are created on first use and stay until
/// `clear` / `clear_all`; nothing expires them in the background.
///
/// Note: Limits are per-process, not shared across instances.
pub struct InMemoryRateLimiter {
    entries: Mutex<HashMap<String, RateLimitEntry>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRateLimiter {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Number of keys currently tracked.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Entries are replaced whole, so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, RateLimitEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for InMemoryRateLimiter {
    fn default() -> Self {
        Self::new()
    }
}

/// One attempt against `key`, applied to an already locked map.
fn check_entry(
    entries: &mut HashMap<String, RateLimitEntry>,
    key: &str,
    policy: &RateLimitPolicy,
    now: Instant,
) -> bool {
    match entries.entry(key.to_string()) {
        Entry::Occupied(mut occupied) => {
            let entry = occupied.get_mut();

            if entry.is_blocked(now) {
                return false;
            }

            if entry.window_expired(now) {
                *entry = RateLimitEntry::start(now, policy);
                tracing::debug!(key, "Rate limit window reset");
                return true;
            }

            let allowed = entry.record(now, policy);
            if !allowed {
                tracing::warn!(
                    key,
                    attempts = entry.count,
                    max_attempts = policy.max_attempts,
                    lockout_secs = policy.lockout().as_secs(),
                    "Rate limit exceeded, key locked out"
                );
            }
            allowed
        }
        Entry::Vacant(vacant) => {
            vacant.insert(RateLimitEntry::start(now, policy));
            tracing::debug!(key, "Rate limit window opened");
            true
        }
    }
}

impl RateLimiter for InMemoryRateLimiter {
    fn check(&self, key: &str, policy: &RateLimitPolicy) -> bool {
        let now = self.clock.now();
        check_entry(&mut self.lock(), key, policy, now)
    }

    // Read-back happens under the same lock as the check.
    fn attempt(&self, key: &str, policy: &RateLimitPolicy) -> RateLimitResult {
        let now = self.clock.now();
        let mut entries = self.lock();
        let allowed = check_entry(&mut entries, key, policy, now);
        let entry = entries.get(key);

        RateLimitResult {
            allowed,
            remaining: entry.map_or(policy.max_attempts, |e| e.remaining(now, policy)),
            reset_after_secs: entry.map_or(0, |e| ceil_secs(e.reset_after(now))),
        }
    }

    fn remaining(&self, key: &str, policy: &RateLimitPolicy) -> u32 {
        let now = self.clock.now();
        self.lock()
            .get(key)
            .map_or(policy.max_attempts, |entry| entry.remaining(now, policy))
    }

    fn reset_after(&self, key: &str) -> u64 {
        let now = self.clock.now();
        self.lock()
            .get(key)
            .map_or(0, |entry| ceil_secs(entry.reset_after(now)))
    }

    fn clear(&self, key: &str) {
        self.lock().remove(key);
    }

    fn clear_all(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haven_core::ports::{ManualClock, Throttle};
    use std::time::Duration;

    fn limiter() -> (Arc<ManualClock>, InMemoryRateLimiter) {
        let clock = Arc::new(ManualClock::new());
        let limiter = InMemoryRateLimiter::with_clock(clock.clone());
        (clock, limiter)
    }

    fn policy() -> RateLimitPolicy {
        RateLimitPolicy::new(3, Duration::from_millis(1000))
            .with_block_duration(Duration::from_millis(2000))
    }

    #[test]
    fn test_allows_up_to_max_attempts() {
        let (_clock, limiter) = limiter();
        let cfg = policy();

        let results: Vec<bool> = (0..3).map(|_| limiter.check("k", &cfg)).collect();
        assert_eq!(results, vec![true, true, true]);
        assert!(!limiter.check("k", &cfg));
    }

    #[test]
    fn test_lockout_and_recovery() {
        let (clock, limiter) = limiter();
        let cfg = policy();

        for _ in 0..3 {
            assert!(limiter.check("k", &cfg));
        }
        assert!(!limiter.check("k", &cfg));
        assert_eq!(limiter.reset_after("k"), 2);

        clock.advance(Duration::from_millis(1500));
        assert!(!limiter.check("k", &cfg));
        assert_eq!(limiter.reset_after("k"), 1);

        clock.advance(Duration::from_millis(600));
        assert!(limiter.check("k", &cfg));
        assert_eq!(limiter.remaining("k", &cfg), 2);
    }

    #[test]
    fn test_blocked_check_does_not_mutate() {
        let (clock, limiter) = limiter();
        let cfg = policy();

        for _ in 0..4 {
            limiter.check("k", &cfg);
        }
        let before = limiter.lock().get("k").cloned();

        clock.advance(Duration::from_millis(100));
        for _ in 0..10 {
            assert!(!limiter.check("k", &cfg));
        }
        assert_eq!(limiter.lock().get("k").cloned(), before);
    }

    #[test]
    fn test_window_expiry_resets_count() {
        let (clock, limiter) = limiter();
        let cfg = policy();

        limiter.check("k", &cfg);
        limiter.check("k", &cfg);
        assert_eq!(limiter.remaining("k", &cfg), 1);

        clock.advance(Duration::from_millis(1001));
        assert_eq!(limiter.remaining("k", &cfg), 3);
        assert!(limiter.check("k", &cfg));
        assert_eq!(limiter.lock().get("k").map(|e| e.count), Some(1));
        assert_eq!(limiter.remaining("k", &cfg), 2);
    }

    #[test]
    fn test_window_boundary_is_inclusive() {
        let (clock, limiter) = limiter();
        let cfg = policy();

        limiter.check("k", &cfg);
        clock.advance(Duration::from_millis(1000));
        assert!(limiter.check("k", &cfg));
        assert_eq!(limiter.lock().get("k").map(|e| e.count), Some(2));
    }

    #[test]
    fn test_short_lockout_reblocks_inside_window() {
        let (clock, limiter) = limiter();
        let cfg = RateLimitPolicy::new(2, Duration::from_secs(10))
            .with_block_duration(Duration::from_secs(1));

        assert!(limiter.check("k", &cfg));
        assert!(limiter.check("k", &cfg));
        assert!(!limiter.check("k", &cfg));
        let first_block = limiter.lock().get("k").and_then(|e| e.blocked_until);

        // Lockout over, window still open: the count is already past the ceiling.
        clock.advance(Duration::from_millis(1100));
        assert!(!limiter.check("k", &cfg));

        let entry = limiter.lock().get("k").cloned().unwrap();
        assert_eq!(entry.count, 4);
        assert_eq!(entry.blocked_until, Some(clock.now() + Duration::from_secs(1)));
        assert_ne!(entry.blocked_until, first_block);
        assert_eq!(limiter.reset_after("k"), 1);
    }

    #[test]
    fn test_oversized_policy_does_not_panic() {
        let (_clock, limiter) = limiter();
        let huge = Duration::from_secs(u64::MAX);
        let cfg = RateLimitPolicy::new(1, huge).with_block_duration(huge);

        assert!(limiter.check("k", &cfg));
        assert!(!limiter.check("k", &cfg));
        assert!(limiter.reset_after("k") > 0);
    }

    #[test]
    fn test_default_lockout_is_twice_the_window() {
        let (clock, limiter) = limiter();
        let cfg = RateLimitPolicy::new(1, Duration::from_secs(60));

        assert!(limiter.check("search:global", &cfg));
        assert!(!limiter.check("search:global", &cfg));
        assert_eq!(limiter.reset_after("search:global"), 120);

        clock.advance(Duration::from_secs(119));
        assert!(!limiter.check("search:global", &cfg));
        clock.advance(Duration::from_secs(1));
        assert!(limiter.check("search:global", &cfg));
    }

    #[test]
    fn test_unseen_key() {
        let (_clock, limiter) = limiter();
        let cfg = RateLimitPolicy::new(5, Duration::from_secs(60));

        assert_eq!(limiter.remaining("unseen-key", &cfg), 5);
        assert_eq!(limiter.reset_after("unseen-key"), 0);
        assert!(limiter.is_empty());
    }

    #[test]
    fn test_remaining_reflects_state_after_check() {
        let (_clock, limiter) = limiter();
        let cfg = policy();

        assert!(limiter.check("fresh", &cfg));
        assert_eq!(limiter.remaining("fresh", &cfg), 2);
        assert_eq!(limiter.reset_after("fresh"), 1);
    }

    #[test]
    fn test_keys_are_independent() {
        let (_clock, limiter) = limiter();
        let cfg = policy();

        for _ in 0..4 {
            limiter.check("a", &cfg);
        }
        assert!(!limiter.check("a", &cfg));
        assert!(limiter.check("b", &cfg));
        assert_eq!(limiter.len(), 2);
    }

    #[test]
    fn test_clear_behaves_like_unseen() {
        let (_clock, limiter) = limiter();
        let cfg = policy();

        for _ in 0..4 {
            limiter.check("k", &cfg);
        }
        limiter.clear("k");
        limiter.clear("k");

        assert_eq!(limiter.remaining("k", &cfg), 3);
        assert!(limiter.check("k", &cfg));
        assert_eq!(limiter.remaining("k", &cfg), 2);
    }

    #[test]
    fn test_clear_all() {
        let (_clock, limiter) = limiter();
        let cfg = policy();

        limiter.check("a", &cfg);
        limiter.check("b", &cfg);
        limiter.clear_all();
        assert!(limiter.is_empty());
    }

    #[test]
    fn test_attempt_reports_state() {
        let (_clock, limiter) = limiter();
        let cfg = policy();

        let first = limiter.attempt("k", &cfg);
        assert!(first.allowed);
        assert_eq!(first.remaining, 2);

        limiter.attempt("k", &cfg);
        limiter.attempt("k", &cfg);
        let rejected = limiter.attempt("k", &cfg);
        assert!(!rejected.allowed);
        assert_eq!(rejected.remaining, 0);
        assert_eq!(rejected.reset_after_secs, 2);
    }

    #[test]
    fn test_throttle_binds_key_and_policy() {
        let (_clock, limiter) = limiter();
        let throttle = Throttle::new(&limiter, "password-reset:a@b.io", RateLimitPolicy::PASSWORD_RESET);

        assert_eq!(throttle.remaining(), 3);
        assert!(throttle.check());
        assert!(throttle.check());
        assert!(throttle.check());
        assert!(!throttle.check());
        assert_eq!(throttle.reset_after(), 2 * 60 * 60);

        throttle.clear();
        assert_eq!(throttle.remaining(), 3);
    }

    #[test]
    fn test_concurrent_checks_never_exceed_ceiling() {
        let limiter = Arc::new(InMemoryRateLimiter::new());
        let cfg = RateLimitPolicy::new(50, Duration::from_secs(60));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || (0..20).filter(|_| limiter.check("shared", &cfg)).count())
            })
            .collect();

        let allowed: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(allowed, 50);
    }

    #[test]
    fn test_concurrent_attempts_report_their_own_state() {
        let limiter = Arc::new(InMemoryRateLimiter::new());
        let cfg = RateLimitPolicy::new(50, Duration::from_secs(60));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let limiter = limiter.clone();
                std::thread::spawn(move || {
                    (0..20)
                        .map(|_| limiter.attempt("shared", &cfg))
                        .filter(|result| result.allowed)
                        .map(|result| result.remaining)
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut remaining: Vec<u32> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        remaining.sort_unstable();
        assert_eq!(remaining, (0..50).collect::<Vec<u32>>());
    }

    #[test]
    fn test_real_clock_lockout_expires() {
        let limiter = InMemoryRateLimiter::new();
        let cfg = policy();

        let results: Vec<bool> = (0..3).map(|_| limiter.check("k", &cfg)).collect();
        assert_eq!(results, vec![true, true, true]);
        assert!(!limiter.check("k", &cfg));
        assert_eq!(limiter.reset_after("k"), 2);

        std::thread::sleep(Duration::from_millis(2100));
        assert!(limiter.check("k", &cfg));
    }
}
