use std::ops::Range;
use std::time::Duration;

use rand::Rng;

/// Retry schedule for one API request: linearly increasing backoff plus a
/// uniform jitter drawn fresh for every delay. Non-zero API codes and
/// transport failures are retried identically under this policy.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub jitter_ms: Range<u64>,
}

impl RetryPolicy {
    /// Policy for the cursor-based top-level comment walk.
    pub fn main_walk() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(1200),
            jitter_ms: 300..800,
        }
    }

    /// Policy for nested-reply pages, slightly gentler than the main walk.
    pub fn nested_walk() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(900),
            jitter_ms: 300..800,
        }
    }

    /// Policy for the danmaku endpoints: no growth, just a paced re-request.
    pub fn danmaku() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::ZERO,
            jitter_ms: 1000..2000,
        }
    }

    /// A single attempt, no delays. Used for endpoints the caller treats as
    /// best-effort and for tests.
    pub fn once() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            jitter_ms: 0..1,
        }
    }

    /// Delay to sleep after failed attempt number `attempt` (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let jitter = Duration::from_millis(rand::rng().random_range(self.jitter_ms.clone()));
        self.base_delay * attempt + jitter
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::main_walk()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_grows_linearly_with_attempt() {
        let policy = RetryPolicy {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            jitter_ms: 0..1,
        };
        assert_eq!(policy.delay_after(1), Duration::from_millis(100));
        assert_eq!(policy.delay_after(3), Duration::from_millis(300));
    }

    #[test]
    fn jitter_stays_inside_range() {
        let policy = RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::ZERO,
            jitter_ms: 300..800,
        };
        for _ in 0..16 {
            let d = policy.delay_after(1);
            assert!(d >= Duration::from_millis(300));
            assert!(d < Duration::from_millis(800));
        }
    }

    #[test]
    fn once_never_sleeps_meaningfully() {
        let policy = RetryPolicy::once();
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.delay_after(1), Duration::ZERO);
    }
}
