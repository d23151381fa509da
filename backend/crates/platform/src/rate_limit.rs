//! Lockout Policy Infrastructure
//!
//! Shared policy primitives for failure counting and temporary lockout.

use chrono::{DateTime, Duration, Utc};

/// Lockout policy configuration
#[derive(Debug, Clone)]
pub struct LockoutPolicy {
    /// Failures within the window before the lock engages
    pub max_failures: u32,
    /// Sliding window measured from the first recorded failure
    pub window: Duration,
    /// How long an engaged lock holds
    pub lockout: Duration,
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_failures: 5,
            window: Duration::minutes(15),
            lockout: Duration::minutes(15),
        }
    }
}

impl LockoutPolicy {
    pub fn new(max_failures: u32, window_secs: i64, lockout_secs: i64) -> Self {
        Self {
            max_failures,
            window: Duration::seconds(window_secs),
            lockout: Duration::seconds(lockout_secs),
        }
    }
}

/// Lock check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockStatus {
    pub locked: bool,
    pub retry_after_secs: Option<u64>,
}

impl LockStatus {
    /// Not locked
    pub fn open() -> Self {
        Self {
            locked: false,
            retry_after_secs: None,
        }
    }

    /// Locked until the given instant
    pub fn locked_until(until: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            locked: true,
            retry_after_secs: Some(retry_after_secs(until, now)),
        }
    }
}

/// Remaining lock time in whole seconds, rounded up
pub fn retry_after_secs(until: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let remaining_ms = (until - now).num_milliseconds().max(0) as u64;
    remaining_ms.div_ceil(1000)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = LockoutPolicy::default();
        assert_eq!(policy.max_failures, 5);
        assert_eq!(policy.window, Duration::minutes(15));
        assert_eq!(policy.lockout, Duration::minutes(15));
    }

    #[test]
    fn test_retry_after_rounds_up() {
        let now = Utc::now();
        assert_eq!(retry_after_secs(now + Duration::milliseconds(1), now), 1);
        assert_eq!(retry_after_secs(now + Duration::milliseconds(1000), now), 1);
        assert_eq!(retry_after_secs(now + Duration::milliseconds(1001), now), 2);
        assert_eq!(retry_after_secs(now + Duration::seconds(900), now), 900);
    }

    #[test]
    fn test_retry_after_past_is_zero() {
        let now = Utc::now();
        assert_eq!(retry_after_secs(now - Duration::seconds(5), now), 0);
    }

    #[test]
    fn test_lock_status() {
        let now = Utc::now();
        assert_eq!(LockStatus::open().locked, false);

        let status = LockStatus::locked_until(now + Duration::seconds(60), now);
        assert!(status.locked);
        assert_eq!(status.retry_after_secs, Some(60));
    }
}
