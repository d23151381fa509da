//! Throttle Entity
//!
//! Per-identity-and-origin failure counter with a sliding window and
//! temporary lockout. The mechanism is identity-agnostic: member login,
//! admin login, and admin OTP verification share it through scoped key
//! prefixes. Exactly `max_failures` attempts are evaluated - the
//! attempt that records the final failure engages the lock, and the
//! following attempt is refused before credentials are looked at.

use std::fmt;

use chrono::{DateTime, Utc};
use platform::rate_limit::{LockStatus, LockoutPolicy};

/// Call sites sharing the throttle, kept in separate keyspaces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleScope {
    UserLogin,
    AdminLogin,
    AdminOtp,
}

impl ThrottleScope {
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::UserLogin => "",
            Self::AdminLogin => "admin:",
            Self::AdminOtp => "admin-otp:",
        }
    }
}

/// Composite throttle key: `[scope:]identity|origin`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ThrottleKey(String);

impl ThrottleKey {
    pub fn new(scope: ThrottleScope, identity: &str, origin: &str) -> Self {
        Self(format!("{}{}|{}", scope.prefix(), identity, origin))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThrottleKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Failure counter record for one throttle key
#[derive(Debug, Clone)]
pub struct ThrottleRecord {
    pub key: String,
    pub failure_count: u32,
    pub first_failure_at: DateTime<Utc>,
    pub last_failure_at: DateTime<Utc>,
    pub locked_until: Option<DateTime<Utc>>,
}

impl ThrottleRecord {
    /// Fresh record with no failures yet
    pub fn new(key: &ThrottleKey, now: DateTime<Utc>) -> Self {
        Self {
            key: key.as_str().to_string(),
            failure_count: 0,
            first_failure_at: now,
            last_failure_at: now,
            locked_until: None,
        }
    }

    /// Record one failed attempt
    ///
    /// Restarts the count at 1 once the sliding window since
    /// `first_failure_at` has fully elapsed; otherwise increments. The
    /// lock engages when the count reaches the policy maximum and is
    /// cleared again by a later window restart.
    pub fn register_failure(&mut self, policy: &LockoutPolicy, now: DateTime<Utc>) {
        if now - self.first_failure_at >= policy.window {
            self.failure_count = 1;
            self.first_failure_at = now;
        } else {
            self.failure_count += 1;
        }

        self.locked_until = if self.failure_count >= policy.max_failures {
            Some(now + policy.lockout)
        } else {
            None
        };
        self.last_failure_at = now;
    }

    /// Current lock state
    pub fn lock_status(&self, now: DateTime<Utc>) -> LockStatus {
        match self.locked_until {
            Some(until) if until > now => LockStatus::locked_until(until, now),
            _ => LockStatus::open(),
        }
    }
}
