//! One-Time Code Entity
//!
//! Emailed second factor for administrator login. At most one live
//! record per email (the store upserts by email); deleted on first
//! successful verification. Expiry is checked at verify time, so
//! background reaping is housekeeping, not correctness.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::{credentials::SecretDigest, email::Email};

/// Outstanding one-time code record
#[derive(Debug, Clone)]
pub struct OtpCode {
    /// Owning email (unique)
    pub email: Email,
    /// Digest of the 4-digit code (same primitive as passwords)
    pub code_digest: SecretDigest,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Hard expiry (created_at + TTL)
    pub expires_at: DateTime<Utc>,
}

impl OtpCode {
    /// Issue a record for a freshly generated code
    pub fn issue(email: Email, code: &str, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            email,
            code_digest: SecretDigest::from_code(code),
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Check if the code is past its TTL
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Verify a submitted code against the stored digest
    pub fn matches(&self, code: &str) -> bool {
        self.code_digest.verify_code(code)
    }
}
