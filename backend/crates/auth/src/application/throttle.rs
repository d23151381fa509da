//! Throttle Guard
//!
//! Application service wrapping the throttle store with the lockout
//! policy: check before credential evaluation, record after, clear on
//! success.
//!
//! Two concurrent failures for one key can both read the record before
//! either writes it and undercount by one. That is accepted: this is a
//! deterrent, not a hard security boundary, and cross-request locking
//! would cost more than the imprecision does.

use std::sync::Arc;

use chrono::Utc;
use platform::rate_limit::LockoutPolicy;

use crate::domain::entity::throttle::{ThrottleKey, ThrottleRecord};
use crate::domain::repository::ThrottleStore;
use crate::error::{AuthError, AuthResult};

/// Throttle guard service
pub struct ThrottleGuard<S>
where
    S: ThrottleStore,
{
    store: Arc<S>,
    policy: LockoutPolicy,
}

impl<S> ThrottleGuard<S>
where
    S: ThrottleStore,
{
    pub fn new(store: Arc<S>, policy: LockoutPolicy) -> Self {
        Self { store, policy }
    }

    /// Refuse the attempt if the key is currently locked
    ///
    /// Must run before any credential evaluation. The error carries a
    /// retry-after hint, never whether the unseen attempt would have
    /// succeeded.
    pub async fn check(&self, key: &ThrottleKey) -> AuthResult<()> {
        let Some(record) = self.store.find_by_key(key.as_str()).await? else {
            return Ok(());
        };

        let status = record.lock_status(Utc::now());
        if status.locked {
            return Err(AuthError::TooManyAttempts {
                retry_after_secs: status.retry_after_secs.unwrap_or(0),
            });
        }
        Ok(())
    }

    /// Record one failed attempt for the key
    pub async fn record_failure(&self, key: &ThrottleKey) -> AuthResult<()> {
        let now = Utc::now();
        let mut record = self
            .store
            .find_by_key(key.as_str())
            .await?
            .unwrap_or_else(|| ThrottleRecord::new(key, now));

        record.register_failure(&self.policy, now);
        self.store.upsert(&record).await?;

        if record.lock_status(now).locked {
            tracing::warn!(
                key = %key,
                failures = record.failure_count,
                "Throttle lock engaged"
            );
        }
        Ok(())
    }

    /// Forget the key entirely (successful authentication)
    pub async fn clear(&self, key: &ThrottleKey) -> AuthResult<()> {
        self.store.delete_by_key(key.as_str()).await
    }
}
