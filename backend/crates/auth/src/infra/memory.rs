//! In-Memory Store Implementation
//!
//! Backs the scenario tests and credential-less local development.
//! Same trait surface as the Postgres store, with plain maps behind
//! async mutexes.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::domain::entity::{account::Account, otp_code::OtpCode, throttle::ThrottleRecord};
use crate::domain::repository::{AccountStore, OtpStore, ThrottleStore};
use crate::domain::value_object::{account_id::AccountId, credentials::SecretDigest, email::Email};
use crate::error::AuthResult;

/// In-memory auth store
#[derive(Clone, Default)]
pub struct InMemoryAuthStore {
    accounts: Arc<Mutex<HashMap<Uuid, Account>>>,
    otps: Arc<Mutex<HashMap<String, OtpCode>>>,
    throttles: Arc<Mutex<HashMap<String, ThrottleRecord>>>,
}

impl InMemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace an account wholesale (test setup)
    pub async fn put_account(&self, account: Account) {
        self.accounts
            .lock()
            .await
            .insert(*account.account_id.as_uuid(), account);
    }
}

impl AccountStore for InMemoryAuthStore {
    async fn create(&self, account: &Account) -> AuthResult<()> {
        self.accounts
            .lock()
            .await
            .insert(*account.account_id.as_uuid(), account.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>> {
        let accounts = self.accounts.lock().await;
        Ok(accounts
            .values()
            .find(|a| a.email == *email)
            .cloned())
    }

    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>> {
        let accounts = self.accounts.lock().await;
        Ok(accounts.get(account_id.as_uuid()).cloned())
    }

    async fn record_login(&self, account_id: &AccountId, at: DateTime<Utc>) -> AuthResult<()> {
        let mut accounts = self.accounts.lock().await;
        if let Some(account) = accounts.get_mut(account_id.as_uuid()) {
            account.record_login(at);
        }
        Ok(())
    }

    async fn update_secret(
        &self,
        account_id: &AccountId,
        digest: &SecretDigest,
    ) -> AuthResult<()> {
        let mut accounts = self.accounts.lock().await;
        if let Some(account) = accounts.get_mut(account_id.as_uuid()) {
            account.replace_secret(digest.clone(), Utc::now());
        }
        Ok(())
    }
}

impl OtpStore for InMemoryAuthStore {
    async fn upsert(&self, code: &OtpCode) -> AuthResult<()> {
        self.otps
            .lock()
            .await
            .insert(code.email.as_str().to_string(), code.clone());
        Ok(())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<OtpCode>> {
        Ok(self.otps.lock().await.get(email.as_str()).cloned())
    }

    async fn delete_by_email(&self, email: &Email) -> AuthResult<()> {
        self.otps.lock().await.remove(email.as_str());
        Ok(())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut otps = self.otps.lock().await;
        let before = otps.len();
        otps.retain(|_, otp| !otp.is_expired(now));
        Ok((before - otps.len()) as u64)
    }
}

impl ThrottleStore for InMemoryAuthStore {
    async fn find_by_key(&self, key: &str) -> AuthResult<Option<ThrottleRecord>> {
        Ok(self.throttles.lock().await.get(key).cloned())
    }

    async fn upsert(&self, record: &ThrottleRecord) -> AuthResult<()> {
        self.throttles
            .lock()
            .await
            .insert(record.key.clone(), record.clone());
        Ok(())
    }

    async fn delete_by_key(&self, key: &str) -> AuthResult<()> {
        self.throttles.lock().await.remove(key);
        Ok(())
    }

    async fn delete_stale(&self, before: DateTime<Utc>) -> AuthResult<u64> {
        let mut throttles = self.throttles.lock().await;
        let len = throttles.len();
        throttles.retain(|_, record| record.last_failure_at >= before);
        Ok((len - throttles.len()) as u64)
    }
}
