//! Store Traits
//!
//! Interfaces for the external document stores and the mail
//! collaborator. Implementations live in the infrastructure layer.

use chrono::{DateTime, Utc};

use crate::domain::entity::{account::Account, otp_code::OtpCode, throttle::ThrottleRecord};
use crate::domain::value_object::{
    account_id::AccountId, credentials::SecretDigest, email::Email,
};
use crate::error::AuthResult;

/// Account store trait
///
/// Keyed uniquely by normalized email. The typed update methods are the
/// only field mutations this core performs.
#[trait_variant::make(AccountStore: Send)]
pub trait LocalAccountStore {
    /// Create a new account
    async fn create(&self, account: &Account) -> AuthResult<()>;

    /// Find account by normalized email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Account>>;

    /// Find account by ID
    async fn find_by_id(&self, account_id: &AccountId) -> AuthResult<Option<Account>>;

    /// Advance last-login timestamp and counter
    async fn record_login(&self, account_id: &AccountId, at: DateTime<Utc>) -> AuthResult<()>;

    /// Replace the stored secret digest
    async fn update_secret(&self, account_id: &AccountId, digest: &SecretDigest)
    -> AuthResult<()>;
}

/// One-time code store trait
///
/// At most one live record per email; `upsert` overwrites any prior
/// outstanding code.
#[trait_variant::make(OtpStore: Send)]
pub trait LocalOtpStore {
    /// Create or overwrite the record for an email
    async fn upsert(&self, code: &OtpCode) -> AuthResult<()>;

    /// Find the outstanding record for an email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<OtpCode>>;

    /// Delete the record for an email (single-use consumption)
    async fn delete_by_email(&self, email: &Email) -> AuthResult<()>;

    /// Housekeeping: delete expired records, returning the count
    async fn delete_expired(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

/// Throttle store trait
#[trait_variant::make(ThrottleStore: Send)]
pub trait LocalThrottleStore {
    /// Find the record for a key
    async fn find_by_key(&self, key: &str) -> AuthResult<Option<ThrottleRecord>>;

    /// Create or replace the record for a key (atomic where supported)
    async fn upsert(&self, record: &ThrottleRecord) -> AuthResult<()>;

    /// Delete the record for a key (successful authentication)
    async fn delete_by_key(&self, key: &str) -> AuthResult<()>;

    /// Housekeeping: delete records untouched since `before`
    async fn delete_stale(&self, before: DateTime<Utc>) -> AuthResult<u64>;
}

/// Mail dispatch collaborator
///
/// Delivery transport is out of scope; whether a failure here is fatal
/// is the caller's decision (strict vs soft-fail mode).
#[trait_variant::make(MailDispatcher: Send)]
pub trait LocalMailDispatcher {
    /// Send a message to one recipient
    async fn send(&self, to: &Email, subject: &str, text: &str, html: &str) -> AuthResult<()>;
}
