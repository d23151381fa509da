//! Account Entity
//!
//! One account shape serves both members and administrators; the role
//! decides which login protocol applies. The login bookkeeping fields
//! are mutated on every successful login and never read for
//! authorization decisions.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    account_id::AccountId, account_role::AccountRole, account_status::AccountStatus,
    credentials::SecretDigest, email::Email,
};

/// Account entity
#[derive(Debug, Clone)]
pub struct Account {
    /// Opaque, stable identifier
    pub account_id: AccountId,
    /// Normalized email (unique key)
    pub email: Email,
    /// Display name (carried into member session claims)
    pub name: String,
    /// Stored secret digest, replaced wholesale on password change
    pub secret_digest: SecretDigest,
    /// Member or administrator
    pub role: AccountRole,
    /// Only Active accounts may obtain a session
    pub status: AccountStatus,
    /// Last successful login time
    pub last_login_at: Option<DateTime<Utc>>,
    /// Successful login counter
    pub login_count: i64,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new active account
    pub fn new(email: Email, name: String, secret_digest: SecretDigest, role: AccountRole) -> Self {
        let now = Utc::now();
        Self {
            account_id: AccountId::new(),
            email,
            name,
            secret_digest,
            role,
            status: AccountStatus::default(),
            last_login_at: None,
            login_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record a successful login
    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login_at = Some(now);
        self.login_count += 1;
        self.updated_at = now;
    }

    /// Check if the account may obtain a session
    pub fn can_login(&self) -> bool {
        self.status.can_login()
    }

    /// Check if the account is an administrator
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Replace the secret digest (password change)
    pub fn replace_secret(&mut self, digest: SecretDigest, now: DateTime<Utc>) {
        self.secret_digest = digest;
        self.updated_at = now;
    }

    /// Update account status (admin action)
    pub fn set_status(&mut self, status: AccountStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account() -> Account {
        Account::new(
            Email::new("person@example.com").unwrap(),
            "Person".to_string(),
            SecretDigest::from_stored("00:00"),
            AccountRole::Member,
        )
    }

    #[test]
    fn test_new_account_is_active() {
        let account = account();
        assert_eq!(account.status, AccountStatus::Active);
        assert!(account.can_login());
        assert_eq!(account.login_count, 0);
        assert!(account.last_login_at.is_none());
    }

    #[test]
    fn test_record_login_advances_bookkeeping() {
        let mut account = account();
        let now = Utc::now();

        account.record_login(now);
        assert_eq!(account.last_login_at, Some(now));
        assert_eq!(account.login_count, 1);

        account.record_login(now);
        assert_eq!(account.login_count, 2);
    }

    #[test]
    fn test_status_gates_login() {
        let mut account = account();
        let now = Utc::now();

        account.set_status(AccountStatus::Disabled, now);
        assert!(!account.can_login());

        account.set_status(AccountStatus::Pending, now);
        assert!(!account.can_login());

        account.set_status(AccountStatus::Active, now);
        assert!(account.can_login());
    }
}
