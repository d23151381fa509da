//! Change Password Use Case
//!
//! Verifies the current secret, then replaces the stored digest
//! wholesale. Callers authenticate first via session resolution.

use std::sync::Arc;

use crate::domain::entity::account::Account;
use crate::domain::repository::AccountStore;
use crate::domain::value_object::credentials::{Password, SecretDigest};
use crate::error::{AuthError, AuthResult};

/// Change password input
pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

/// Change password use case
pub struct ChangePasswordUseCase<A>
where
    A: AccountStore,
{
    accounts: Arc<A>,
}

impl<A> ChangePasswordUseCase<A>
where
    A: AccountStore,
{
    pub fn new(accounts: Arc<A>) -> Self {
        Self { accounts }
    }

    pub async fn execute(&self, account: &Account, input: ChangePasswordInput) -> AuthResult<()> {
        let current = Password::unchecked(input.current_password);
        if !account.secret_digest.verify_password(&current) {
            return Err(AuthError::InvalidCredentials);
        }

        let new_password = Password::new(input.new_password)
            .map_err(|_| AuthError::InvalidInput("new password does not meet policy"))?;
        let digest = SecretDigest::from_password(&new_password);

        self.accounts
            .update_secret(&account.account_id, &digest)
            .await?;

        tracing::info!(account_id = %account.account_id, "Password changed");
        Ok(())
    }
}
