//! Provision Account Use Case
//!
//! Creates an active account for the external intake flow (contact
//! form, seed script). When no password is supplied, one is generated
//! and handed back to the caller for delivery.

use std::sync::Arc;

use platform::secret;

use crate::domain::entity::account::Account;
use crate::domain::repository::AccountStore;
use crate::domain::value_object::{
    account_role::AccountRole,
    credentials::{Password, SecretDigest},
    email::Email,
};
use crate::error::{AuthError, AuthResult};

/// Provision input
pub struct ProvisionAccountInput {
    pub email: String,
    pub name: String,
    /// When absent, a credential is generated
    pub password: Option<String>,
    pub role: AccountRole,
}

/// Provision output
pub struct ProvisionAccountOutput {
    pub account_id: String,
    /// Present only when the credential was generated here
    pub generated_password: Option<String>,
}

/// Provision account use case
pub struct ProvisionAccountUseCase<A>
where
    A: AccountStore,
{
    accounts: Arc<A>,
}

impl<A> ProvisionAccountUseCase<A>
where
    A: AccountStore,
{
    pub fn new(accounts: Arc<A>) -> Self {
        Self { accounts }
    }

    pub async fn execute(
        &self,
        input: ProvisionAccountInput,
    ) -> AuthResult<ProvisionAccountOutput> {
        let email =
            Email::new(&input.email).map_err(|_| AuthError::InvalidInput("malformed email"))?;
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AuthError::InvalidInput("name cannot be empty"));
        }

        if self.accounts.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let (password, generated_password) = match input.password {
            Some(raw) => {
                let password = Password::new(raw)
                    .map_err(|_| AuthError::InvalidInput("password does not meet policy"))?;
                (password, None)
            }
            None => {
                let generated = secret::generate_secret(secret::GENERATED_SECRET_LENGTH);
                let password = Password::new(generated.clone())
                    .map_err(|e| AuthError::Internal(format!("generated credential rejected: {e}")))?;
                (password, Some(generated))
            }
        };

        let digest = SecretDigest::from_password(&password);
        let account = Account::new(email, name, digest, input.role);
        self.accounts.create(&account).await?;

        tracing::info!(
            account_id = %account.account_id,
            role = %account.role,
            "Account provisioned"
        );

        Ok(ProvisionAccountOutput {
            account_id: account.account_id.to_string(),
            generated_password,
        })
    }
}
