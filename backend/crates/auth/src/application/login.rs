//! Member Login Use Case
//!
//! Single-factor login for portal members: throttle check, digest
//! verification, throttle bookkeeping, stateless session token.
//!
//! Ordering is load-bearing: the throttle check happens before the
//! credential check, the throttle write before token issuance.

use std::sync::Arc;

use chrono::Utc;
use platform::{secret, token};

use crate::application::config::AuthConfig;
use crate::application::throttle::ThrottleGuard;
use crate::domain::entity::account::Account;
use crate::domain::entity::throttle::{ThrottleKey, ThrottleScope};
use crate::domain::repository::{AccountStore, ThrottleStore};
use crate::domain::value_object::{claims::UserClaims, credentials::Password, email::Email};
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    pub email: String,
    pub password: String,
}

/// Login output
pub struct LoginOutput {
    /// Signed session token for the `auth_session` cookie
    pub session_token: String,
    /// The authenticated account
    pub account: Account,
}

/// Member login use case
pub struct LoginUseCase<A, T>
where
    A: AccountStore,
    T: ThrottleStore,
{
    accounts: Arc<A>,
    throttle: ThrottleGuard<T>,
    config: Arc<AuthConfig>,
}

impl<A, T> LoginUseCase<A, T>
where
    A: AccountStore,
    T: ThrottleStore,
{
    pub fn new(accounts: Arc<A>, throttle_store: Arc<T>, config: Arc<AuthConfig>) -> Self {
        let throttle = ThrottleGuard::new(throttle_store, config.lockout.clone());
        Self {
            accounts,
            throttle,
            config,
        }
    }

    pub async fn execute(&self, input: LoginInput, origin: &str) -> AuthResult<LoginOutput> {
        let email =
            Email::new(&input.email).map_err(|_| AuthError::InvalidInput("malformed email"))?;
        let password = Password::new(input.password)
            .map_err(|_| AuthError::InvalidInput("malformed password"))?;

        let key = ThrottleKey::new(ThrottleScope::UserLogin, email.as_str(), origin);
        self.throttle.check(&key).await?;

        let account = self.accounts.find_by_email(&email).await?;
        let account = match account {
            Some(account) if account.can_login() => account,
            // Unknown or ineligible account: burn a full derivation so
            // response timing does not reveal whether the email exists.
            _ => {
                secret::dummy_digest().verify(password.inner());
                self.throttle.record_failure(&key).await?;
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !account.secret_digest.verify_password(&password) {
            self.throttle.record_failure(&key).await?;
            return Err(AuthError::InvalidCredentials);
        }

        self.throttle.clear(&key).await?;
        self.accounts
            .record_login(&account.account_id, Utc::now())
            .await?;

        let claims = UserClaims::for_account(&account);
        let session_token = token::issue(
            claims,
            &self.config.token_secret,
            self.config.user_session_ttl_secs(),
        )
        .map_err(|e| AuthError::Internal(format!("token issuance failed: {e}")))?;

        tracing::info!(account_id = %account.account_id, "Member signed in");

        Ok(LoginOutput {
            session_token,
            account,
        })
    }
}
