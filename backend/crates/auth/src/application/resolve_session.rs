//! Session Resolution Use Case
//!
//! Recovers the caller's account from the session cookie. Read-only and
//! idempotent: login timestamps and throttle state are mutated only by
//! the login endpoints, never here. Every privileged operation calls
//! this once per request and treats any non-account outcome as deny.

use std::sync::Arc;

use axum::http::HeaderMap;
use platform::{cookie, token};

use crate::application::config::AuthConfig;
use crate::domain::entity::account::Account;
use crate::domain::repository::AccountStore;
use crate::domain::value_object::account_id::AccountId;
use crate::domain::value_object::claims::{AdminClaims, UserClaims};
use crate::error::{AuthError, AuthResult};

/// A resolved, still-eligible session
pub struct ResolvedSession {
    pub account: Account,
    /// Token expiry, Unix seconds
    pub expires_at: i64,
}

/// Session resolution use case
pub struct ResolveSessionUseCase<A>
where
    A: AccountStore,
{
    accounts: Arc<A>,
    config: Arc<AuthConfig>,
}

impl<A> ResolveSessionUseCase<A>
where
    A: AccountStore,
{
    pub fn new(accounts: Arc<A>, config: Arc<AuthConfig>) -> Self {
        Self { accounts, config }
    }

    /// Resolve the member session from the `auth_session` cookie
    pub async fn resolve_user(&self, headers: &HeaderMap) -> AuthResult<ResolvedSession> {
        let raw = cookie::extract_cookie(headers, &self.config.user_cookie_name)
            .ok_or(AuthError::SessionInvalid)?;

        let claims = token::verify::<UserClaims>(&raw, &self.config.token_secret)
            .map_err(|_| AuthError::SessionInvalid)?;

        let account_id = claims.body.account_id().ok_or(AuthError::SessionInvalid)?;
        let account = self.load_eligible(&account_id).await?;

        Ok(ResolvedSession {
            account,
            expires_at: claims.exp,
        })
    }

    /// Resolve the administrator session from the `admin_session` cookie
    ///
    /// Requires the `"admin"` role claim in the token and the Admin role
    /// on the backing account - the account status and role are
    /// re-checked on every request rather than trusted from the token.
    pub async fn resolve_admin(&self, headers: &HeaderMap) -> AuthResult<ResolvedSession> {
        let raw = cookie::extract_cookie(headers, &self.config.admin_cookie_name)
            .ok_or(AuthError::SessionInvalid)?;

        let claims = token::verify::<AdminClaims>(&raw, &self.config.token_secret)
            .map_err(|_| AuthError::SessionInvalid)?;

        if !claims.body.is_admin_role() {
            return Err(AuthError::SessionInvalid);
        }

        let account_id = claims.body.account_id().ok_or(AuthError::SessionInvalid)?;
        let account = self.load_eligible(&account_id).await?;
        if !account.is_admin() {
            return Err(AuthError::SessionInvalid);
        }

        Ok(ResolvedSession {
            account,
            expires_at: claims.exp,
        })
    }

    async fn load_eligible(&self, account_id: &AccountId) -> AuthResult<Account> {
        let account = self
            .accounts
            .find_by_id(account_id)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        if !account.can_login() {
            return Err(AuthError::SessionInvalid);
        }
        Ok(account)
    }
}
