//! Administrator Two-Factor Login
//!
//! Two-step protocol: credential check issues an emailed one-time code,
//! code verification issues the `admin_session` token. There is no
//! server-side login-progress object - the state between the steps is
//! exactly the outstanding OTP record, so any handler instance can
//! serve either step and an abandoned second step costs nothing.

use std::sync::Arc;

use chrono::{Duration, Utc};
use platform::{secret, token};

use crate::application::config::AuthConfig;
use crate::application::throttle::ThrottleGuard;
use crate::domain::entity::account::Account;
use crate::domain::entity::otp_code::OtpCode;
use crate::domain::entity::throttle::{ThrottleKey, ThrottleScope};
use crate::domain::repository::{AccountStore, MailDispatcher, OtpStore, ThrottleStore};
use crate::domain::value_object::{claims::AdminClaims, credentials::Password, email::Email};
use crate::error::{AuthError, AuthResult};

/// Credential step input
pub struct AdminLoginInput {
    pub email: String,
    pub password: String,
}

/// Code verification step input
pub struct AdminVerifyInput {
    pub email: String,
    pub code: String,
}

/// Code verification step output
pub struct AdminVerifyOutput {
    /// Signed session token for the `admin_session` cookie
    pub session_token: String,
    /// The authenticated administrator
    pub account: Account,
}

/// Administrator login use case (both protocol steps)
pub struct AdminLoginUseCase<A, O, T, M>
where
    A: AccountStore,
    O: OtpStore,
    T: ThrottleStore,
    M: MailDispatcher,
{
    accounts: Arc<A>,
    otps: Arc<O>,
    throttle: ThrottleGuard<T>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
}

impl<A, O, T, M> AdminLoginUseCase<A, O, T, M>
where
    A: AccountStore,
    O: OtpStore,
    T: ThrottleStore,
    M: MailDispatcher,
{
    pub fn new(
        accounts: Arc<A>,
        otps: Arc<O>,
        throttle_store: Arc<T>,
        mailer: Arc<M>,
        config: Arc<AuthConfig>,
    ) -> Self {
        let throttle = ThrottleGuard::new(throttle_store, config.lockout.clone());
        Self {
            accounts,
            otps,
            throttle,
            mailer,
            config,
        }
    }

    /// Step 1: verify credentials and dispatch a one-time code
    ///
    /// Overwrites any prior outstanding code for the email. In
    /// soft-fail mode a dispatch failure is logged loudly and the step
    /// still reports success; in strict mode it is a server error.
    pub async fn start(&self, input: AdminLoginInput, origin: &str) -> AuthResult<()> {
        let email =
            Email::new(&input.email).map_err(|_| AuthError::InvalidInput("malformed email"))?;
        let password = Password::new(input.password)
            .map_err(|_| AuthError::InvalidInput("malformed password"))?;

        let key = ThrottleKey::new(ThrottleScope::AdminLogin, email.as_str(), origin);
        self.throttle.check(&key).await?;

        let account = self.accounts.find_by_email(&email).await?;
        let account = match account {
            Some(account) if account.is_admin() && account.can_login() => account,
            // Unknown, non-admin, or ineligible: burn a derivation so
            // timing does not separate these from a wrong password.
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

        let code = secret::generate_numeric_code();
        let otp = OtpCode::issue(
            email.clone(),
            &code,
            Duration::seconds(self.config.otp_ttl_secs()),
            Utc::now(),
        );
        self.otps.upsert(&otp).await?;

        let expiry_minutes = self.config.otp_ttl.as_secs() / 60;
        let subject = "Your sign-in code";
        let text = format!(
            "Your one-time sign-in code is {code}. It expires in {expiry_minutes} minutes. \
             If you did not request this code, you can ignore this message."
        );
        let html = format!(
            "<p>Your one-time sign-in code is <strong>{code}</strong>.</p>\
             <p>It expires in {expiry_minutes} minutes. If you did not request this code, \
             you can ignore this message.</p>"
        );

        if let Err(err) = self.mailer.send(&email, subject, &text, &html).await {
            if self.config.mail_soft_fail {
                // Loud on purpose: the caller will be told the code was
                // sent even though nothing was delivered.
                tracing::error!(
                    email = %email,
                    error = %err,
                    soft_fail = true,
                    "OTP email dispatch failed; code was NOT delivered"
                );
            } else {
                return Err(err);
            }
        }

        tracing::info!(account_id = %account.account_id, "Admin credential check passed, OTP issued");
        Ok(())
    }

    /// Step 2: verify the one-time code and issue the admin session
    pub async fn verify(
        &self,
        input: AdminVerifyInput,
        origin: &str,
    ) -> AuthResult<AdminVerifyOutput> {
        let email =
            Email::new(&input.email).map_err(|_| AuthError::InvalidInput("malformed email"))?;
        // A malformed code is an input error, not a failed attempt
        if input.code.len() != 4 || !input.code.chars().all(|c| c.is_ascii_digit()) {
            return Err(AuthError::InvalidInput("code must be exactly 4 digits"));
        }

        let key = ThrottleKey::new(ThrottleScope::AdminOtp, email.as_str(), origin);
        self.throttle.check(&key).await?;

        let now = Utc::now();
        let record = self.otps.find_by_email(&email).await?;
        let valid = matches!(
            &record,
            Some(otp) if !otp.is_expired(now) && otp.matches(&input.code)
        );
        if !valid {
            self.throttle.record_failure(&key).await?;
            return Err(AuthError::InvalidCode);
        }

        self.throttle.clear(&key).await?;
        // Single-use: the record is gone before the session exists
        self.otps.delete_by_email(&email).await?;

        let account = self.accounts.find_by_email(&email).await?;
        let account = match account {
            Some(account) if account.is_admin() && account.can_login() => account,
            // Account removed or disabled between the two steps
            _ => {
                tracing::warn!(email = %email, "Admin account ineligible at OTP verification");
                return Err(AuthError::InvalidCode);
            }
        };

        self.accounts.record_login(&account.account_id, now).await?;

        let claims = AdminClaims::for_account(&account);
        let session_token = token::issue(
            claims,
            &self.config.token_secret,
            self.config.admin_session_ttl_secs(),
        )
        .map_err(|e| AuthError::Internal(format!("token issuance failed: {e}")))?;

        tracing::info!(account_id = %account.account_id, "Admin signed in");

        Ok(AdminVerifyOutput {
            session_token,
            account,
        })
    }
}
