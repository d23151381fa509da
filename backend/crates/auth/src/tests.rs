//! Scenario tests for the auth crate
//!
//! Drive the use cases end-to-end against the in-memory stores.

#[cfg(test)]
mod scenario_tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use axum::http::{HeaderMap, HeaderValue, header};
    use chrono::{Duration, Utc};
    use platform::token;
    use tokio::sync::Mutex;

    use crate::application::config::AuthConfig;
    use crate::application::{
        AdminLoginInput, AdminLoginUseCase, AdminVerifyInput, ChangePasswordInput,
        ChangePasswordUseCase, LoginInput, LoginUseCase, ProvisionAccountInput,
        ProvisionAccountUseCase, ResolveSessionUseCase,
    };
    use crate::domain::entity::account::Account;
    use crate::domain::entity::otp_code::OtpCode;
    use crate::domain::repository::{AccountStore, MailDispatcher, OtpStore, ThrottleStore};
    use crate::domain::value_object::{
        account_role::AccountRole,
        account_status::AccountStatus,
        claims::{AdminClaims, UserClaims},
        credentials::{Password, SecretDigest},
        email::Email,
    };
    use crate::error::{AuthError, AuthResult};
    use crate::infra::memory::InMemoryAuthStore;

    const ORIGIN: &str = "203.0.113.9";
    const MEMBER_EMAIL: &str = "resident@example.com";
    const ADMIN_EMAIL: &str = "warden@example.com";
    const PASSWORD: &str = "CorrectBattery9!";

    // ========================================================================
    // Test doubles and harness
    // ========================================================================

    /// Mail dispatcher that records messages instead of sending them
    #[derive(Clone, Default)]
    struct RecordingMailer {
        sent: Arc<Mutex<Vec<(String, String)>>>,
        fail: Arc<AtomicBool>,
    }

    impl RecordingMailer {
        fn failing() -> Self {
            let mailer = Self::default();
            mailer.fail.store(true, Ordering::SeqCst);
            mailer
        }

        async fn last_text(&self) -> Option<String> {
            self.sent.lock().await.last().map(|(_, text)| text.clone())
        }

        async fn sent_count(&self) -> usize {
            self.sent.lock().await.len()
        }
    }

    impl MailDispatcher for RecordingMailer {
        async fn send(
            &self,
            to: &Email,
            _subject: &str,
            text: &str,
            _html: &str,
        ) -> AuthResult<()> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(AuthError::Mail("dispatch refused".to_string()));
            }
            self.sent
                .lock()
                .await
                .push((to.to_string(), text.to_string()));
            Ok(())
        }
    }

    struct Harness {
        store: Arc<InMemoryAuthStore>,
        mailer: Arc<RecordingMailer>,
        config: Arc<AuthConfig>,
    }

    impl Harness {
        fn new() -> Self {
            Self::build(RecordingMailer::default(), AuthConfig::development())
        }

        fn build(mailer: RecordingMailer, config: AuthConfig) -> Self {
            Self {
                store: Arc::new(InMemoryAuthStore::new()),
                mailer: Arc::new(mailer),
                config: Arc::new(config),
            }
        }

        fn login_use_case(&self) -> LoginUseCase<InMemoryAuthStore, InMemoryAuthStore> {
            LoginUseCase::new(self.store.clone(), self.store.clone(), self.config.clone())
        }

        fn admin_use_case(
            &self,
        ) -> AdminLoginUseCase<
            InMemoryAuthStore,
            InMemoryAuthStore,
            InMemoryAuthStore,
            RecordingMailer,
        > {
            AdminLoginUseCase::new(
                self.store.clone(),
                self.store.clone(),
                self.store.clone(),
                self.mailer.clone(),
                self.config.clone(),
            )
        }

        fn resolver(&self) -> ResolveSessionUseCase<InMemoryAuthStore> {
            ResolveSessionUseCase::new(self.store.clone(), self.config.clone())
        }

        async fn seed(&self, email: &str, password: &str, role: AccountRole) -> Account {
            let digest =
                SecretDigest::from_password(&Password::new(password.to_string()).unwrap());
            let account = Account::new(
                Email::new(email).unwrap(),
                "Test Person".to_string(),
                digest,
                role,
            );
            AccountStore::create(self.store.as_ref(), &account)
                .await
                .unwrap();
            account
        }

        async fn login(&self, email: &str, password: &str) -> AuthResult<String> {
            let output = self
                .login_use_case()
                .execute(
                    LoginInput {
                        email: email.to_string(),
                        password: password.to_string(),
                    },
                    ORIGIN,
                )
                .await?;
            Ok(output.session_token)
        }

        async fn admin_start(&self, email: &str, password: &str) -> AuthResult<()> {
            self.admin_use_case()
                .start(
                    AdminLoginInput {
                        email: email.to_string(),
                        password: password.to_string(),
                    },
                    ORIGIN,
                )
                .await
        }

        async fn admin_verify(&self, email: &str, code: &str) -> AuthResult<String> {
            let output = self
                .admin_use_case()
                .verify(
                    AdminVerifyInput {
                        email: email.to_string(),
                        code: code.to_string(),
                    },
                    ORIGIN,
                )
                .await?;
            Ok(output.session_token)
        }

        /// The dispatched 4-digit code, parsed from the captured mail
        async fn mailed_code(&self) -> String {
            let text = self.mailer.last_text().await.expect("no mail captured");
            text.chars().filter(|c| c.is_ascii_digit()).take(4).collect()
        }
    }

    fn cookie_headers(name: &str, token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{name}={token}")).unwrap(),
        );
        headers
    }

    // ========================================================================
    // Member login
    // ========================================================================

    #[tokio::test]
    async fn member_login_issues_week_long_user_token() {
        let harness = Harness::new();
        let account = harness.seed(MEMBER_EMAIL, PASSWORD, AccountRole::Member).await;

        let session_token = harness.login(MEMBER_EMAIL, PASSWORD).await.unwrap();

        let claims = token::verify::<UserClaims>(&session_token, &harness.config.token_secret)
            .unwrap();
        assert_eq!(claims.body.sub, account.account_id.to_string());
        assert_eq!(claims.body.email, MEMBER_EMAIL);
        assert_eq!(claims.body.name, "Test Person");
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);

        // Login bookkeeping advanced
        let stored = AccountStore::find_by_email(
            harness.store.as_ref(),
            &Email::new(MEMBER_EMAIL).unwrap(),
        )
        .await
        .unwrap()
        .unwrap();
        assert_eq!(stored.login_count, 1);
        assert!(stored.last_login_at.is_some());
    }

    #[tokio::test]
    async fn member_login_normalizes_email() {
        let harness = Harness::new();
        harness.seed(MEMBER_EMAIL, PASSWORD, AccountRole::Member).await;

        let result = harness.login("  Resident@EXAMPLE.com ", PASSWORD).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn member_login_failures_are_generic() {
        let harness = Harness::new();
        harness.seed(MEMBER_EMAIL, PASSWORD, AccountRole::Member).await;

        // Wrong password and unknown email collapse to the same outcome
        let wrong = harness.login(MEMBER_EMAIL, "WrongBattery9!").await;
        assert!(matches!(wrong, Err(AuthError::InvalidCredentials)));

        let unknown = harness.login("nobody@example.com", PASSWORD).await;
        assert!(matches!(unknown, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn unknown_email_still_records_throttle_failure() {
        let harness = Harness::new();

        let _ = harness.login("nobody@example.com", PASSWORD).await;

        let record = ThrottleStore::find_by_key(
            harness.store.as_ref(),
            &format!("nobody@example.com|{ORIGIN}"),
        )
        .await
        .unwrap()
        .expect("failure should be recorded");
        assert_eq!(record.failure_count, 1);
    }

    #[tokio::test]
    async fn ineligible_account_cannot_login() {
        let harness = Harness::new();
        let mut account = harness.seed(MEMBER_EMAIL, PASSWORD, AccountRole::Member).await;
        account.set_status(AccountStatus::Disabled, Utc::now());
        harness.store.put_account(account).await;

        // Correct password, disabled account - still the generic outcome
        let result = harness.login(MEMBER_EMAIL, PASSWORD).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    // ========================================================================
    // Throttling (scenario B)
    // ========================================================================

    #[tokio::test]
    async fn sixth_attempt_is_refused_even_with_correct_password() {
        let harness = Harness::new();
        harness.seed(MEMBER_EMAIL, PASSWORD, AccountRole::Member).await;

        for _ in 0..5 {
            let result = harness.login(MEMBER_EMAIL, "WrongBattery9!").await;
            assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        }

        // The lock engaged on the fifth failure; the sixth attempt is
        // refused before credentials are evaluated.
        let result = harness.login(MEMBER_EMAIL, PASSWORD).await;
        match result {
            Err(AuthError::TooManyAttempts { retry_after_secs }) => {
                assert!(retry_after_secs > 0);
            }
            other => panic!("expected TooManyAttempts, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn four_failures_do_not_lock() {
        let harness = Harness::new();
        harness.seed(MEMBER_EMAIL, PASSWORD, AccountRole::Member).await;

        for _ in 0..4 {
            let _ = harness.login(MEMBER_EMAIL, "WrongBattery9!").await;
        }

        assert!(harness.login(MEMBER_EMAIL, PASSWORD).await.is_ok());
    }

    #[tokio::test]
    async fn success_clears_the_throttle_record() {
        let harness = Harness::new();
        harness.seed(MEMBER_EMAIL, PASSWORD, AccountRole::Member).await;

        for _ in 0..3 {
            let _ = harness.login(MEMBER_EMAIL, "WrongBattery9!").await;
        }
        harness.login(MEMBER_EMAIL, PASSWORD).await.unwrap();

        let record = ThrottleStore::find_by_key(
            harness.store.as_ref(),
            &format!("{MEMBER_EMAIL}|{ORIGIN}"),
        )
        .await
        .unwrap();
        assert!(record.is_none(), "success should delete the record");
    }

    // ========================================================================
    // Admin two-factor login (scenario A)
    // ========================================================================

    #[tokio::test]
    async fn admin_two_step_login_issues_admin_token() {
        let harness = Harness::new();
        let account = harness.seed(ADMIN_EMAIL, PASSWORD, AccountRole::Admin).await;

        harness.admin_start(ADMIN_EMAIL, PASSWORD).await.unwrap();
        assert_eq!(harness.mailer.sent_count().await, 1);

        let code = harness.mailed_code().await;
        let session_token = harness.admin_verify(ADMIN_EMAIL, &code).await.unwrap();

        let claims = token::verify::<AdminClaims>(&session_token, &harness.config.token_secret)
            .unwrap();
        assert!(claims.body.is_admin_role());
        assert_eq!(claims.body.sub, account.account_id.to_string());
        assert_eq!(claims.exp - claims.iat, 8 * 3600);
    }

    #[tokio::test]
    async fn admin_step_one_rejects_non_admin_accounts() {
        let harness = Harness::new();
        harness.seed(MEMBER_EMAIL, PASSWORD, AccountRole::Member).await;

        // Valid member credentials are still not admin credentials, and
        // the outcome matches an unknown email exactly.
        let result = harness.admin_start(MEMBER_EMAIL, PASSWORD).await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
        assert_eq!(harness.mailer.sent_count().await, 0);
    }

    #[tokio::test]
    async fn otp_is_single_use() {
        let harness = Harness::new();
        harness.seed(ADMIN_EMAIL, PASSWORD, AccountRole::Admin).await;

        harness.admin_start(ADMIN_EMAIL, PASSWORD).await.unwrap();
        let code = harness.mailed_code().await;

        assert!(harness.admin_verify(ADMIN_EMAIL, &code).await.is_ok());

        // The record was consumed; the same code cannot be replayed
        let replay = harness.admin_verify(ADMIN_EMAIL, &code).await;
        assert!(matches!(replay, Err(AuthError::InvalidCode)));
    }

    #[tokio::test]
    async fn otp_expires_after_ttl() {
        let harness = Harness::new();
        harness.seed(ADMIN_EMAIL, PASSWORD, AccountRole::Admin).await;

        // An already-expired record with a known code
        let expired = OtpCode::issue(
            Email::new(ADMIN_EMAIL).unwrap(),
            "0427",
            Duration::seconds(-1),
            Utc::now(),
        );
        OtpStore::upsert(harness.store.as_ref(), &expired)
            .await
            .unwrap();

        let result = harness.admin_verify(ADMIN_EMAIL, "0427").await;
        assert!(matches!(result, Err(AuthError::InvalidCode)));
    }

    #[tokio::test]
    async fn new_otp_overwrites_the_previous_one() {
        let harness = Harness::new();
        harness.seed(ADMIN_EMAIL, PASSWORD, AccountRole::Admin).await;

        harness.admin_start(ADMIN_EMAIL, PASSWORD).await.unwrap();
        let first_code = harness.mailed_code().await;

        harness.admin_start(ADMIN_EMAIL, PASSWORD).await.unwrap();
        let second_code = harness.mailed_code().await;

        if first_code != second_code {
            let result = harness.admin_verify(ADMIN_EMAIL, &first_code).await;
            assert!(matches!(result, Err(AuthError::InvalidCode)));
        }
        assert!(harness.admin_verify(ADMIN_EMAIL, &second_code).await.is_ok());
    }

    #[tokio::test]
    async fn malformed_code_is_input_error_not_an_attempt() {
        let harness = Harness::new();
        harness.seed(ADMIN_EMAIL, PASSWORD, AccountRole::Admin).await;
        harness.admin_start(ADMIN_EMAIL, PASSWORD).await.unwrap();

        for bad in ["123", "12345", "12a4", "", "one2"] {
            let result = harness.admin_verify(ADMIN_EMAIL, bad).await;
            assert!(
                matches!(result, Err(AuthError::InvalidInput(_))),
                "{bad:?} should be rejected as input"
            );
        }

        // Shape rejections never touched the throttle
        let record = ThrottleStore::find_by_key(
            harness.store.as_ref(),
            &format!("admin-otp:{ADMIN_EMAIL}|{ORIGIN}"),
        )
        .await
        .unwrap();
        assert!(record.is_none());
    }

    #[tokio::test]
    async fn otp_attempts_are_throttled_separately() {
        let harness = Harness::new();
        harness.seed(ADMIN_EMAIL, PASSWORD, AccountRole::Admin).await;
        harness.admin_start(ADMIN_EMAIL, PASSWORD).await.unwrap();
        let code = harness.mailed_code().await;
        let wrong = if code == "0000" { "0001" } else { "0000" };

        for _ in 0..5 {
            let result = harness.admin_verify(ADMIN_EMAIL, wrong).await;
            assert!(matches!(result, Err(AuthError::InvalidCode)));
        }

        // Locked out of the OTP step even with the right code
        let result = harness.admin_verify(ADMIN_EMAIL, &code).await;
        assert!(matches!(result, Err(AuthError::TooManyAttempts { .. })));
    }

    // ========================================================================
    // Mail soft-fail
    // ========================================================================

    #[tokio::test]
    async fn mail_failure_is_swallowed_in_soft_fail_mode() {
        let config = AuthConfig::development(); // mail_soft_fail = true
        let harness = Harness::build(RecordingMailer::failing(), config);
        harness.seed(ADMIN_EMAIL, PASSWORD, AccountRole::Admin).await;

        // Caller still sees success; nothing was delivered
        assert!(harness.admin_start(ADMIN_EMAIL, PASSWORD).await.is_ok());
        assert_eq!(harness.mailer.sent_count().await, 0);
    }

    #[tokio::test]
    async fn mail_failure_is_fatal_in_strict_mode() {
        let config = AuthConfig {
            mail_soft_fail: false,
            ..AuthConfig::development()
        };
        let harness = Harness::build(RecordingMailer::failing(), config);
        harness.seed(ADMIN_EMAIL, PASSWORD, AccountRole::Admin).await;

        let result = harness.admin_start(ADMIN_EMAIL, PASSWORD).await;
        assert!(matches!(result, Err(AuthError::Mail(_))));
    }

    // ========================================================================
    // Session resolution (scenario C)
    // ========================================================================

    #[tokio::test]
    async fn valid_session_cookie_resolves_to_account() {
        let harness = Harness::new();
        let account = harness.seed(MEMBER_EMAIL, PASSWORD, AccountRole::Member).await;
        let session_token = harness.login(MEMBER_EMAIL, PASSWORD).await.unwrap();

        let headers = cookie_headers(&harness.config.user_cookie_name, &session_token);
        let session = harness.resolver().resolve_user(&headers).await.unwrap();

        assert_eq!(session.account.account_id, account.account_id);
        assert!(session.expires_at > Utc::now().timestamp());
    }

    #[tokio::test]
    async fn expired_session_cookie_is_unauthenticated() {
        let harness = Harness::new();
        let account = harness.seed(MEMBER_EMAIL, PASSWORD, AccountRole::Member).await;

        let expired = token::issue(
            UserClaims::for_account(&account),
            &harness.config.token_secret,
            -10,
        )
        .unwrap();
        let headers = cookie_headers(&harness.config.user_cookie_name, &expired);

        let result = harness.resolver().resolve_user(&headers).await;
        assert!(matches!(result, Err(AuthError::SessionInvalid)));
    }

    #[tokio::test]
    async fn missing_cookie_is_unauthenticated() {
        let harness = Harness::new();
        let result = harness.resolver().resolve_user(&HeaderMap::new()).await;
        assert!(matches!(result, Err(AuthError::SessionInvalid)));
    }

    #[tokio::test]
    async fn session_of_since_disabled_account_is_unauthenticated() {
        let harness = Harness::new();
        let account = harness.seed(MEMBER_EMAIL, PASSWORD, AccountRole::Member).await;
        let session_token = harness.login(MEMBER_EMAIL, PASSWORD).await.unwrap();

        // Disable after the token was issued; resolution re-checks status
        let mut disabled = account.clone();
        disabled.set_status(AccountStatus::Disabled, Utc::now());
        harness.store.put_account(disabled).await;

        let headers = cookie_headers(&harness.config.user_cookie_name, &session_token);
        let result = harness.resolver().resolve_user(&headers).await;
        assert!(matches!(result, Err(AuthError::SessionInvalid)));
    }

    #[tokio::test]
    async fn member_token_does_not_grant_admin_session() {
        let harness = Harness::new();
        let account = harness.seed(MEMBER_EMAIL, PASSWORD, AccountRole::Member).await;

        // A member-shaped token in the admin cookie slot has no role
        // claim and does not decode as admin claims
        let member_token = token::issue(
            UserClaims::for_account(&account),
            &harness.config.token_secret,
            3600,
        )
        .unwrap();
        let headers = cookie_headers(&harness.config.admin_cookie_name, &member_token);
        let result = harness.resolver().resolve_admin(&headers).await;
        assert!(matches!(result, Err(AuthError::SessionInvalid)));

        // Even a well-formed admin claim set is re-checked against the
        // backing account's actual role
        let forged = token::issue(
            AdminClaims {
                sub: account.account_id.to_string(),
                email: account.email.to_string(),
                role: "admin".to_string(),
            },
            &harness.config.token_secret,
            3600,
        )
        .unwrap();
        let headers = cookie_headers(&harness.config.admin_cookie_name, &forged);
        let result = harness.resolver().resolve_admin(&headers).await;
        assert!(matches!(result, Err(AuthError::SessionInvalid)));
    }

    #[tokio::test]
    async fn admin_session_resolves_after_two_step_login() {
        let harness = Harness::new();
        let account = harness.seed(ADMIN_EMAIL, PASSWORD, AccountRole::Admin).await;

        harness.admin_start(ADMIN_EMAIL, PASSWORD).await.unwrap();
        let code = harness.mailed_code().await;
        let session_token = harness.admin_verify(ADMIN_EMAIL, &code).await.unwrap();

        let headers = cookie_headers(&harness.config.admin_cookie_name, &session_token);
        let session = harness.resolver().resolve_admin(&headers).await.unwrap();
        assert_eq!(session.account.account_id, account.account_id);
    }

    // ========================================================================
    // Password change and provisioning
    // ========================================================================

    #[tokio::test]
    async fn change_password_replaces_digest_wholesale() {
        let harness = Harness::new();
        let account = harness.seed(MEMBER_EMAIL, PASSWORD, AccountRole::Member).await;

        let use_case = ChangePasswordUseCase::new(harness.store.clone());
        use_case
            .execute(
                &account,
                ChangePasswordInput {
                    current_password: PASSWORD.to_string(),
                    new_password: "FreshBattery7!".to_string(),
                },
            )
            .await
            .unwrap();

        let old = harness.login(MEMBER_EMAIL, PASSWORD).await;
        assert!(matches!(old, Err(AuthError::InvalidCredentials)));
        assert!(harness.login(MEMBER_EMAIL, "FreshBattery7!").await.is_ok());
    }

    #[tokio::test]
    async fn change_password_requires_current_secret() {
        let harness = Harness::new();
        let account = harness.seed(MEMBER_EMAIL, PASSWORD, AccountRole::Member).await;

        let use_case = ChangePasswordUseCase::new(harness.store.clone());
        let result = use_case
            .execute(
                &account,
                ChangePasswordInput {
                    current_password: "NotTheSecret1!".to_string(),
                    new_password: "FreshBattery7!".to_string(),
                },
            )
            .await;
        assert!(matches!(result, Err(AuthError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn provisioning_generates_usable_credentials() {
        let harness = Harness::new();

        let use_case = ProvisionAccountUseCase::new(harness.store.clone());
        let output = use_case
            .execute(ProvisionAccountInput {
                email: MEMBER_EMAIL.to_string(),
                name: "New Resident".to_string(),
                password: None,
                role: AccountRole::Member,
            })
            .await
            .unwrap();

        let generated = output.generated_password.expect("credential was generated");
        assert!(harness.login(MEMBER_EMAIL, &generated).await.is_ok());
    }

    #[tokio::test]
    async fn provisioning_rejects_duplicate_email() {
        let harness = Harness::new();
        harness.seed(MEMBER_EMAIL, PASSWORD, AccountRole::Member).await;

        let use_case = ProvisionAccountUseCase::new(harness.store.clone());
        let result = use_case
            .execute(ProvisionAccountInput {
                email: MEMBER_EMAIL.to_string(),
                name: "Duplicate".to_string(),
                password: None,
                role: AccountRole::Member,
            })
            .await;
        assert!(matches!(result, Err(AuthError::EmailTaken)));
    }
}
