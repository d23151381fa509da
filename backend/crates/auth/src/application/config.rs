//! Application Configuration
//!
//! Configuration for the Auth application layer. The signing secret is
//! supplied by the environment, validated at startup, and never logged.

use std::time::Duration;

use platform::cookie::CookieConfig;
use platform::rate_limit::LockoutPolicy;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// Minimum signing secret length in bytes
pub const MIN_TOKEN_SECRET_LENGTH: usize = 32;

/// Auth application configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Member session cookie name
    pub user_cookie_name: String,
    /// Administrator session cookie name
    pub admin_cookie_name: String,
    /// HMAC signing secret for session tokens
    pub token_secret: Vec<u8>,
    /// Member session TTL (7 days)
    pub user_session_ttl: Duration,
    /// Administrator session TTL (8 hours)
    pub admin_session_ttl: Duration,
    /// One-time code TTL (10 minutes)
    pub otp_ttl: Duration,
    /// Brute-force lockout policy shared by all login steps
    pub lockout: LockoutPolicy,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
    /// Swallow (and loudly log) OTP mail dispatch failures instead of
    /// failing the login step
    pub mail_soft_fail: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            user_cookie_name: "auth_session".to_string(),
            admin_cookie_name: "admin_session".to_string(),
            token_secret: vec![0u8; MIN_TOKEN_SECRET_LENGTH],
            user_session_ttl: Duration::from_secs(7 * 24 * 3600),
            admin_session_ttl: Duration::from_secs(8 * 3600),
            otp_ttl: Duration::from_secs(10 * 60),
            lockout: LockoutPolicy::default(),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
            mail_soft_fail: false,
        }
    }
}

impl AuthConfig {
    /// Create config with a random signing secret (for development)
    pub fn with_random_secret() -> Self {
        Self {
            token_secret: platform::crypto::random_bytes(MIN_TOKEN_SECRET_LENGTH),
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie, soft-fail mail)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            mail_soft_fail: true,
            ..Self::with_random_secret()
        }
    }

    /// Member session TTL in whole seconds
    pub fn user_session_ttl_secs(&self) -> i64 {
        self.user_session_ttl.as_secs() as i64
    }

    /// Administrator session TTL in whole seconds
    pub fn admin_session_ttl_secs(&self) -> i64 {
        self.admin_session_ttl.as_secs() as i64
    }

    /// One-time code TTL in whole seconds
    pub fn otp_ttl_secs(&self) -> i64 {
        self.otp_ttl.as_secs() as i64
    }

    /// Cookie settings for the member session
    pub fn user_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.user_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.user_session_ttl_secs()),
        }
    }

    /// Cookie settings for the administrator session
    pub fn admin_cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.admin_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.admin_session_ttl_secs()),
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("user_cookie_name", &self.user_cookie_name)
            .field("admin_cookie_name", &self.admin_cookie_name)
            .field("token_secret", &"[REDACTED]")
            .field("user_session_ttl", &self.user_session_ttl)
            .field("admin_session_ttl", &self.admin_session_ttl)
            .field("otp_ttl", &self.otp_ttl)
            .field("lockout", &self.lockout)
            .field("cookie_secure", &self.cookie_secure)
            .field("cookie_same_site", &self.cookie_same_site)
            .field("mail_soft_fail", &self.mail_soft_fail)
            .finish()
    }
}
