//! Credential Value Objects
//!
//! Domain wrappers over `platform::secret`: [`Password`] for cleartext
//! input on its way to derivation, [`SecretDigest`] for the stored
//! `saltHex:keyHex` value. One digest primitive serves both passwords
//! and one-time codes.

use kernel::error::app_error::{AppError, AppResult};
use platform::secret::{ClearSecret, SecretPolicyError, StoredDigest};
use std::fmt;

// ============================================================================
// Password (user input)
// ============================================================================

/// Cleartext password from user input
///
/// Memory is zeroized when dropped; Debug output is redacted.
pub struct Password(ClearSecret);

impl Password {
    /// Create with policy validation (8..=128 chars, no control chars)
    ///
    /// Used where a credential is chosen: provisioning and password
    /// change.
    pub fn new(raw: String) -> AppResult<Self> {
        let secret = ClearSecret::new(raw).map_err(|e| match e {
            SecretPolicyError::TooShort { min, actual } => AppError::bad_request(format!(
                "Password must be at least {} characters (got {})",
                min, actual
            ))
            .with_action("Please choose a longer password"),

            SecretPolicyError::TooLong { max, actual } => AppError::bad_request(format!(
                "Password must be at most {} characters (got {})",
                max, actual
            ))
            .with_action("Please choose a shorter password"),

            SecretPolicyError::EmptyOrWhitespace => {
                AppError::bad_request("Password cannot be empty")
                    .with_action("Please enter a password")
            }

            SecretPolicyError::InvalidCharacter => {
                AppError::bad_request("Password contains invalid characters")
                    .with_action("Please remove any special control characters")
            }
        })?;

        Ok(Self(secret))
    }

    /// Create without policy validation
    ///
    /// Used where a credential is being checked rather than chosen; the
    /// stored digest decides whether it matches.
    pub fn unchecked(raw: String) -> Self {
        Self(ClearSecret::unchecked(raw))
    }

    /// Access the inner cleartext secret
    pub(crate) fn inner(&self) -> &ClearSecret {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Password").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// Secret Digest (stored)
// ============================================================================

/// Stored secret digest (`saltHex:keyHex`)
///
/// Safe to persist. Replaced wholesale on password change.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretDigest(StoredDigest);

impl SecretDigest {
    /// Derive from a password with a fresh random salt
    pub fn from_password(password: &Password) -> Self {
        Self(StoredDigest::from_secret(password.inner()))
    }

    /// Derive from a one-time code (shape validated by the caller)
    pub fn from_code(code: &str) -> Self {
        Self(StoredDigest::from_secret(&ClearSecret::unchecked(
            code.to_string(),
        )))
    }

    /// Wrap a stored value; malformed values simply fail verification
    pub fn from_stored(stored: impl Into<String>) -> Self {
        Self(StoredDigest::from_stored(stored))
    }

    /// Encoded form for storage
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Verify a password against this digest in constant time
    pub fn verify_password(&self, password: &Password) -> bool {
        self.0.verify(password.inner())
    }

    /// Verify a one-time code against this digest in constant time
    pub fn verify_code(&self, code: &str) -> bool {
        self.0.verify(&ClearSecret::unchecked(code.to_string()))
    }
}

impl fmt::Debug for SecretDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretDigest")
            .field("digest", &"[DIGEST]")
            .finish()
    }
}

impl fmt::Display for SecretDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[SECRET_DIGEST]")
    }
}
