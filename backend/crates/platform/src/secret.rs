//! Secret Hashing and Verification
//!
//! Salted scrypt digests for passwords and one-time codes:
//! - Memory-hard derivation (N=16384, r=8, p=1)
//! - `saltHex:keyHex` stored encoding
//! - Constant-time verification
//! - Zeroization of cleartext secrets
//!
//! A process-wide dummy digest lets callers run a full derivation for
//! accounts that do not exist, so "unknown email" and "wrong password"
//! are indistinguishable by response time.

use std::fmt;
use std::sync::OnceLock;

use rand::{Rng, RngCore, rngs::OsRng};
use scrypt::Params;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::constant_time_eq;

// ============================================================================
// Constants
// ============================================================================

/// Minimum secret length for provisioned credentials
pub const MIN_SECRET_LENGTH: usize = 8;

/// Maximum secret length
pub const MAX_SECRET_LENGTH: usize = 128;

/// Salt length in bytes (128 bits)
pub const SALT_LENGTH: usize = 16;

/// Derived key length in bytes
pub const KEY_LENGTH: usize = 64;

/// scrypt cost: log2(N), N = 16384
pub const SCRYPT_LOG_N: u8 = 14;

/// scrypt block size
pub const SCRYPT_R: u32 = 8;

/// scrypt parallelism
pub const SCRYPT_P: u32 = 1;

/// Default length for auto-generated credentials
pub const GENERATED_SECRET_LENGTH: usize = 10;

/// Fixed placeholder hashed once per process for timing equalization
const DUMMY_SECRET: &str = "timing-equalization-placeholder";

/// Alphabet for generated credentials, excluding visually ambiguous
/// characters (0/O, 1/l/I, o)
const SECRET_ALPHABET: &[u8] = b"abcdefghijkmnpqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ23456789";

// ============================================================================
// Error Types
// ============================================================================

/// Secret policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SecretPolicyError {
    /// Secret is too short
    #[error("Secret must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    /// Secret is too long
    #[error("Secret must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    /// Secret is empty or whitespace only
    #[error("Secret cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    /// Secret contains control characters
    #[error("Secret contains invalid control characters")]
    InvalidCharacter,
}

// ============================================================================
// Clear Secret (Zeroized on drop)
// ============================================================================

/// Cleartext secret with automatic memory zeroization
///
/// Wraps a password or one-time code on its way to the derivation
/// function. Does not implement `Clone`; Debug output is redacted.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearSecret(String);

impl ClearSecret {
    /// Create a new cleartext secret with policy validation
    ///
    /// Used for credentials chosen by (or generated for) a person:
    /// - 8..=128 characters, counted as Unicode code points
    /// - not empty or whitespace-only
    /// - no control characters
    pub fn new(raw: String) -> Result<Self, SecretPolicyError> {
        if raw.trim().is_empty() {
            return Err(SecretPolicyError::EmptyOrWhitespace);
        }

        let char_count = raw.chars().count();
        if char_count < MIN_SECRET_LENGTH {
            return Err(SecretPolicyError::TooShort {
                min: MIN_SECRET_LENGTH,
                actual: char_count,
            });
        }
        if char_count > MAX_SECRET_LENGTH {
            return Err(SecretPolicyError::TooLong {
                max: MAX_SECRET_LENGTH,
                actual: char_count,
            });
        }

        for ch in raw.chars() {
            if ch.is_control() {
                return Err(SecretPolicyError::InvalidCharacter);
            }
        }

        Ok(Self(raw))
    }

    /// Create without policy validation
    ///
    /// For input whose shape is validated elsewhere (one-time codes) or
    /// already-trusted material. Derivation accepts any length.
    pub fn unchecked(raw: String) -> Self {
        Self(raw)
    }

    /// Secret bytes for derivation
    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for ClearSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearSecret").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// Stored Digest (Safe to store)
// ============================================================================

/// Salted scrypt digest in `saltHex:keyHex` form
///
/// ## Examples
/// ```rust
/// use platform::secret::{ClearSecret, StoredDigest};
///
/// let secret = ClearSecret::new("correct battery staple".to_string()).unwrap();
/// let digest = StoredDigest::from_secret(&secret);
/// assert!(digest.verify(&secret));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct StoredDigest(String);

impl StoredDigest {
    /// Derive a fresh digest with a random salt
    pub fn from_secret(secret: &ClearSecret) -> Self {
        let mut salt = [0u8; SALT_LENGTH];
        OsRng.fill_bytes(&mut salt);
        let key = derive(secret.as_bytes(), &salt);
        Self(format!("{}:{}", hex::encode(salt), hex::encode(key)))
    }

    /// Wrap a stored value as-is
    ///
    /// No validation: a malformed value is a verification failure, not
    /// an error.
    pub fn from_stored(stored: impl Into<String>) -> Self {
        Self(stored.into())
    }

    /// Encoded form for storage
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Verify a secret against this digest
    ///
    /// Re-derives with the stored salt and compares in constant time.
    /// Malformed stored values and length mismatches are `false`.
    pub fn verify(&self, secret: &ClearSecret) -> bool {
        let Some((salt_hex, key_hex)) = self.0.split_once(':') else {
            return false;
        };
        let Ok(salt) = hex::decode(salt_hex) else {
            return false;
        };
        let Ok(expected) = hex::decode(key_hex) else {
            return false;
        };

        let derived = derive(secret.as_bytes(), &salt);
        constant_time_eq(&derived, &expected)
    }
}

impl fmt::Debug for StoredDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredDigest")
            .field("digest", &"[DIGEST]")
            .finish()
    }
}

/// Process-lifetime digest of a fixed placeholder secret
///
/// Verifying against this digest costs the same as verifying against a
/// real one, which keeps login timing flat when the account does not
/// exist. The `OnceLock` guards single-flight construction under
/// concurrent first use.
pub fn dummy_digest() -> &'static StoredDigest {
    static DUMMY: OnceLock<StoredDigest> = OnceLock::new();
    DUMMY.get_or_init(|| StoredDigest::from_secret(&ClearSecret::unchecked(DUMMY_SECRET.into())))
}

// ============================================================================
// Generators
// ============================================================================

/// Generate a random credential of the given length
///
/// Drawn from an alphabet without visually ambiguous characters and
/// re-rolled until it contains at least one uppercase letter, one
/// lowercase letter, and one digit.
pub fn generate_secret(length: usize) -> String {
    assert!(length >= 3, "generated secrets need room for all character classes");
    loop {
        let candidate: String = (0..length)
            .map(|_| SECRET_ALPHABET[OsRng.gen_range(0..SECRET_ALPHABET.len())] as char)
            .collect();

        let has_upper = candidate.chars().any(|c| c.is_ascii_uppercase());
        let has_lower = candidate.chars().any(|c| c.is_ascii_lowercase());
        let has_digit = candidate.chars().any(|c| c.is_ascii_digit());
        if has_upper && has_lower && has_digit {
            return candidate;
        }
    }
}

/// Zero-padded random 4-digit code in [0000, 9999]
pub fn generate_numeric_code() -> String {
    format!("{:04}", OsRng.gen_range(0..10_000u16))
}

// ============================================================================
// Derivation
// ============================================================================

fn params() -> &'static Params {
    static PARAMS: OnceLock<Params> = OnceLock::new();
    PARAMS.get_or_init(|| {
        Params::new(SCRYPT_LOG_N, SCRYPT_R, SCRYPT_P, KEY_LENGTH)
            .expect("scrypt cost parameters are valid")
    })
}

fn derive(secret: &[u8], salt: &[u8]) -> [u8; KEY_LENGTH] {
    let mut key = [0u8; KEY_LENGTH];
    scrypt::scrypt(secret, salt, params(), &mut key)
        .expect("output buffer length matches KEY_LENGTH");
    key
}

// ============================================================================
// Tests
// ============================================================================
