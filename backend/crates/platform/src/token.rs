//! Signed Session Tokens
//!
//! Compact, self-contained session tokens:
//! `base64url(header).base64url(claims).base64url(signature)` with an
//! HMAC-SHA256 signature over the first two segments and a
//! `{"alg":"HS256","typ":"JWT"}` header. The token is the only session
//! state; there is no server-side session table.
//!
//! There is no refresh or rotation: a verified token close to expiry is
//! accepted as-is and the caller re-authenticates after expiry.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;

use crate::crypto::constant_time_eq;

/// Expected signature algorithm tag
pub const TOKEN_ALGORITHM: &str = "HS256";

const TOKEN_TYPE: &str = "JWT";

/// Token verification/issuance failures
///
/// Deliberately coarse: callers collapse all of these into a single
/// "unauthenticated" outcome, and none carry attacker-usable detail.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Wrong segment count, bad base64, or undecodable JSON
    #[error("token is malformed")]
    Malformed,

    /// Signature length or value mismatch
    #[error("token signature mismatch")]
    BadSignature,

    /// Header carries an unexpected algorithm tag
    #[error("unexpected token algorithm")]
    UnknownAlgorithm,

    /// `exp` is in the past
    #[error("token has expired")]
    Expired,

    /// Claims could not be serialized at issuance
    #[error("claims serialization failed")]
    Serialization,
}

#[derive(Debug, Serialize, Deserialize)]
struct Header {
    alg: String,
    typ: String,
}

/// Claims body plus the server-stamped validity window
///
/// `issue` wraps the caller's typed claims and appends `iat`/`exp`
/// (Unix seconds); `verify` hands the same shape back. Claims decode
/// into a closed set of known types; missing required fields reject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedClaims<C> {
    #[serde(flatten)]
    pub body: C,
    /// Issued-at, Unix seconds
    pub iat: i64,
    /// Expires-at, Unix seconds
    pub exp: i64,
}

/// Issue a signed token valid for `ttl_seconds` from now
pub fn issue<C: Serialize>(claims: C, key: &[u8], ttl_seconds: i64) -> Result<String, TokenError> {
    let now = Utc::now().timestamp();
    let signed = SignedClaims {
        body: claims,
        iat: now,
        exp: now + ttl_seconds,
    };
    let header = Header {
        alg: TOKEN_ALGORITHM.to_string(),
        typ: TOKEN_TYPE.to_string(),
    };

    let header_b64 =
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).map_err(|_| TokenError::Serialization)?);
    let claims_b64 =
        URL_SAFE_NO_PAD.encode(serde_json::to_vec(&signed).map_err(|_| TokenError::Serialization)?);

    let signature = sign(key, header_b64.as_bytes(), claims_b64.as_bytes());

    Ok(format!(
        "{header_b64}.{claims_b64}.{}",
        URL_SAFE_NO_PAD.encode(signature)
    ))
}

/// Verify a token and decode its claims
///
/// Rejects on segment count, signature (length checked before the
/// constant-time comparison, which requires equal-length buffers),
/// algorithm tag, undecodable segments, and expiry — in that order.
pub fn verify<C: DeserializeOwned>(token: &str, key: &[u8]) -> Result<SignedClaims<C>, TokenError> {
    let mut segments = token.split('.');
    let (Some(header_b64), Some(claims_b64), Some(signature_b64), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(TokenError::Malformed);
    };

    let signature = URL_SAFE_NO_PAD
        .decode(signature_b64)
        .map_err(|_| TokenError::Malformed)?;
    let expected = sign(key, header_b64.as_bytes(), claims_b64.as_bytes());
    if signature.len() != expected.len() {
        return Err(TokenError::BadSignature);
    }
    if !constant_time_eq(&signature, &expected) {
        return Err(TokenError::BadSignature);
    }

    let header_bytes = URL_SAFE_NO_PAD
        .decode(header_b64)
        .map_err(|_| TokenError::Malformed)?;
    let header: Header =
        serde_json::from_slice(&header_bytes).map_err(|_| TokenError::Malformed)?;
    if header.alg != TOKEN_ALGORITHM {
        return Err(TokenError::UnknownAlgorithm);
    }

    let claims_bytes = URL_SAFE_NO_PAD
        .decode(claims_b64)
        .map_err(|_| TokenError::Malformed)?;
    let claims: SignedClaims<C> =
        serde_json::from_slice(&claims_bytes).map_err(|_| TokenError::Malformed)?;

    if claims.exp < Utc::now().timestamp() {
        return Err(TokenError::Expired);
    }

    Ok(claims)
}

fn sign(key: &[u8], header: &[u8], claims: &[u8]) -> [u8; 32] {
    let mut mac = Hmac::<Sha256>::new_from_slice(key).expect("HMAC can take key of any size");
    mac.update(header);
    mac.update(b".");
    mac.update(claims);
    mac.finalize().into_bytes().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test-signing-secret-of-decent-length";

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct TestClaims {
        sub: String,
        email: String,
    }

    fn sample_claims() -> TestClaims {
        TestClaims {
            sub: "account-1".to_string(),
            email: "person@example.com".to_string(),
        }
    }

    #[test]
    fn test_roundtrip() {
        let token = issue(sample_claims(), KEY, 3600).unwrap();
        let decoded: SignedClaims<TestClaims> = verify(&token, KEY).unwrap();

        assert_eq!(decoded.body, sample_claims());
        assert_eq!(decoded.exp, decoded.iat + 3600);
    }

    #[test]
    fn test_token_has_three_segments() {
        let token = issue(sample_claims(), KEY, 3600).unwrap();
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_expired_token_rejected() {
        let token = issue(sample_claims(), KEY, -10).unwrap();
        let result = verify::<TestClaims>(&token, KEY);
        assert_eq!(result.unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_wrong_key_rejected() {
        let token = issue(sample_claims(), KEY, 3600).unwrap();
        let result = verify::<TestClaims>(&token, b"another-key");
        assert_eq!(result.unwrap_err(), TokenError::BadSignature);
    }

    #[test]
    fn test_tampering_any_segment_rejected() {
        let token = issue(sample_claims(), KEY, 3600).unwrap();

        for i in 0..3 {
            let mut segments: Vec<String> =
                token.split('.').map(|s| s.to_string()).collect();
            let mut chars: Vec<char> = segments[i].chars().collect();
            chars[0] = if chars[0] == 'A' { 'B' } else { 'A' };
            segments[i] = chars.into_iter().collect();
            let tampered = segments.join(".");

            assert!(
                verify::<TestClaims>(&tampered, KEY).is_err(),
                "tampered segment {i} was accepted"
            );
        }
    }

    #[test]
    fn test_wrong_segment_count_rejected() {
        assert_eq!(
            verify::<TestClaims>("only.two", KEY).unwrap_err(),
            TokenError::Malformed
        );
        let token = issue(sample_claims(), KEY, 3600).unwrap();
        let four = format!("{token}.extra");
        assert_eq!(
            verify::<TestClaims>(&four, KEY).unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn test_truncated_signature_rejected() {
        let token = issue(sample_claims(), KEY, 3600).unwrap();
        let (body, _sig) = token.rsplit_once('.').unwrap();
        // 12 base64url chars decode cleanly to 9 bytes, shorter than HMAC-SHA256
        let short_sig = &token[token.len() - 12..];
        let truncated = format!("{body}.{short_sig}");
        assert_eq!(
            verify::<TestClaims>(&truncated, KEY).unwrap_err(),
            TokenError::BadSignature
        );
    }

    #[test]
    fn test_unexpected_algorithm_rejected() {
        // Craft a correctly signed token with a different algorithm tag
        let header_b64 =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(&Header {
                alg: "none".to_string(),
                typ: TOKEN_TYPE.to_string(),
            })
            .unwrap());
        let now = Utc::now().timestamp();
        let claims_b64 = URL_SAFE_NO_PAD.encode(
            serde_json::to_vec(&SignedClaims {
                body: sample_claims(),
                iat: now,
                exp: now + 3600,
            })
            .unwrap(),
        );
        let signature = sign(KEY, header_b64.as_bytes(), claims_b64.as_bytes());
        let token = format!(
            "{header_b64}.{claims_b64}.{}",
            URL_SAFE_NO_PAD.encode(signature)
        );

        assert_eq!(
            verify::<TestClaims>(&token, KEY).unwrap_err(),
            TokenError::UnknownAlgorithm
        );
    }

    #[test]
    fn test_missing_required_claim_rejected() {
        #[derive(Debug, Serialize)]
        struct Partial {
            sub: String,
        }

        let token = issue(
            Partial {
                sub: "account-1".to_string(),
            },
            KEY,
            3600,
        )
        .unwrap();

        assert_eq!(
            verify::<TestClaims>(&token, KEY).unwrap_err(),
            TokenError::Malformed
        );
    }

    #[test]
    fn test_garbage_rejected_without_panic() {
        for garbage in ["", ".", "..", "a.b.c", "!!!.###.$$$"] {
            assert!(verify::<TestClaims>(garbage, KEY).is_err());
        }
    }
}
