//! API DTOs (Data Transfer Objects)

use serde::{Deserialize, Serialize};

// ============================================================================
// Member Login
// ============================================================================

/// Login request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub account_id: String,
    pub name: String,
}

// ============================================================================
// Administrator Login (two-step)
// ============================================================================

/// Admin credential step request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

/// Admin credential step response
///
/// Reports only that a code was dispatched; in soft-fail mail mode this
/// can be true even when delivery failed (logged loudly server-side).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminLoginResponse {
    pub otp_sent: bool,
}

/// Admin code verification request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminVerifyRequest {
    pub email: String,
    pub code: String,
}

/// Admin code verification response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminVerifyResponse {
    pub account_id: String,
    pub name: String,
}

// ============================================================================
// Session Status
// ============================================================================

/// Session status response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatusResponse {
    pub authenticated: bool,
    pub account_id: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub role: Option<String>,
    /// Token expiry, Unix seconds
    pub expires_at: Option<i64>,
}

impl SessionStatusResponse {
    pub fn unauthenticated() -> Self {
        Self {
            authenticated: false,
            account_id: None,
            email: None,
            name: None,
            role: None,
            expires_at: None,
        }
    }
}

// ============================================================================
// Password Change
// ============================================================================

/// Change password request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

// ============================================================================
// Account Provisioning (admin)
// ============================================================================

/// Provision account request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionAccountRequest {
    pub email: String,
    pub name: String,
    /// When absent, a credential is generated and returned
    pub password: Option<String>,
    /// `"member"` (default) or `"admin"`
    pub role: Option<String>,
}

/// Provision account response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProvisionAccountResponse {
    pub account_id: String,
    /// Present only when the credential was generated server-side
    pub generated_password: Option<String>,
}
