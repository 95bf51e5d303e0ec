//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entity::user::User;

// ============================================================================
// User Representation
// ============================================================================

/// Public view of a user
///
/// Built from the entity; credential material never appears here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: String,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gram_panchayat: Option<String>,
    pub totp_enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id.to_string(),
            name: user.name.clone(),
            email: user.email.as_ref().map(|e| e.as_str().to_string()),
            phone: user.phone.as_ref().map(|p| p.as_str().to_string()),
            role: user.role.to_string(),
            is_active: user.is_active,
            gram_panchayat: user.gram_panchayat.clone(),
            totp_enabled: user.totp_enabled(),
            created_at: user.created_at,
        }
    }
}

/// Token plus the user it belongs to
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub user: UserResponse,
}

impl AuthResponse {
    pub fn bearer(token: String, user: &User) -> Self {
        Self {
            access_token: token,
            token_type: "bearer".to_string(),
            user: user.into(),
        }
    }
}

// ============================================================================
// Register / Login
// ============================================================================

/// Registration request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: String,
    pub role: Option<String>,
    pub gram_panchayat: Option<String>,
}

/// Password login request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Email or phone number
    pub identifier: String,
    pub password: String,
}

// ============================================================================
// OTP
// ============================================================================

/// OTP request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequestRequest {
    pub phone: String,
}

/// OTP request response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequestResponse {
    pub success: bool,
    pub message: String,
    /// Present only when the deployment echoes codes for development
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug_code: Option<String>,
}

/// OTP verification request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpVerifyRequest {
    pub phone: String,
    pub code: String,
    /// Display name for first-time provisioning
    pub name: Option<String>,
    /// Locality for first-time provisioning
    pub gram_panchayat: Option<String>,
}

// ============================================================================
// TOTP
// ============================================================================

/// TOTP setup response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TotpSetupResponse {
    /// QR code as base64-encoded PNG
    pub qr_code: String,
    /// Secret for manual entry
    pub secret: String,
    /// otpauth:// URL
    pub otpauth_url: String,
}

/// TOTP enrollment confirmation request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotpConfirmRequest {
    pub code: String,
}

/// TOTP enrollment confirmation response
#[derive(Debug, Clone, Serialize)]
pub struct TotpConfirmResponse {
    pub success: bool,
}

/// TOTP login request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TotpLoginRequest {
    /// Email or phone number
    pub identifier: String,
    pub code: String,
}

// ============================================================================
// Profile
// ============================================================================

/// Profile update request
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateRequest {
    pub name: Option<String>,
    pub gram_panchayat: Option<String>,
}
