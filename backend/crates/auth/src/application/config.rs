//! Application Configuration
//!
//! Configuration for the Auth application layer.

use chrono::Duration;

use crate::domain::value_object::totp_secret::TotpParams;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// HMAC key for signing bearer tokens
    pub jwt_secret: String,
    /// TOTP code parameters
    pub totp: TotpParams,
    /// One-time code lifetime (5 minutes)
    pub otp_ttl: Duration,
    /// Echo OTP codes in the response instead of sending SMS
    ///
    /// Only ever true in development; the response field carrying the
    /// code is absent in production builds of the config.
    pub debug_otp: bool,
    /// Key for sealing TOTP secrets at rest (32 bytes)
    pub secret_key: [u8; 32],
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            totp: TotpParams::default(),
            otp_ttl: Duration::minutes(5),
            debug_otp: false,
            secret_key: [0u8; 32],
        }
    }
}

impl AuthConfig {
    /// Create config with random secrets (for development)
    pub fn with_random_secrets() -> Self {
        let jwt_secret = platform::crypto::to_base64(&platform::crypto::random_bytes(32));
        let mut secret_key = [0u8; 32];
        secret_key.copy_from_slice(&platform::crypto::random_bytes(32));
        Self {
            jwt_secret,
            secret_key,
            ..Default::default()
        }
    }

    /// Create config for development (debug OTP echo enabled)
    pub fn development() -> Self {
        Self {
            debug_otp: true,
            ..Self::with_random_secrets()
        }
    }
}
