//! TOTP Secret Value Object
//!
//! Wraps a TOTP secret for two-factor authentication.
//! Uses Google Authenticator compatible settings.

use crate::error::{AuthError, AuthResult};
use serde::{Deserialize, Serialize};
use totp_rs::{Algorithm, Secret, TOTP};

/// TOTP generation parameters
///
/// Kept in configuration rather than constants so deployments can tune
/// the accepted drift window without a rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotpParams {
    /// Number of digits in a code
    pub digits: usize,
    /// Step length in seconds
    pub step: u64,
    /// Accepted drift, in steps before/after the current one
    pub skew: u8,
    /// Issuer shown in authenticator apps
    pub issuer: String,
}

impl Default for TotpParams {
    fn default() -> Self {
        Self {
            digits: 6,
            step: 30,
            skew: 1,
            issuer: "GramaFix".to_string(),
        }
    }
}

/// TOTP Secret for two-factor authentication
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotpSecret {
    /// Base32-encoded secret
    secret_base32: String,
}

impl TotpSecret {
    /// Generate a new random TOTP secret
    pub fn generate() -> Self {
        let secret = Secret::generate_secret();
        Self {
            secret_base32: secret.to_encoded().to_string(),
        }
    }

    /// Create from a base32-encoded string (from storage)
    pub fn from_base32(secret: impl Into<String>) -> AuthResult<Self> {
        let secret_str = secret.into();
        // Validate by trying to decode
        Secret::Encoded(secret_str.clone())
            .to_bytes()
            .map_err(|e| AuthError::Internal(format!("invalid TOTP secret: {}", e)))?;

        Ok(Self {
            secret_base32: secret_str,
        })
    }

    /// Get the base32-encoded secret for storage
    pub fn as_base32(&self) -> &str {
        &self.secret_base32
    }

    /// Create a TOTP instance for this secret
    fn to_totp(&self, params: &TotpParams, account_name: &str) -> AuthResult<TOTP> {
        let secret = Secret::Encoded(self.secret_base32.clone());

        TOTP::new(
            Algorithm::SHA1,
            params.digits,
            params.skew,
            params.step,
            secret
                .to_bytes()
                .map_err(|e| AuthError::Internal(format!("invalid TOTP secret: {}", e)))?,
            Some(params.issuer.clone()),
            account_name.to_string(),
        )
        .map_err(|e| AuthError::Internal(format!("failed to create TOTP: {}", e)))
    }

    /// Verify a TOTP code against the current time
    pub fn verify(&self, code: &str, params: &TotpParams, account_name: &str) -> AuthResult<bool> {
        let totp = self.to_totp(params, account_name)?;
        Ok(totp.check_current(code).unwrap_or(false))
    }

    /// Verify a TOTP code against an explicit Unix timestamp
    pub fn verify_at(
        &self,
        code: &str,
        params: &TotpParams,
        account_name: &str,
        time: u64,
    ) -> AuthResult<bool> {
        let totp = self.to_totp(params, account_name)?;
        Ok(totp.check(code, time))
    }

    /// The time-step counter a given timestamp falls in
    ///
    /// Used as a replay guard: the same step never validates twice.
    pub fn current_step(params: &TotpParams, time: u64) -> i64 {
        (time / params.step) as i64
    }

    /// Generate the code for an explicit timestamp (for testing)
    #[cfg(test)]
    pub fn generate_at(
        &self,
        params: &TotpParams,
        account_name: &str,
        time: u64,
    ) -> AuthResult<String> {
        let totp = self.to_totp(params, account_name)?;
        Ok(totp.generate(time))
    }

    /// Generate QR code as base64-encoded PNG
    pub fn generate_qr_code(&self, params: &TotpParams, account_name: &str) -> AuthResult<String> {
        let totp = self.to_totp(params, account_name)?;
        totp.get_qr_base64()
            .map_err(|e| AuthError::Internal(format!("failed to generate QR code: {}", e)))
    }

    /// Get the otpauth:// URL for manual entry
    pub fn get_otpauth_url(&self, params: &TotpParams, account_name: &str) -> AuthResult<String> {
        let totp = self.to_totp(params, account_name)?;
        Ok(totp.get_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: u64 = 1_700_000_010;

    #[test]
    fn test_totp_secret_generate() {
        let secret = TotpSecret::generate();
        assert!(!secret.as_base32().is_empty());
    }

    #[test]
    fn test_totp_secret_verify_at() {
        let secret = TotpSecret::generate();
        let params = TotpParams::default();
        let account = "test@example.com";

        let code = secret.generate_at(&params, account, T0).unwrap();
        assert!(secret.verify_at(&code, &params, account, T0).unwrap());

        // Wrong code fails
        assert!(!secret.verify_at("000000", &params, account, T0).unwrap());
    }

    #[test]
    fn test_totp_drift_window() {
        let secret = TotpSecret::generate();
        let params = TotpParams::default();
        let account = "test@example.com";

        // T0 sits inside a step; anchor to the start of it for exact offsets
        let anchor = T0 - (T0 % params.step);
        let code = secret.generate_at(&params, account, anchor).unwrap();

        // One step of drift either way is inside the window
        assert!(secret
            .verify_at(&code, &params, account, anchor + params.step)
            .unwrap());
        assert!(secret
            .verify_at(&code, &params, account, anchor - params.step)
            .unwrap());

        // Two steps out is rejected
        assert!(!secret
            .verify_at(&code, &params, account, anchor + 2 * params.step)
            .unwrap());
    }

    #[test]
    fn test_current_step() {
        let params = TotpParams::default();
        let step = TotpSecret::current_step(&params, T0);
        assert_eq!(step, (T0 / 30) as i64);
        // Same step for every timestamp inside the window
        assert_eq!(TotpSecret::current_step(&params, T0 + 10), step);
    }

    #[test]
    fn test_totp_secret_from_base32() {
        let secret = TotpSecret::generate();
        let base32 = secret.as_base32().to_string();

        let restored = TotpSecret::from_base32(base32).unwrap();
        assert_eq!(secret.as_base32(), restored.as_base32());
    }

    #[test]
    fn test_totp_secret_from_base32_rejects_garbage() {
        assert!(TotpSecret::from_base32("not base32 !!!").is_err());
    }

    #[test]
    fn test_totp_qr_code() {
        let secret = TotpSecret::generate();
        let params = TotpParams::default();
        let qr = secret.generate_qr_code(&params, "test@example.com").unwrap();
        assert!(!qr.is_empty());
    }

    #[test]
    fn test_otpauth_url() {
        let secret = TotpSecret::generate();
        let params = TotpParams::default();
        let url = secret
            .get_otpauth_url(&params, "test@example.com")
            .unwrap();
        assert!(url.starts_with("otpauth://totp/"));
        assert!(url.contains("GramaFix"));
    }
}
