//! Password Hashing and Verification
//!
//! Multi-scheme password handling:
//! - New hashes are always Argon2id (OWASP recommended parameters)
//! - Verification also accepts legacy bcrypt hashes, so accounts migrated
//!   from the previous stack keep working until their first login upgrades
//!   them
//! - Raw password material is zeroized on drop and NFKC-normalized before
//!   hashing (NIST SP 800-63B)
//!
//! Callers cannot tell which scheme matched; [`needs_rehash`] reports
//! whether the stored credential should be re-hashed with the preferred
//! scheme.

use std::fmt;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use rand::rngs::OsRng;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Maximum password length in Unicode code points (NIST: SHOULD permit at least 64)
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Minimum length enforced for newly chosen passwords (NIST: SHALL be at least 8)
///
/// Only applied at registration/password-change time. Login accepts any
/// non-empty input so that legacy accounts with weaker passwords can still
/// sign in and be migrated.
pub const MIN_NEW_PASSWORD_LENGTH: usize = 8;

/// Password policy violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    /// Password is empty or contains only whitespace
    #[error("Password cannot be empty or contain only whitespace")]
    EmptyOrWhitespace,

    /// Password is too long
    #[error("Password must be at most {max} characters (got {actual})")]
    TooLong { max: usize, actual: usize },

    /// Newly chosen password is too short
    #[error("Password must be at least {min} characters (got {actual})")]
    TooShort { min: usize, actual: usize },

    /// Password contains control characters
    #[error("Password contains invalid control characters")]
    InvalidCharacter,
}

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    /// Hashing operation failed
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}

/// Clear text password with automatic memory zeroization
///
/// Input is NFKC-normalized on construction. Debug output is redacted and
/// the type does not implement `Clone`, so the raw material cannot be
/// copied around by accident.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct RawPassword(String);

impl RawPassword {
    /// Create a raw password suitable for verification
    ///
    /// Rejects empty/whitespace-only input, control characters, and inputs
    /// over [`MAX_PASSWORD_LENGTH`] code points. No minimum length here:
    /// legacy credentials may be arbitrarily short.
    pub fn new(raw: String) -> Result<Self, PasswordPolicyError> {
        let normalized: String = raw.nfkc().collect();

        if normalized.trim().is_empty() {
            return Err(PasswordPolicyError::EmptyOrWhitespace);
        }

        // Count Unicode code points, not bytes
        let char_count = normalized.chars().count();
        if char_count > MAX_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_LENGTH,
                actual: char_count,
            });
        }

        for ch in normalized.chars() {
            if ch.is_control() && ch != ' ' && ch != '\t' {
                return Err(PasswordPolicyError::InvalidCharacter);
            }
        }

        Ok(Self(normalized))
    }

    /// Create a raw password for a newly chosen credential
    ///
    /// Same as [`RawPassword::new`] plus the minimum-length policy.
    pub fn new_chosen(raw: String) -> Result<Self, PasswordPolicyError> {
        let password = Self::new(raw)?;
        let char_count = password.0.chars().count();
        if char_count < MIN_NEW_PASSWORD_LENGTH {
            return Err(PasswordPolicyError::TooShort {
                min: MIN_NEW_PASSWORD_LENGTH,
                actual: char_count,
            });
        }
        Ok(password)
    }

    /// Password bytes for hashing/verification
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

/// Hash a password with the preferred scheme (Argon2id, PHC string output)
pub fn hash_password(password: &RawPassword) -> Result<String, PasswordHashError> {
    // 128-bit random salt
    let salt = SaltString::generate(OsRng);

    // Argon2::default() is Argon2id with OWASP parameters (m=19456, t=2, p=1)
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

    Ok(hash.to_string())
}

/// Verify a password against a stored credential
///
/// Accepts Argon2 PHC strings and legacy bcrypt hashes. A stored value in
/// neither format, or a mismatch, yields `false` - never an error. The
/// caller cannot distinguish which scheme matched.
pub fn verify_password(password: &RawPassword, stored: &str) -> bool {
    if stored.starts_with("$argon2") {
        let parsed = match PasswordHash::new(stored) {
            Ok(h) => h,
            Err(_) => return false,
        };
        // Argon2 compares in constant time internally
        return Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok();
    }

    if is_bcrypt_hash(stored) {
        return bcrypt::verify(password.as_bytes(), stored).unwrap_or(false);
    }

    false
}

/// Whether a stored credential should be re-hashed with the preferred scheme
///
/// True for legacy bcrypt hashes and for anything that is not a valid
/// Argon2id PHC string.
pub fn needs_rehash(stored: &str) -> bool {
    let parsed = match PasswordHash::new(stored) {
        Ok(h) => h,
        Err(_) => return true,
    };
    parsed.algorithm != argon2::Algorithm::Argon2id.ident()
}

fn is_bcrypt_hash(stored: &str) -> bool {
    stored.starts_with("$2a$") || stored.starts_with("$2b$") || stored.starts_with("$2y$")
}
