//! Email Value Object
//!
//! Lookup key for password login. Stored lowercase so that lookups are
//! case-insensitive.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Maximum accepted email length
const MAX_EMAIL_LENGTH: usize = 254;

/// Validated, canonicalized email address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Email(String);

impl Email {
    /// Parse and canonicalize an email address
    ///
    /// Validation is deliberately shallow (local@domain with a dot in the
    /// domain); the mailbox is never verified by this subsystem.
    pub fn new(raw: &str) -> AuthResult<Self> {
        let trimmed = raw.trim();

        if trimmed.is_empty() || trimmed.len() > MAX_EMAIL_LENGTH {
            return Err(AuthError::Validation("Invalid email address".to_string()));
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(AuthError::Validation("Invalid email address".to_string()));
        };

        if local.is_empty() || domain.is_empty() || !domain.contains('.') {
            return Err(AuthError::Validation("Invalid email address".to_string()));
        }

        if trimmed.chars().any(char::is_whitespace) {
            return Err(AuthError::Validation("Invalid email address".to_string()));
        }

        Ok(Self(trimmed.to_lowercase()))
    }

    /// Rehydrate from storage without re-validation
    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        let email = Email::new("Citizen@Example.COM").unwrap();
        assert_eq!(email.as_str(), "citizen@example.com");
    }

    #[test]
    fn test_surrounding_whitespace_trimmed() {
        let email = Email::new("  user@example.org ").unwrap();
        assert_eq!(email.as_str(), "user@example.org");
    }

    #[test]
    fn test_invalid_emails() {
        for raw in ["", "no-at-sign", "@example.com", "user@", "user@nodot", "a b@example.com"] {
            assert!(Email::new(raw).is_err(), "{raw:?} should be rejected");
        }
    }
}
