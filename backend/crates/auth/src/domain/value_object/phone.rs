//! Phone Value Object
//!
//! Lookup key for OTP login. Normalized by stripping separators so that
//! "+91 98765-43210" and "+919876543210" are the same key.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AuthError, AuthResult};

/// Validated, normalized phone number
///
/// Digits with an optional leading `+`, 8 to 15 digits (E.164 upper bound).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    pub fn new(raw: &str) -> AuthResult<Self> {
        let mut normalized = String::with_capacity(raw.len());
        for (i, ch) in raw.trim().chars().enumerate() {
            match ch {
                '+' if i == 0 => normalized.push('+'),
                '0'..='9' => normalized.push(ch),
                ' ' | '-' | '(' | ')' | '.' => {}
                _ => {
                    return Err(AuthError::Validation("Invalid phone number".to_string()));
                }
            }
        }

        let digits = normalized.trim_start_matches('+').len();
        if !(8..=15).contains(&digits) {
            return Err(AuthError::Validation("Invalid phone number".to_string()));
        }

        Ok(Self(normalized))
    }

    /// Rehydrate from storage without re-validation
    pub fn from_db(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Phone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
