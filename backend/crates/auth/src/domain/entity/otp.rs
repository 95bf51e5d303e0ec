//! OTP Record Entity
//!
//! A single live one-time code per phone number. Requesting a new code
//! replaces the previous record entirely, so stale codes and stale
//! attempt counts never survive a re-request.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::phone::Phone;

/// Failed attempts allowed before the record is burned
pub const MAX_OTP_ATTEMPTS: i32 = 5;

/// One-time code record, keyed by phone
#[derive(Debug, Clone)]
pub struct OtpRecord {
    /// The phone the code was sent to
    pub phone: Phone,
    /// SHA-256 hash of the 6-digit code; the plaintext is never stored
    pub code_hash: Vec<u8>,
    /// Failed verification attempts so far
    pub attempts: i32,
    /// When the code was issued
    pub created_at: DateTime<Utc>,
    /// Hard deadline after which the code never validates
    pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
    /// Issue a fresh record for a phone
    pub fn issue(phone: Phone, code_hash: Vec<u8>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            phone,
            code_hash,
            attempts: 0,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// Whether the code is past its deadline at the given instant
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the attempt ceiling has been reached
    pub fn is_exhausted(&self) -> bool {
        self.attempts >= MAX_OTP_ATTEMPTS
    }
}
