//! User Entity
//!
//! Single account entity covering citizens, officers, and admins.
//! Credential material (password hash, TOTP enrollment) lives here
//! because the service authenticates against the same record it serves
//! profiles from.

use chrono::{DateTime, Utc};
use kernel::id::UserId;

use crate::domain::value_object::{
    email::Email, phone::Phone, totp_secret::TotpSecret, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

/// TOTP enrollment state attached to a user
///
/// Present once setup has started. `enabled` flips only after the user
/// proves possession with a first valid code; until then TOTP login is
/// refused.
#[derive(Debug, Clone)]
pub struct TotpEnrollment {
    /// The shared secret (sealed at rest, plaintext in memory)
    pub secret: TotpSecret,
    /// Whether enrollment was confirmed with a valid code
    pub enabled: bool,
    /// otpauth:// URL captured at setup time, for re-display
    pub otpauth_url: Option<String>,
    /// Last time-step counter that produced an accepted code
    pub last_verified_step: Option<i64>,
}

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    /// Internal UUID identifier
    pub user_id: UserId,
    /// Display name
    pub name: String,
    /// Email, unique when present (phone-only citizens have none)
    pub email: Option<Email>,
    /// Phone, unique when present
    pub phone: Option<Phone>,
    /// Password hash in PHC format; empty for phone-provisioned accounts
    pub password_hash: String,
    /// Role (Citizen, Officer, Admin)
    pub role: UserRole,
    /// Deactivated accounts fail every login path
    pub is_active: bool,
    /// Locality the account is attached to
    pub gram_panchayat: Option<String>,
    /// TOTP enrollment, if setup was ever started
    pub totp: Option<TotpEnrollment>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Create a new user from registration data
    pub fn register(
        name: String,
        email: Option<Email>,
        phone: Option<Phone>,
        password_hash: String,
        role: UserRole,
        gram_panchayat: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            user_id: UserId::new(),
            name,
            email,
            phone,
            password_hash,
            role,
            is_active: true,
            gram_panchayat,
            totp: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a citizen account for a phone number seen for the first time
    ///
    /// OTP login provisions on demand; the account has no password until
    /// the user sets one.
    pub fn provision_by_phone(phone: Phone) -> Self {
        let now = Utc::now();
        let name = format!("User {}", phone.as_str());
        Self {
            user_id: UserId::new(),
            name,
            email: None,
            phone: Some(phone),
            password_hash: String::new(),
            role: UserRole::Citizen,
            is_active: true,
            gram_panchayat: None,
            totp: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if user can log in
    pub fn can_login(&self) -> bool {
        self.is_active
    }

    /// Whether TOTP is fully enabled (setup was confirmed)
    pub fn totp_enabled(&self) -> bool {
        self.totp.as_ref().is_some_and(|t| t.enabled)
    }

    /// Begin (or restart) TOTP enrollment with a fresh secret
    ///
    /// Restarting before confirmation simply replaces the pending secret.
    /// Restarting after confirmation is rejected upstream.
    pub fn start_totp_enrollment(&mut self, secret: TotpSecret, otpauth_url: String) {
        self.totp = Some(TotpEnrollment {
            secret,
            enabled: false,
            otpauth_url: Some(otpauth_url),
            last_verified_step: None,
        });
        self.updated_at = Utc::now();
    }

    /// Confirm a pending enrollment after a first valid code
    ///
    /// Records the step that code came from so it cannot be replayed
    /// as the first TOTP login.
    pub fn confirm_totp(&mut self, verified_step: i64) -> AuthResult<()> {
        let enrollment = self.totp.as_mut().ok_or(AuthError::TotpNotEnabled)?;
        enrollment.enabled = true;
        enrollment.last_verified_step = Some(verified_step);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Account label shown in authenticator apps
    pub fn totp_label(&self) -> String {
        if let Some(email) = &self.email {
            email.as_str().to_string()
        } else if let Some(phone) = &self.phone {
            phone.as_str().to_string()
        } else {
            self.name.clone()
        }
    }

    /// Update profile fields that users may edit themselves
    pub fn update_profile(&mut self, name: Option<String>, gram_panchayat: Option<String>) {
        if let Some(name) = name {
            self.name = name;
        }
        if let Some(gp) = gram_panchayat {
            self.gram_panchayat = Some(gp);
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phone() -> Phone {
        Phone::new("+910000000001").unwrap()
    }

    #[test]
    fn test_register_defaults() {
        let user = User::register(
            "Asha".to_string(),
            Some(Email::new("asha@example.com").unwrap()),
            None,
            "$argon2id$...".to_string(),
            UserRole::Citizen,
            Some("Ward 4".to_string()),
        );
        assert!(user.is_active);
        assert!(user.totp.is_none());
        assert!(!user.totp_enabled());
    }

    #[test]
    fn test_provision_by_phone() {
        let user = User::provision_by_phone(phone());
        assert_eq!(user.role, UserRole::Citizen);
        assert!(user.password_hash.is_empty());
        assert!(user.email.is_none());
        assert_eq!(user.phone.as_ref().unwrap().as_str(), "+910000000001");
    }

    #[test]
    fn test_totp_enrollment_lifecycle() {
        let mut user = User::provision_by_phone(phone());
        assert!(user.confirm_totp(1).is_err());

        let secret = TotpSecret::generate();
        user.start_totp_enrollment(secret, "otpauth://totp/x".to_string());
        assert!(!user.totp_enabled());

        user.confirm_totp(42).unwrap();
        assert!(user.totp_enabled());
        assert_eq!(user.totp.as_ref().unwrap().last_verified_step, Some(42));
    }

    #[test]
    fn test_totp_label_prefers_email() {
        let mut user = User::provision_by_phone(phone());
        assert_eq!(user.totp_label(), "+910000000001");
        user.email = Some(Email::new("asha@example.com").unwrap());
        assert_eq!(user.totp_label(), "asha@example.com");
    }
}
