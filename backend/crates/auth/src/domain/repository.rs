//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::id::UserId;

use crate::domain::entity::{otp::OtpRecord, user::User};
use crate::domain::value_object::{email::Email, phone::Phone};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    /// Create a new user
    async fn create(&self, user: &User) -> AuthResult<()>;

    /// Find user by ID
    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    /// Find user by phone
    async fn find_by_phone(&self, phone: &Phone) -> AuthResult<Option<User>>;

    /// Check if email is taken
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Check if phone is taken
    async fn exists_by_phone(&self, phone: &Phone) -> AuthResult<bool>;

    /// Update user (profile fields and TOTP enrollment)
    async fn update(&self, user: &User) -> AuthResult<()>;

    /// Replace only the password hash, for transparent upgrades on login
    async fn set_password_hash(&self, user_id: &UserId, password_hash: &str) -> AuthResult<()>;

    /// Record an accepted TOTP step, only if it advances
    ///
    /// Compare-and-set: returns false when the stored step already equals
    /// `step`, which means another request consumed this window first.
    async fn set_totp_step(&self, user_id: &UserId, step: i64) -> AuthResult<bool>;

    /// List all users (admin surface)
    async fn list(&self) -> AuthResult<Vec<User>>;
}

/// OTP repository trait
#[trait_variant::make(OtpRepository: Send)]
pub trait LocalOtpRepository {
    /// Store a record, replacing any previous one for the same phone
    async fn upsert(&self, record: &OtpRecord) -> AuthResult<()>;

    /// Find the live record for a phone
    async fn find_by_phone(&self, phone: &Phone) -> AuthResult<Option<OtpRecord>>;

    /// Atomically bump the attempt counter, returning the new count
    ///
    /// The increment lands before any code comparison so parallel wrong
    /// guesses each consume an attempt.
    async fn increment_attempts(&self, phone: &Phone) -> AuthResult<i32>;

    /// Delete the record for a phone
    async fn delete(&self, phone: &Phone) -> AuthResult<()>;

    /// Clean up expired records
    async fn delete_expired(&self) -> AuthResult<u64>;
}
