//! In-Memory Repository Implementation
//!
//! Backs use case tests and local development without a database. The
//! mutex-per-store layout mirrors what the SQL implementation guarantees
//! per statement: each repository call is atomic.

use std::collections::HashMap;
use std::sync::Mutex;

use kernel::id::UserId;

use crate::domain::entity::otp::OtpRecord;
use crate::domain::entity::user::User;
use crate::domain::repository::{OtpRepository, UserRepository};
use crate::domain::value_object::{email::Email, phone::Phone};
use crate::error::{AuthError, AuthResult};

/// In-memory auth repository
#[derive(Default)]
pub struct InMemoryAuthRepository {
    users: Mutex<HashMap<UserId, User>>,
    otps: Mutex<HashMap<String, OtpRecord>>,
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn users(&self) -> AuthResult<std::sync::MutexGuard<'_, HashMap<UserId, User>>> {
        self.users
            .lock()
            .map_err(|_| AuthError::Internal("user store lock poisoned".to_string()))
    }

    fn otps(&self) -> AuthResult<std::sync::MutexGuard<'_, HashMap<String, OtpRecord>>> {
        self.otps
            .lock()
            .map_err(|_| AuthError::Internal("otp store lock poisoned".to_string()))
    }
}

impl UserRepository for InMemoryAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        self.users()?.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.users()?.get(user_id).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        Ok(self
            .users()?
            .values()
            .find(|u| u.email.as_ref() == Some(email))
            .cloned())
    }

    async fn find_by_phone(&self, phone: &Phone) -> AuthResult<Option<User>> {
        Ok(self
            .users()?
            .values()
            .find(|u| u.phone.as_ref() == Some(phone))
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self
            .users()?
            .values()
            .any(|u| u.email.as_ref() == Some(email)))
    }

    async fn exists_by_phone(&self, phone: &Phone) -> AuthResult<bool> {
        Ok(self
            .users()?
            .values()
            .any(|u| u.phone.as_ref() == Some(phone)))
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        self.users()?.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn set_password_hash(&self, user_id: &UserId, password_hash: &str) -> AuthResult<()> {
        if let Some(user) = self.users()?.get_mut(user_id) {
            user.password_hash = password_hash.to_string();
            user.updated_at = chrono::Utc::now();
        }
        Ok(())
    }

    async fn set_totp_step(&self, user_id: &UserId, step: i64) -> AuthResult<bool> {
        let mut users = self.users()?;
        let user = users.get_mut(user_id).ok_or(AuthError::UserNotFound)?;
        let enrollment = user.totp.as_mut().ok_or(AuthError::TotpNotEnabled)?;
        if enrollment.last_verified_step == Some(step) {
            return Ok(false);
        }
        enrollment.last_verified_step = Some(step);
        user.updated_at = chrono::Utc::now();
        Ok(true)
    }

    async fn list(&self) -> AuthResult<Vec<User>> {
        let mut users: Vec<User> = self.users()?.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }
}

impl OtpRepository for InMemoryAuthRepository {
    async fn upsert(&self, record: &OtpRecord) -> AuthResult<()> {
        self.otps()?
            .insert(record.phone.as_str().to_string(), record.clone());
        Ok(())
    }

    async fn find_by_phone(&self, phone: &Phone) -> AuthResult<Option<OtpRecord>> {
        Ok(self.otps()?.get(phone.as_str()).cloned())
    }

    async fn increment_attempts(&self, phone: &Phone) -> AuthResult<i32> {
        let mut otps = self.otps()?;
        let record = otps.get_mut(phone.as_str()).ok_or(AuthError::OtpNotFound)?;
        record.attempts += 1;
        Ok(record.attempts)
    }

    async fn delete(&self, phone: &Phone) -> AuthResult<()> {
        self.otps()?.remove(phone.as_str());
        Ok(())
    }

    async fn delete_expired(&self) -> AuthResult<u64> {
        let now = chrono::Utc::now();
        let mut otps = self.otps()?;
        let before = otps.len();
        otps.retain(|_, r| !r.is_expired(now));
        Ok((before - otps.len()) as u64)
    }
}
