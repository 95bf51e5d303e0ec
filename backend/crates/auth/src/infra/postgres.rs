//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use platform::secretbox::SecretBox;
use sqlx::PgPool;
use uuid::Uuid;

use kernel::id::UserId;

use crate::domain::entity::otp::OtpRecord;
use crate::domain::entity::user::{TotpEnrollment, User};
use crate::domain::repository::{OtpRepository, UserRepository};
use crate::domain::value_object::{
    email::Email, phone::Phone, totp_secret::TotpSecret, user_role::UserRole,
};
use crate::error::{AuthError, AuthResult};

const USER_COLUMNS: &str = r#"
    user_id,
    name,
    email,
    phone,
    password_hash,
    role,
    is_active,
    gram_panchayat,
    totp_secret,
    totp_enabled,
    totp_otpauth_url,
    totp_last_step,
    created_at,
    updated_at
"#;

/// PostgreSQL-backed auth repository
///
/// Owns the key that seals TOTP secrets; rows never carry the secret in
/// the clear.
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
    secrets: SecretBox,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool, secret_key: [u8; 32]) -> Self {
        Self {
            pool,
            secrets: SecretBox::new(secret_key),
        }
    }

    fn seal_totp(&self, user: &User) -> AuthResult<Option<Vec<u8>>> {
        match &user.totp {
            Some(t) => {
                let sealed = self.secrets.seal(t.secret.as_base32().as_bytes())?;
                Ok(Some(sealed))
            }
            None => Ok(None),
        }
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn create(&self, user: &User) -> AuthResult<()> {
        let sealed_secret = self.seal_totp(user)?;

        sqlx::query(
            r#"
            INSERT INTO users (
                user_id,
                name,
                email,
                phone,
                password_hash,
                role,
                is_active,
                gram_panchayat,
                totp_secret,
                totp_enabled,
                totp_otpauth_url,
                totp_last_step,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(&user.name)
        .bind(user.email.as_ref().map(|e| e.as_str()))
        .bind(user.phone.as_ref().map(|p| p.as_str()))
        .bind(&user.password_hash)
        .bind(user.role.code())
        .bind(user.is_active)
        .bind(&user.gram_panchayat)
        .bind(sealed_secret)
        .bind(user.totp.as_ref().is_some_and(|t| t.enabled))
        .bind(user.totp.as_ref().and_then(|t| t.otpauth_url.clone()))
        .bind(user.totp.as_ref().and_then(|t| t.last_verified_step))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user(&self.secrets)).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user(&self.secrets)).transpose()
    }

    async fn find_by_phone(&self, phone: &Phone) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE phone = $1"
        ))
        .bind(phone.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user(&self.secrets)).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)")
                .bind(email.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn exists_by_phone(&self, phone: &Phone) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE phone = $1)")
                .bind(phone.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn update(&self, user: &User) -> AuthResult<()> {
        let sealed_secret = self.seal_totp(user)?;

        sqlx::query(
            r#"
            UPDATE users SET
                name = $2,
                email = $3,
                phone = $4,
                password_hash = $5,
                role = $6,
                is_active = $7,
                gram_panchayat = $8,
                totp_secret = $9,
                totp_enabled = $10,
                totp_otpauth_url = $11,
                totp_last_step = $12,
                updated_at = $13
            WHERE user_id = $1
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(&user.name)
        .bind(user.email.as_ref().map(|e| e.as_str()))
        .bind(user.phone.as_ref().map(|p| p.as_str()))
        .bind(&user.password_hash)
        .bind(user.role.code())
        .bind(user.is_active)
        .bind(&user.gram_panchayat)
        .bind(sealed_secret)
        .bind(user.totp.as_ref().is_some_and(|t| t.enabled))
        .bind(user.totp.as_ref().and_then(|t| t.otpauth_url.clone()))
        .bind(user.totp.as_ref().and_then(|t| t.last_verified_step))
        .bind(user.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_password_hash(&self, user_id: &UserId, password_hash: &str) -> AuthResult<()> {
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .bind(password_hash)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn set_totp_step(&self, user_id: &UserId, step: i64) -> AuthResult<bool> {
        // Compare-and-set: no row changes when the step was already
        // recorded, so the second request in a step loses
        let updated = sqlx::query(
            r#"
            UPDATE users SET
                totp_last_step = $2,
                updated_at = $3
            WHERE user_id = $1 AND totp_last_step IS DISTINCT FROM $2
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(step)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated == 1)
    }

    async fn list(&self) -> AuthResult<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_at"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| r.into_user(&self.secrets))
            .collect()
    }
}

// ============================================================================
// OTP Repository Implementation
// ============================================================================

impl OtpRepository for PgAuthRepository {
    async fn upsert(&self, record: &OtpRecord) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO otp_codes (phone, code_hash, attempts, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (phone) DO UPDATE SET
                code_hash = EXCLUDED.code_hash,
                attempts = EXCLUDED.attempts,
                created_at = EXCLUDED.created_at,
                expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(record.phone.as_str())
        .bind(&record.code_hash)
        .bind(record.attempts)
        .bind(record.created_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_phone(&self, phone: &Phone) -> AuthResult<Option<OtpRecord>> {
        let row = sqlx::query_as::<_, OtpRow>(
            r#"
            SELECT phone, code_hash, attempts, created_at, expires_at
            FROM otp_codes
            WHERE phone = $1
            "#,
        )
        .bind(phone.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(OtpRow::into_record))
    }

    async fn increment_attempts(&self, phone: &Phone) -> AuthResult<i32> {
        let attempts = sqlx::query_scalar::<_, i32>(
            "UPDATE otp_codes SET attempts = attempts + 1 WHERE phone = $1 RETURNING attempts",
        )
        .bind(phone.as_str())
        .fetch_optional(&self.pool)
        .await?;

        attempts.ok_or(AuthError::OtpNotFound)
    }

    async fn delete(&self, phone: &Phone) -> AuthResult<()> {
        sqlx::query("DELETE FROM otp_codes WHERE phone = $1")
            .bind(phone.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_expired(&self) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM otp_codes WHERE expires_at <= $1")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?
            .rows_affected();

        if deleted > 0 {
            tracing::info!(codes_deleted = deleted, "Cleaned up expired OTP codes");
        }

        Ok(deleted)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    user_id: Uuid,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    password_hash: String,
    role: String,
    is_active: bool,
    gram_panchayat: Option<String>,
    totp_secret: Option<Vec<u8>>,
    totp_enabled: bool,
    totp_otpauth_url: Option<String>,
    totp_last_step: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, secrets: &SecretBox) -> AuthResult<User> {
        let role = UserRole::from_code(&self.role)
            .ok_or_else(|| AuthError::Internal(format!("invalid role: {}", self.role)))?;

        let totp = match self.totp_secret {
            Some(sealed) => {
                let plaintext = secrets.open(&sealed)?;
                let base32 = String::from_utf8(plaintext)
                    .map_err(|_| AuthError::Internal("invalid TOTP secret encoding".to_string()))?;
                Some(TotpEnrollment {
                    secret: TotpSecret::from_base32(base32)?,
                    enabled: self.totp_enabled,
                    otpauth_url: self.totp_otpauth_url,
                    last_verified_step: self.totp_last_step,
                })
            }
            None => None,
        };

        Ok(User {
            user_id: UserId::from_uuid(self.user_id),
            name: self.name,
            email: self.email.map(Email::from_db),
            phone: self.phone.map(Phone::from_db),
            password_hash: self.password_hash,
            role,
            is_active: self.is_active,
            gram_panchayat: self.gram_panchayat,
            totp,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct OtpRow {
    phone: String,
    code_hash: Vec<u8>,
    attempts: i32,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl OtpRow {
    fn into_record(self) -> OtpRecord {
        OtpRecord {
            phone: Phone::from_db(self.phone),
            code_hash: self.code_hash,
            attempts: self.attempts,
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}
