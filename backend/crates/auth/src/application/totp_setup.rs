//! TOTP Setup Use Case
//!
//! Two-step enrollment: setup stores a pending secret, confirm enables
//! it after the user proves possession with a first valid code.

use std::sync::Arc;

use kernel::id::UserId;

use crate::application::config::AuthConfig;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::totp_secret::TotpSecret;
use crate::error::{AuthError, AuthResult};

/// TOTP setup output
#[derive(Debug)]
pub struct TotpSetupOutput {
    /// QR code as base64-encoded PNG
    pub qr_code_base64: String,
    /// Secret for manual entry
    pub secret: String,
    /// otpauth:// URL
    pub otpauth_url: String,
}

/// TOTP setup use case
pub struct TotpSetupUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> TotpSetupUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    /// Start TOTP setup with a fresh secret
    ///
    /// An unconfirmed prior enrollment is silently replaced. A confirmed
    /// enrollment cannot be restarted through this path.
    pub async fn setup(&self, user_id: &UserId) -> AuthResult<TotpSetupOutput> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if user.totp_enabled() {
            return Err(AuthError::Validation(
                "two-factor authentication is already enabled".to_string(),
            ));
        }

        let secret = TotpSecret::generate();
        let label = user.totp_label();

        let qr_code = secret.generate_qr_code(&self.config.totp, &label)?;
        let otpauth_url = secret.get_otpauth_url(&self.config.totp, &label)?;

        user.start_totp_enrollment(secret.clone(), otpauth_url.clone());
        self.user_repo.update(&user).await?;

        tracing::info!(user_id = %user_id, "TOTP setup initiated");

        Ok(TotpSetupOutput {
            qr_code_base64: qr_code,
            secret: secret.as_base32().to_string(),
            otpauth_url,
        })
    }

    /// Confirm the pending enrollment with a first valid code
    pub async fn confirm(&self, user_id: &UserId, code: &str) -> AuthResult<()> {
        self.confirm_at(user_id, code, unix_now()).await
    }

    /// Confirm against an explicit timestamp (time-injectable for tests)
    pub async fn confirm_at(&self, user_id: &UserId, code: &str, time: u64) -> AuthResult<()> {
        let mut user = self
            .user_repo
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let secret = user
            .totp
            .as_ref()
            .map(|t| t.secret.clone())
            .ok_or(AuthError::TotpNotEnabled)?;

        let label = user.totp_label();
        if !secret.verify_at(code.trim(), &self.config.totp, &label, time)? {
            return Err(AuthError::InvalidTotpCode);
        }

        // Record the step that just validated so it cannot be replayed
        // as the first TOTP login
        let step = TotpSecret::current_step(&self.config.totp, time);
        user.confirm_totp(step)?;
        self.user_repo.update(&user).await?;

        tracing::info!(user_id = %user_id, "TOTP enabled");

        Ok(())
    }
}

pub(crate) fn unix_now() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entity::user::User;
    use crate::domain::value_object::phone::Phone;
    use crate::infra::memory::InMemoryAuthRepository;

    const T0: u64 = 1_700_000_010;

    async fn seed_user(repo: &InMemoryAuthRepository) -> User {
        let user = User::provision_by_phone(Phone::new("+910000000001").unwrap());
        repo.create(&user).await.unwrap();
        user
    }

    fn use_case(
        repo: Arc<InMemoryAuthRepository>,
        config: Arc<AuthConfig>,
    ) -> TotpSetupUseCase<InMemoryAuthRepository> {
        TotpSetupUseCase::new(repo, config)
    }

    #[tokio::test]
    async fn test_setup_stores_pending_enrollment() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let config = Arc::new(AuthConfig::development());
        let seeded = seed_user(&repo).await;

        let output = use_case(repo.clone(), config)
            .setup(&seeded.user_id)
            .await
            .unwrap();

        assert!(output.otpauth_url.starts_with("otpauth://totp/"));
        assert!(!output.qr_code_base64.is_empty());

        let stored = repo.find_by_id(&seeded.user_id).await.unwrap().unwrap();
        let enrollment = stored.totp.as_ref().unwrap();
        assert!(!enrollment.enabled);
        assert_eq!(enrollment.secret.as_base32(), output.secret);
        assert!(enrollment.last_verified_step.is_none());
    }

    #[tokio::test]
    async fn test_confirm_enables_and_records_step() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let config = Arc::new(AuthConfig::development());
        let seeded = seed_user(&repo).await;

        let uc = use_case(repo.clone(), config.clone());
        let output = uc.setup(&seeded.user_id).await.unwrap();

        let secret = TotpSecret::from_base32(output.secret).unwrap();
        let code = secret
            .generate_at(&config.totp, &seeded.totp_label(), T0)
            .unwrap();

        uc.confirm_at(&seeded.user_id, &code, T0).await.unwrap();

        let stored = repo.find_by_id(&seeded.user_id).await.unwrap().unwrap();
        assert!(stored.totp_enabled());
        assert_eq!(
            stored.totp.unwrap().last_verified_step,
            Some(TotpSecret::current_step(&config.totp, T0))
        );
    }

    #[tokio::test]
    async fn test_confirm_wrong_code_stays_disabled() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let config = Arc::new(AuthConfig::development());
        let seeded = seed_user(&repo).await;

        let uc = use_case(repo.clone(), config);
        uc.setup(&seeded.user_id).await.unwrap();

        let err = uc
            .confirm_at(&seeded.user_id, "000000", T0)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidTotpCode));

        let stored = repo.find_by_id(&seeded.user_id).await.unwrap().unwrap();
        assert!(!stored.totp_enabled());
    }

    #[tokio::test]
    async fn test_confirm_without_setup() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let config = Arc::new(AuthConfig::development());
        let seeded = seed_user(&repo).await;

        let err = use_case(repo, config)
            .confirm_at(&seeded.user_id, "000000", T0)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::TotpNotEnabled));
    }

    #[tokio::test]
    async fn test_setup_restart_replaces_pending_secret() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let config = Arc::new(AuthConfig::development());
        let seeded = seed_user(&repo).await;

        let uc = use_case(repo.clone(), config);
        let first = uc.setup(&seeded.user_id).await.unwrap();
        let second = uc.setup(&seeded.user_id).await.unwrap();
        assert_ne!(first.secret, second.secret);

        let stored = repo.find_by_id(&seeded.user_id).await.unwrap().unwrap();
        assert_eq!(stored.totp.unwrap().secret.as_base32(), second.secret);
    }

    #[tokio::test]
    async fn test_setup_refused_once_enabled() {
        let repo = Arc::new(InMemoryAuthRepository::new());
        let config = Arc::new(AuthConfig::development());
        let seeded = seed_user(&repo).await;

        let uc = use_case(repo.clone(), config.clone());
        let output = uc.setup(&seeded.user_id).await.unwrap();
        let secret = TotpSecret::from_base32(output.secret).unwrap();
        let code = secret
            .generate_at(&config.totp, &seeded.totp_label(), T0)
            .unwrap();
        uc.confirm_at(&seeded.user_id, &code, T0).await.unwrap();

        let err = uc.setup(&seeded.user_id).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }
}
