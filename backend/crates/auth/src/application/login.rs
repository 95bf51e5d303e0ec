//! Login Use Case
//!
//! Password authentication with transparent credential upgrades.
//! Stored credentials fall into three generations: current Argon2id
//! hashes, bcrypt hashes from the previous deployment, and a residue of
//! plaintext rows from the earliest data import. All three authenticate;
//! anything that is not already Argon2id is rewritten as Argon2id on the
//! first successful login, so the legacy forms die out one login at a time.

use std::sync::Arc;

use platform::crypto::constant_time_eq;
use platform::password::{hash_password, needs_rehash, verify_password, RawPassword};

use crate::application::config::AuthConfig;
use crate::application::token::mint_token;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, phone::Phone};
use crate::error::{AuthError, AuthResult};

/// Login input
pub struct LoginInput {
    /// Email or phone number
    pub identifier: String,
    /// Password
    pub password: String,
}

/// Login output
#[derive(Debug)]
pub struct LoginOutput {
    pub token: String,
    pub user: User,
}

/// Login use case
pub struct LoginUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> LoginUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, input: LoginInput) -> AuthResult<LoginOutput> {
        let user = self
            .find_user(&input.identifier)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let raw_password =
            RawPassword::new(input.password).map_err(|_| AuthError::InvalidCredentials)?;

        // Hash verification first; the plaintext comparison only runs for
        // rows that no hash scheme recognizes
        let mut upgrade = false;
        if verify_password(&raw_password, &user.password_hash) {
            upgrade = needs_rehash(&user.password_hash);
        } else if !user.password_hash.is_empty()
            && constant_time_eq(raw_password.as_bytes(), user.password_hash.as_bytes())
        {
            // Plaintext residue from the initial data import
            upgrade = true;
        } else {
            return Err(AuthError::InvalidCredentials);
        }

        if !user.can_login() {
            return Err(AuthError::AccountInactive);
        }

        if upgrade {
            let new_hash = hash_password(&raw_password)?;
            self.user_repo
                .set_password_hash(&user.user_id, &new_hash)
                .await?;
            tracing::info!(user_id = %user.user_id, "Upgraded stored credential to current scheme");
        }

        let token = mint_token(&self.config.jwt_secret, &user.user_id)?;

        tracing::info!(user_id = %user.user_id, "User logged in");

        Ok(LoginOutput { token, user })
    }

    /// Resolve the identifier as email when it looks like one, phone otherwise
    async fn find_user(&self, identifier: &str) -> AuthResult<Option<User>> {
        if identifier.contains('@') {
            let email = Email::new(identifier).map_err(|_| AuthError::InvalidCredentials)?;
            self.user_repo.find_by_email(&email).await
        } else {
            let phone = Phone::new(identifier).map_err(|_| AuthError::InvalidCredentials)?;
            self.user_repo.find_by_phone(&phone).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::token::decode_token;
    use crate::domain::value_object::user_role::UserRole;
    use crate::infra::memory::InMemoryAuthRepository;

    fn setup() -> (Arc<InMemoryAuthRepository>, Arc<AuthConfig>) {
        (
            Arc::new(InMemoryAuthRepository::new()),
            Arc::new(AuthConfig::development()),
        )
    }

    async fn seed_user(repo: &InMemoryAuthRepository, stored_credential: &str) -> User {
        let user = User::register(
            "Asha".to_string(),
            Some(Email::new("asha@example.com").unwrap()),
            None,
            stored_credential.to_string(),
            UserRole::Citizen,
            None,
        );
        repo.create(&user).await.unwrap();
        user
    }

    fn input(identifier: &str, password: &str) -> LoginInput {
        LoginInput {
            identifier: identifier.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_with_current_hash() {
        let (repo, config) = setup();
        let hash =
            hash_password(&RawPassword::new("correct horse".to_string()).unwrap()).unwrap();
        let seeded = seed_user(&repo, &hash).await;

        let use_case = LoginUseCase::new(repo.clone(), config.clone());
        let output = use_case
            .execute(input("asha@example.com", "correct horse"))
            .await
            .unwrap();

        assert_eq!(
            decode_token(&config.jwt_secret, &output.token).unwrap(),
            seeded.user_id
        );
        // Already current; no rewrite happened
        let stored = repo.find_by_id(&seeded.user_id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, hash);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let (repo, config) = setup();
        let hash =
            hash_password(&RawPassword::new("correct horse".to_string()).unwrap()).unwrap();
        seed_user(&repo, &hash).await;

        let use_case = LoginUseCase::new(repo, config);
        let err = use_case
            .execute(input("asha@example.com", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_unknown_user() {
        let (repo, config) = setup();
        let use_case = LoginUseCase::new(repo, config);
        let err = use_case
            .execute(input("nobody@example.com", "whatever"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_plaintext_row_upgrades_once() {
        let (repo, config) = setup();
        let seeded = seed_user(&repo, "correct horse").await;

        let use_case = LoginUseCase::new(repo.clone(), config.clone());
        use_case
            .execute(input("asha@example.com", "correct horse"))
            .await
            .unwrap();

        // The stored credential became an Argon2id hash
        let stored = repo.find_by_id(&seeded.user_id).await.unwrap().unwrap();
        assert!(stored.password_hash.starts_with("$argon2"));
        let upgraded_hash = stored.password_hash.clone();

        // Plaintext submission no longer matches anything...
        // except through hash verification, and a second login leaves
        // the hash untouched
        use_case
            .execute(input("asha@example.com", "correct horse"))
            .await
            .unwrap();
        let stored = repo.find_by_id(&seeded.user_id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, upgraded_hash);
    }

    #[tokio::test]
    async fn test_login_bcrypt_row_upgrades() {
        let (repo, config) = setup();
        let bcrypt_hash = bcrypt::hash("correct horse", 4).unwrap();
        let seeded = seed_user(&repo, &bcrypt_hash).await;

        let use_case = LoginUseCase::new(repo.clone(), config);
        use_case
            .execute(input("asha@example.com", "correct horse"))
            .await
            .unwrap();

        let stored = repo.find_by_id(&seeded.user_id).await.unwrap().unwrap();
        assert!(stored.password_hash.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_login_inactive_account() {
        let (repo, config) = setup();
        let hash =
            hash_password(&RawPassword::new("correct horse".to_string()).unwrap()).unwrap();
        let mut seeded = seed_user(&repo, &hash).await;
        seeded.is_active = false;
        repo.update(&seeded).await.unwrap();

        let use_case = LoginUseCase::new(repo, config);
        let err = use_case
            .execute(input("asha@example.com", "correct horse"))
            .await
            .unwrap_err();
        // Distinct from InvalidCredentials: the password was right
        assert!(matches!(err, AuthError::AccountInactive));
    }

    #[tokio::test]
    async fn test_login_empty_stored_credential_never_matches() {
        let (repo, config) = setup();
        seed_user(&repo, "").await;

        let use_case = LoginUseCase::new(repo, config);
        let err = use_case
            .execute(input("asha@example.com", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }
}
