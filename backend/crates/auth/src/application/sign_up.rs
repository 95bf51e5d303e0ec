//! Sign Up Use Case
//!
//! Creates a new user account and logs it in immediately.

use std::sync::Arc;

use platform::password::{hash_password, RawPassword};

use crate::application::config::AuthConfig;
use crate::application::token::mint_token;
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, phone::Phone, user_role::UserRole};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: String,
    pub role: Option<String>,
    pub gram_panchayat: Option<String>,
}

/// Sign up output
#[derive(Debug)]
pub struct SignUpOutput {
    pub token: String,
    pub user: User,
}

/// Sign up use case
pub struct SignUpUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> SignUpUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        let name = input.name.trim().to_string();
        if name.is_empty() {
            return Err(AuthError::Validation("name must not be empty".to_string()));
        }

        // At least one contact identity is required
        let email = input.email.as_deref().map(Email::new).transpose()?;
        let phone = input.phone.as_deref().map(Phone::new).transpose()?;
        if email.is_none() && phone.is_none() {
            return Err(AuthError::Validation(
                "email or phone is required".to_string(),
            ));
        }

        let role = match input.role.as_deref() {
            None => UserRole::Citizen,
            Some(code) => UserRole::from_code(code)
                .ok_or_else(|| AuthError::Validation(format!("unknown role: {}", code)))?,
        };

        // Uniqueness checks before the expensive hash
        if let Some(email) = &email {
            if self.user_repo.exists_by_email(email).await? {
                return Err(AuthError::EmailTaken);
            }
        }
        if let Some(phone) = &phone {
            if self.user_repo.exists_by_phone(phone).await? {
                return Err(AuthError::PhoneTaken);
            }
        }

        // Validate and hash password
        let raw_password = RawPassword::new_chosen(input.password)
            .map_err(|e| AuthError::PasswordValidation(e.to_string()))?;
        let password_hash = hash_password(&raw_password)?;

        let user = User::register(
            name,
            email,
            phone,
            password_hash,
            role,
            input.gram_panchayat,
        );
        self.user_repo.create(&user).await?;

        let token = mint_token(&self.config.jwt_secret, &user.user_id)?;

        tracing::info!(
            user_id = %user.user_id,
            role = %user.role,
            "User registered"
        );

        Ok(SignUpOutput { token, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::InMemoryAuthRepository;

    fn setup() -> SignUpUseCase<InMemoryAuthRepository> {
        SignUpUseCase::new(
            Arc::new(InMemoryAuthRepository::new()),
            Arc::new(AuthConfig::development()),
        )
    }

    fn input() -> SignUpInput {
        SignUpInput {
            name: "Asha".to_string(),
            email: Some("asha@example.com".to_string()),
            phone: None,
            password: "correct horse".to_string(),
            role: None,
            gram_panchayat: Some("Ward 4".to_string()),
        }
    }

    #[tokio::test]
    async fn test_register_defaults_to_citizen() {
        let uc = setup();
        let output = uc.execute(input()).await.unwrap();
        assert_eq!(output.user.role, UserRole::Citizen);
        assert!(output.user.password_hash.starts_with("$argon2"));
        assert!(!output.token.is_empty());
    }

    #[tokio::test]
    async fn test_register_officer_role() {
        let uc = setup();
        let output = uc
            .execute(SignUpInput {
                role: Some("officer".to_string()),
                ..input()
            })
            .await
            .unwrap();
        assert_eq!(output.user.role, UserRole::Officer);
    }

    #[tokio::test]
    async fn test_register_unknown_role() {
        let uc = setup();
        let err = uc
            .execute(SignUpInput {
                role: Some("mayor".to_string()),
                ..input()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let uc = setup();
        uc.execute(input()).await.unwrap();
        let err = uc.execute(input()).await.unwrap_err();
        assert!(matches!(err, AuthError::EmailTaken));
    }

    #[tokio::test]
    async fn test_register_duplicate_phone() {
        let uc = setup();
        let with_phone = || SignUpInput {
            email: None,
            phone: Some("+910000000001".to_string()),
            ..input()
        };
        uc.execute(with_phone()).await.unwrap();
        let err = uc.execute(with_phone()).await.unwrap_err();
        assert!(matches!(err, AuthError::PhoneTaken));
    }

    #[tokio::test]
    async fn test_register_requires_contact() {
        let uc = setup();
        let err = uc
            .execute(SignUpInput {
                email: None,
                phone: None,
                ..input()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_register_short_password() {
        let uc = setup();
        let err = uc
            .execute(SignUpInput {
                password: "short".to_string(),
                ..input()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PasswordValidation(_)));
    }
}
